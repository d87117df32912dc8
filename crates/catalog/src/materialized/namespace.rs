// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::trace;

use crate::{
	NamespaceDef, NamespaceId,
	materialized::{MaterializedCatalog, key},
};

impl MaterializedCatalog {
	pub fn find_namespace_by_id(&self, namespace: NamespaceId) -> Option<NamespaceDef> {
		self.namespaces.get(&namespace).map(|entry| entry.value().clone())
	}

	pub fn find_namespace_by_name(&self, name: &str) -> Option<NamespaceDef> {
		self.namespaces_by_name.get(&key(name)).and_then(|entry| self.find_namespace_by_id(*entry.value()))
	}

	pub fn set_namespace(&self, namespace: NamespaceDef) {
		trace!(namespace = %namespace.name, id = %namespace.id, "set namespace");
		if let Some(pre) = self.namespaces.get(&namespace.id) {
			self.namespaces_by_name.remove(&key(&pre.value().name));
		}
		self.namespaces_by_name.insert(key(&namespace.name), namespace.id);
		self.namespaces.insert(namespace.id, namespace);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_find_namespace_case_insensitive() {
		let catalog = MaterializedCatalog::new();
		catalog.set_namespace(NamespaceDef {
			id: NamespaceId(1),
			name: "Public".to_string(),
		});

		assert_eq!(catalog.find_namespace_by_name("PUBLIC").unwrap().id, NamespaceId(1));
		assert_eq!(catalog.find_namespace_by_name("public").unwrap().name, "Public");
		assert!(catalog.find_namespace_by_name("archive").is_none());
	}

	#[test]
	fn test_rename_namespace_drops_old_name() {
		let catalog = MaterializedCatalog::new();
		catalog.set_namespace(NamespaceDef {
			id: NamespaceId(1),
			name: "old".to_string(),
		});
		catalog.set_namespace(NamespaceDef {
			id: NamespaceId(1),
			name: "new".to_string(),
		});

		assert!(catalog.find_namespace_by_name("old").is_none());
		assert!(catalog.find_namespace_by_name("new").is_some());
	}
}
