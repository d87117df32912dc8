// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::trace;

use crate::{
	NamespaceId, QualifiedName,
	materialized::{MaterializedCatalog, key},
};

impl MaterializedCatalog {
	pub fn find_synonym_by_name(&self, namespace: NamespaceId, name: &str) -> Option<QualifiedName> {
		self.synonyms.get(&(namespace, key(name))).map(|entry| entry.value().clone())
	}

	pub fn set_synonym(&self, namespace: NamespaceId, name: &str, target: QualifiedName) {
		trace!(synonym = name, target = %target, "set synonym");
		self.synonyms.insert((namespace, key(name)), target);
	}
}
