// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod namespace;
mod routine;
mod synonym;
mod table;
mod view;

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;

use crate::{
	CatalogReader, NamespaceDef, NamespaceId, QualifiedName, RoutineDef, RoutineId, TableDef, TableId,
	ViewDef, ViewId,
};

/// An in-memory catalog of schema definitions, indexed by id and by name.
/// Names are matched case-insensitively.
#[derive(Clone)]
pub struct MaterializedCatalog(Arc<MaterializedCatalogInner>);

pub struct MaterializedCatalogInner {
	pub(crate) namespaces: SkipMap<NamespaceId, NamespaceDef>,
	pub(crate) namespaces_by_name: SkipMap<String, NamespaceId>,

	pub(crate) tables: SkipMap<TableId, TableDef>,
	/// (namespace, table name) to table id
	pub(crate) tables_by_name: SkipMap<(NamespaceId, String), TableId>,

	pub(crate) views: SkipMap<ViewId, ViewDef>,
	pub(crate) views_by_name: SkipMap<(NamespaceId, String), ViewId>,

	pub(crate) routines: SkipMap<RoutineId, RoutineDef>,
	/// (namespace, routine name, routine id); overloads share a name
	pub(crate) routines_by_name: SkipMap<(NamespaceId, String, RoutineId), ()>,

	pub(crate) synonyms: SkipMap<(NamespaceId, String), QualifiedName>,
}

impl std::ops::Deref for MaterializedCatalog {
	type Target = MaterializedCatalogInner;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Default for MaterializedCatalog {
	fn default() -> Self {
		Self::new()
	}
}

impl MaterializedCatalog {
	pub fn new() -> Self {
		Self(Arc::new(MaterializedCatalogInner {
			namespaces: SkipMap::new(),
			namespaces_by_name: SkipMap::new(),
			tables: SkipMap::new(),
			tables_by_name: SkipMap::new(),
			views: SkipMap::new(),
			views_by_name: SkipMap::new(),
			routines: SkipMap::new(),
			routines_by_name: SkipMap::new(),
			synonyms: SkipMap::new(),
		}))
	}
}

pub(crate) fn key(name: &str) -> String {
	name.to_ascii_lowercase()
}

impl CatalogReader for MaterializedCatalog {
	fn find_namespace(&self, name: &str) -> Option<NamespaceDef> {
		self.find_namespace_by_name(name)
	}

	fn find_table(&self, namespace: &str, name: &str) -> Option<TableDef> {
		let namespace = self.find_namespace_by_name(namespace)?;
		self.find_table_by_name(namespace.id, name)
	}

	fn find_view(&self, namespace: &str, name: &str) -> Option<ViewDef> {
		let namespace = self.find_namespace_by_name(namespace)?;
		self.find_view_by_name(namespace.id, name)
	}

	fn find_routines(&self, namespace: &str, name: &str) -> Vec<RoutineDef> {
		match self.find_namespace_by_name(namespace) {
			Some(namespace) => self.find_routines_by_name(namespace.id, name),
			None => vec![],
		}
	}

	fn find_synonym(&self, namespace: &str, name: &str) -> Option<QualifiedName> {
		let namespace = self.find_namespace_by_name(namespace)?;
		self.find_synonym_by_name(namespace.id, name)
	}

	fn list_base_tables(&self) -> Vec<QualifiedName> {
		self.tables.iter().map(|entry| entry.value().qualified_name()).collect()
	}
}
