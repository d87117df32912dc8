// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{NamespaceDef, QualifiedName, RoutineDef, TableDef, ViewDef};

/// A table or a view, as found by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
	Table(TableDef),
	View(ViewDef),
}

impl Relation {
	pub fn qualified_name(&self) -> QualifiedName {
		match self {
			Relation::Table(t) => t.qualified_name(),
			Relation::View(v) => v.qualified_name(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Relation::Table(t) => &t.name,
			Relation::View(v) => &v.name,
		}
	}

	pub fn columns(&self) -> &[crate::ColumnDef] {
		match self {
			Relation::Table(t) => &t.columns,
			Relation::View(v) => &v.columns,
		}
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns().iter().position(|c| c.name.eq_ignore_ascii_case(name))
	}
}

/// Read access to schema metadata. Implementations must be safe to share
/// between concurrent compilations; the compiler never mutates the catalog.
pub trait CatalogReader: Send + Sync {
	fn find_namespace(&self, name: &str) -> Option<NamespaceDef>;

	fn find_table(&self, namespace: &str, name: &str) -> Option<TableDef>;

	fn find_view(&self, namespace: &str, name: &str) -> Option<ViewDef>;

	/// All overloads of a routine.
	fn find_routines(&self, namespace: &str, name: &str) -> Vec<RoutineDef>;

	/// The target of a synonym defined in `namespace`.
	fn find_synonym(&self, namespace: &str, name: &str) -> Option<QualifiedName>;

	/// Every base table in the catalog.
	fn list_base_tables(&self) -> Vec<QualifiedName>;

	fn find_relation(&self, namespace: &str, name: &str) -> Option<Relation> {
		if let Some(table) = self.find_table(namespace, name) {
			return Some(Relation::Table(table));
		}
		self.find_view(namespace, name).map(Relation::View)
	}
}
