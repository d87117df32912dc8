// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::{ColumnDef, NamespaceId, QualifiedName, ViewId};

/// The single-table query a simple view is defined by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewBase {
	/// The relation the view selects from; may itself be a view.
	pub relation: QualifiedName,
	/// `column_map[i]` is the ordinal in `relation` that view column `i` exposes.
	pub column_map: Vec<usize>,
	/// Source text of the view's WHERE clause, written against `relation`'s columns.
	pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDef {
	pub id: ViewId,
	pub namespace: NamespaceId,
	pub namespace_name: String,
	pub name: String,
	pub columns: Vec<ColumnDef>,
	/// `None` for views that are not updatable (joins, aggregates, ...).
	pub base: Option<ViewBase>,
	/// The view handles INSERT itself (instead-of trigger); no rewrite needed.
	pub trigger_insertable: bool,
	pub trigger_updatable: bool,
	pub trigger_deletable: bool,
}

impl ViewDef {
	pub fn qualified_name(&self) -> QualifiedName {
		QualifiedName::new(self.namespace_name.clone(), self.name.clone())
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
	}

	pub fn is_updatable(&self) -> bool {
		self.base.is_some()
	}
}
