// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tessera_type::Type;

use crate::{NamespaceId, QualifiedName, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDef {
	pub id: NamespaceId,
	pub name: String,
}

/// How the value of an identity column is produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityGeneration {
	/// `GENERATED ALWAYS AS IDENTITY`: explicit values need an OVERRIDING clause
	Always,
	/// `GENERATED BY DEFAULT AS IDENTITY`: explicit values are accepted
	ByDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	pub data_type: Type,
	pub nullable: bool,
	/// Source text of the DEFAULT clause.
	pub default: Option<String>,
	pub identity: Option<IdentityGeneration>,
	/// Source text of the generation expression of a computed column.
	pub generated: Option<String>,
}

impl ColumnDef {
	pub fn new(name: impl Into<String>, data_type: Type) -> Self {
		Self {
			name: name.into(),
			data_type,
			nullable: true,
			default: None,
			identity: None,
			generated: None,
		}
	}

	pub fn not_null(mut self) -> Self {
		self.nullable = false;
		self
	}

	pub fn with_default(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}

	pub fn identity(mut self, generation: IdentityGeneration) -> Self {
		self.identity = Some(generation);
		self.nullable = false;
		self
	}

	pub fn generated(mut self, expression: impl Into<String>) -> Self {
		self.generated = Some(expression.into());
		self
	}

	pub fn is_identity(&self) -> bool {
		self.identity.is_some()
	}

	pub fn is_generated(&self) -> bool {
		self.generated.is_some()
	}

	pub fn has_default(&self) -> bool {
		self.default.is_some()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
	pub id: TableId,
	pub namespace: NamespaceId,
	pub namespace_name: String,
	pub name: String,
	pub columns: Vec<ColumnDef>,
	pub primary_key: Vec<usize>,
}

impl TableDef {
	pub fn qualified_name(&self) -> QualifiedName {
		QualifiedName::new(self.namespace_name.clone(), self.name.clone())
	}

	pub fn column_count(&self) -> usize {
		self.columns.len()
	}

	pub fn column(&self, index: usize) -> Option<&ColumnDef> {
		self.columns.get(index)
	}

	/// Case-insensitive column lookup.
	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
	}

	/// The identity column, if the table has one. A table has at most one.
	pub fn identity_column(&self) -> Option<(usize, IdentityGeneration)> {
		self.columns.iter().enumerate().find_map(|(i, c)| c.identity.map(|g| (i, g)))
	}

	pub fn column_types(&self) -> Vec<Type> {
		self.columns.iter().map(|c| c.data_type).collect()
	}
}
