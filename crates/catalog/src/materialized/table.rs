// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::trace;

use crate::{
	NamespaceId, TableDef, TableId,
	materialized::{MaterializedCatalog, key},
};

impl MaterializedCatalog {
	pub fn find_table_by_id(&self, table: TableId) -> Option<TableDef> {
		self.tables.get(&table).map(|entry| entry.value().clone())
	}

	/// Find a table by name in a namespace
	pub fn find_table_by_name(&self, namespace: NamespaceId, name: &str) -> Option<TableDef> {
		self.tables_by_name.get(&(namespace, key(name))).and_then(|entry| self.find_table_by_id(*entry.value()))
	}

	pub fn set_table(&self, table: TableDef) {
		trace!(table = %table.name, id = %table.id, "set table");
		if let Some(pre) = self.tables.get(&table.id) {
			let pre = pre.value();
			self.tables_by_name.remove(&(pre.namespace, key(&pre.name)));
		}
		self.tables_by_name.insert((table.namespace, key(&table.name)), table.id);
		self.tables.insert(table.id, table);
	}

	pub fn remove_table(&self, table: TableId) {
		if let Some(entry) = self.tables.remove(&table) {
			let pre = entry.value();
			self.tables_by_name.remove(&(pre.namespace, key(&pre.name)));
		}
	}
}

#[cfg(test)]
mod tests {
	use tessera_type::Type;

	use super::*;
	use crate::ColumnDef;

	fn create_test_table(id: TableId, namespace: NamespaceId, name: &str) -> TableDef {
		TableDef {
			id,
			namespace,
			namespace_name: "public".to_string(),
			name: name.to_string(),
			columns: vec![ColumnDef::new("id", Type::Int4).not_null(), ColumnDef::new("name", Type::Utf8)],
			primary_key: vec![0],
		}
	}

	#[test]
	fn test_set_and_find_table() {
		let catalog = MaterializedCatalog::new();
		let table = create_test_table(TableId(1), NamespaceId(1), "test_table");
		catalog.set_table(table.clone());

		assert_eq!(catalog.find_table_by_id(TableId(1)), Some(table.clone()));
		assert_eq!(catalog.find_table_by_name(NamespaceId(1), "TEST_TABLE"), Some(table));
		assert!(catalog.find_table_by_name(NamespaceId(2), "test_table").is_none());
	}

	#[test]
	fn test_rename_table() {
		let catalog = MaterializedCatalog::new();
		catalog.set_table(create_test_table(TableId(1), NamespaceId(1), "old_name"));
		catalog.set_table(create_test_table(TableId(1), NamespaceId(1), "new_name"));

		assert!(catalog.find_table_by_name(NamespaceId(1), "old_name").is_none());
		assert!(catalog.find_table_by_name(NamespaceId(1), "new_name").is_some());
	}

	#[test]
	fn test_remove_table() {
		let catalog = MaterializedCatalog::new();
		catalog.set_table(create_test_table(TableId(1), NamespaceId(1), "doomed"));
		catalog.remove_table(TableId(1));

		assert!(catalog.find_table_by_id(TableId(1)).is_none());
		assert!(catalog.find_table_by_name(NamespaceId(1), "doomed").is_none());
	}
}
