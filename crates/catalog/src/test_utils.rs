// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A small banking schema used by the compiler's tests.
//!
//! ```text
//! public.account   (id BIGINT IDENTITY ALWAYS, name, balance, active, label GENERATED)
//! public.t         (id, a, b)
//! public.ledger    (id INT IDENTITY BY DEFAULT, amount, memo DEFAULT 'none')
//! public.staging   (id, name, balance)
//! archive.t        (id, a, b)
//!
//! public.active_account  = account[id, name, balance] WHERE active = TRUE
//! public.rich_active     = active_account[id, name, balance] WHERE balance > 1000
//! public.account_labels  = account[id, label]
//! public.audited_t       = t[id, a] WHERE a > 0, with instead-of triggers
//! public.summary         not updatable
//! ```

use tessera_type::Type;

use crate::{
	ColumnDef, IdentityGeneration, MaterializedCatalog, NamespaceDef, NamespaceId, ParameterDef, ParameterMode,
	QualifiedName, RoutineDef, RoutineId, RoutineKind, TableDef, TableId, ViewBase, ViewDef, ViewId,
};

pub const PUBLIC: NamespaceId = NamespaceId(1);
pub const ARCHIVE: NamespaceId = NamespaceId(2);

pub fn create_namespace(catalog: &MaterializedCatalog, id: NamespaceId, name: &str) -> NamespaceDef {
	let namespace = NamespaceDef {
		id,
		name: name.to_string(),
	};
	catalog.set_namespace(namespace.clone());
	namespace
}

pub fn create_table(
	catalog: &MaterializedCatalog,
	id: u64,
	namespace: &NamespaceDef,
	name: &str,
	columns: Vec<ColumnDef>,
) -> TableDef {
	let table = TableDef {
		id: TableId(id),
		namespace: namespace.id,
		namespace_name: namespace.name.clone(),
		name: name.to_string(),
		columns,
		primary_key: vec![0],
	};
	catalog.set_table(table.clone());
	table
}

pub fn create_view(
	catalog: &MaterializedCatalog,
	id: u64,
	namespace: &NamespaceDef,
	name: &str,
	columns: Vec<ColumnDef>,
	base: Option<ViewBase>,
) -> ViewDef {
	let view = ViewDef {
		id: ViewId(id),
		namespace: namespace.id,
		namespace_name: namespace.name.clone(),
		name: name.to_string(),
		columns,
		base,
		trigger_insertable: false,
		trigger_updatable: false,
		trigger_deletable: false,
	};
	catalog.set_view(view.clone());
	view
}

pub fn create_procedure(
	catalog: &MaterializedCatalog,
	id: u64,
	namespace: &NamespaceDef,
	name: &str,
	parameters: Vec<ParameterDef>,
) -> RoutineDef {
	let routine = RoutineDef {
		id: RoutineId(id),
		namespace: namespace.id,
		namespace_name: namespace.name.clone(),
		name: name.to_string(),
		kind: RoutineKind::Procedure,
		parameters,
		returns: None,
	};
	catalog.set_routine(routine.clone());
	routine
}

fn base(relation: &str, column_map: Vec<usize>, filter: Option<&str>) -> Option<ViewBase> {
	Some(ViewBase {
		relation: QualifiedName::new("public", relation),
		column_map,
		filter: filter.map(str::to_string),
	})
}

/// Build the fixture catalog described in the module docs.
pub fn test_catalog() -> MaterializedCatalog {
	let catalog = MaterializedCatalog::new();
	let public = create_namespace(&catalog, PUBLIC, "public");
	let archive = create_namespace(&catalog, ARCHIVE, "archive");

	create_table(
		&catalog,
		1,
		&public,
		"account",
		vec![
			ColumnDef::new("id", Type::Int8).identity(IdentityGeneration::Always),
			ColumnDef::new("name", Type::Utf8).not_null(),
			ColumnDef::new("balance", Type::Decimal),
			ColumnDef::new("active", Type::Boolean).with_default("TRUE"),
			ColumnDef::new("label", Type::Utf8).generated("UPPER(name)"),
		],
	);
	create_table(&catalog, 2, &public, "t", int_columns(&["id", "a", "b"]));
	create_table(
		&catalog,
		3,
		&public,
		"ledger",
		vec![
			ColumnDef::new("id", Type::Int4).identity(IdentityGeneration::ByDefault),
			ColumnDef::new("amount", Type::Int4),
			ColumnDef::new("memo", Type::Utf8).with_default("'none'"),
		],
	);
	create_table(
		&catalog,
		4,
		&public,
		"staging",
		vec![
			ColumnDef::new("id", Type::Int8),
			ColumnDef::new("name", Type::Utf8),
			ColumnDef::new("balance", Type::Decimal),
		],
	);
	create_table(&catalog, 5, &archive, "t", int_columns(&["id", "a", "b"]));

	let account_columns = || {
		vec![
			ColumnDef::new("id", Type::Int8),
			ColumnDef::new("name", Type::Utf8),
			ColumnDef::new("balance", Type::Decimal),
		]
	};
	create_view(
		&catalog,
		1,
		&public,
		"active_account",
		account_columns(),
		base("account", vec![0, 1, 2], Some("active = TRUE")),
	);
	create_view(
		&catalog,
		2,
		&public,
		"rich_active",
		account_columns(),
		base("active_account", vec![0, 1, 2], Some("balance > 1000")),
	);
	create_view(
		&catalog,
		3,
		&public,
		"account_labels",
		vec![ColumnDef::new("id", Type::Int8), ColumnDef::new("label", Type::Utf8)],
		base("account", vec![0, 4], None),
	);
	let audited = create_view(
		&catalog,
		4,
		&public,
		"audited_t",
		int_columns(&["id", "a"]),
		base("t", vec![0, 1], Some("a > 0")),
	);
	catalog.set_view(ViewDef {
		trigger_insertable: true,
		trigger_updatable: true,
		trigger_deletable: true,
		..audited
	});
	create_view(
		&catalog,
		5,
		&public,
		"summary",
		vec![ColumnDef::new("name", Type::Utf8), ColumnDef::new("total", Type::Decimal)],
		None,
	);

	create_procedure(
		&catalog,
		1,
		&public,
		"adjust",
		vec![
			ParameterDef::new("id", Type::Int8, ParameterMode::In),
			ParameterDef::new("delta", Type::Decimal, ParameterMode::In),
		],
	);
	create_procedure(
		&catalog,
		2,
		&public,
		"fetch_balance",
		vec![
			ParameterDef::new("id", Type::Int8, ParameterMode::In),
			ParameterDef::new("bal", Type::Decimal, ParameterMode::Out),
		],
	);
	create_procedure(
		&catalog,
		3,
		&public,
		"log_event",
		vec![ParameterDef::new("msg", Type::Utf8, ParameterMode::In)],
	);
	create_procedure(
		&catalog,
		4,
		&public,
		"log_event",
		vec![
			ParameterDef::new("msg", Type::Utf8, ParameterMode::In),
			ParameterDef::new("level", Type::Int4, ParameterMode::In),
		],
	);
	catalog.set_synonym(PUBLIC, "bump", QualifiedName::new("public", "adjust"));

	catalog
}

fn int_columns(names: &[&str]) -> Vec<ColumnDef> {
	names.iter().map(|name| ColumnDef::new(*name, Type::Int4)).collect()
}
