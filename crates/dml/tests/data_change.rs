// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::{QualifiedName, test_utils::test_catalog};
use tessera_dml::{
	BinaryOperator, CompileContext, CompiledStatement, CompilerConfig, DeleteStatement, DmlError, ErrorKind,
	ExpressionKind, InsertSource, InsertStatement, UpdateStatement, compile_statement,
};

fn compile(sql: &str) -> Result<CompiledStatement, DmlError> {
	let catalog = test_catalog();
	let config = CompilerConfig::default();
	let mut ctx = CompileContext::new(&catalog, &config);
	compile_statement(&mut ctx, sql)
}

fn insert(sql: &str) -> Result<InsertStatement, DmlError> {
	match compile(sql)? {
		CompiledStatement::Insert(insert) => Ok(insert),
		other => panic!("expected insert, got {other:?}"),
	}
}

fn update(sql: &str) -> Result<UpdateStatement, DmlError> {
	match compile(sql)? {
		CompiledStatement::Update(update) => Ok(update),
		other => panic!("expected update, got {other:?}"),
	}
}

fn delete(sql: &str) -> Result<DeleteStatement, DmlError> {
	match compile(sql)? {
		CompiledStatement::Delete(delete) => Ok(delete),
		other => panic!("expected delete, got {other:?}"),
	}
}

#[test]
fn test_insert_rows_with_column_list() -> Result<(), DmlError> {
	let insert = insert("INSERT INTO t (a, b) VALUES (1, 2), (3, 4)")?;
	assert_eq!(insert.column_map, vec![1, 2]);
	assert_eq!(insert.check_list, vec![false, true, true]);

	let InsertSource::Values(values) = &insert.source else {
		panic!("expected values");
	};
	let ExpressionKind::Values(rows) = &values.kind else {
		panic!("expected rows");
	};
	assert_eq!(rows.len(), 2);
	assert!(rows.iter().all(|row| row.degree() == 2));
	Ok(())
}

#[test]
fn test_insert_row_degree_must_match_column_list() {
	let err = insert("INSERT INTO t (a, b) VALUES (1, 2), (3)").unwrap_err();
	assert!(matches!(
		err,
		DmlError::DegreeMismatch {
			expected: 2,
			actual: 1,
			..
		}
	));
}

#[test]
fn test_insert_duplicate_column() {
	let err = insert("INSERT INTO t (a, a) VALUES (1, 2)").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::DuplicateTarget);
}

#[test]
fn test_identity_always_requires_overriding() -> Result<(), DmlError> {
	let err = insert("INSERT INTO account (id, name) VALUES (1, 'x')").unwrap_err();
	assert!(matches!(err, DmlError::IdentityOverrideRequired { ref column, .. } if column == "id"));
	assert_eq!(err.kind(), ErrorKind::ColumnPolicy);

	let insert = insert("INSERT INTO account (id, name) OVERRIDING SYSTEM VALUE VALUES (1, 'x')")?;
	let InsertSource::Values(values) = &insert.source else {
		panic!("expected values");
	};
	assert_eq!(values.to_string(), "VALUES (1, 'x')");
	Ok(())
}

#[test]
fn test_overriding_user_value_keeps_generated_identity() -> Result<(), DmlError> {
	let insert = insert("INSERT INTO account (id, name) OVERRIDING USER VALUE VALUES (1, 'x')")?;
	let InsertSource::Values(values) = &insert.source else {
		panic!("expected values");
	};
	assert_eq!(values.to_string(), "VALUES (DEFAULT, 'x')");
	Ok(())
}

#[test]
fn test_insert_into_view_lands_on_base() -> Result<(), DmlError> {
	let insert = insert("INSERT INTO account_labels (label) VALUES (DEFAULT)")?;
	assert_eq!(insert.target.qualified_name(), QualifiedName::new("public", "account"));
	assert_eq!(insert.column_map, vec![4]);
	assert!(insert.write_tables.contains(&QualifiedName::new("public", "account")));
	Ok(())
}

#[test]
fn test_update_round_trip() -> Result<(), DmlError> {
	let update = update("UPDATE t SET a = 1, b = 2 WHERE id = 5")?;
	assert_eq!(update.column_map, vec![1, 2]);

	let condition = update.condition.expect("condition");
	let ExpressionKind::Binary {
		operator,
		left,
		..
	} = &condition.kind
	else {
		panic!("expected a comparison");
	};
	assert_eq!(*operator, BinaryOperator::Equal);
	assert_eq!(left.to_string(), "id");
	assert_eq!(condition.data_type, Some(tessera_type::Type::Boolean));
	Ok(())
}

#[test]
fn test_update_generated_column() {
	let err = update("UPDATE account SET label = 'x'").unwrap_err();
	assert!(matches!(err, DmlError::GeneratedColumnWrite { .. }));

	let err = update("UPDATE account SET label = DEFAULT").unwrap_err();
	assert!(matches!(err, DmlError::GeneratedColumnWrite { .. }));
}

#[test]
fn test_update_view_condition_includes_filter() -> Result<(), DmlError> {
	let update = update("UPDATE active_account SET balance = 0 WHERE name = 'x'")?;
	assert_eq!(update.target.name(), "account");
	assert_eq!(update.column_map, vec![2]);
	assert_eq!(update.condition.expect("condition").to_string(), "(active = TRUE) AND (name = 'x')");
	Ok(())
}

#[test]
fn test_delete_layered_view() -> Result<(), DmlError> {
	let delete = delete("DELETE FROM rich_active WHERE id = 3")?;
	assert_eq!(delete.target.name(), "account");
	assert_eq!(
		delete.condition.expect("condition").to_string(),
		"((active = TRUE) AND (balance > 1000)) AND (id = 3)"
	);
	Ok(())
}

#[test]
fn test_delete_through_trigger_view() -> Result<(), DmlError> {
	let delete = delete("DELETE FROM audited_t WHERE a = 1")?;
	assert_eq!(delete.target.name(), "audited_t");
	assert_eq!(delete.condition.expect("condition").to_string(), "a = 1");
	Ok(())
}

#[test]
fn test_unresolved_reference_position() {
	let err = delete("DELETE FROM t\nWHERE zz = 1 AND yy = 2").unwrap_err();
	let DmlError::UnresolvedReference {
		names,
		fragment,
	} = err
	else {
		panic!("expected unresolved reference");
	};
	assert_eq!(names, vec!["zz".to_string(), "yy".to_string()]);
	assert_eq!(fragment.text(), "zz");
	assert_eq!(fragment.line().0, 2);
	assert_eq!(fragment.column().0, 7);
}

#[test]
fn test_not_updatable_view() {
	let err = update("UPDATE summary SET total = 0").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotUpdatable);
}

#[test]
fn test_unknown_target() {
	let err = compile("DELETE FROM nowhere").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::UnknownTarget);
}

#[test]
fn test_parameters_take_column_types() -> Result<(), DmlError> {
	let catalog = test_catalog();
	let config = CompilerConfig::default();
	let mut ctx = CompileContext::new(&catalog, &config);
	let statement = compile_statement(&mut ctx, "UPDATE account SET balance = ? WHERE id = ?")?;
	assert_eq!(ctx.parameter_count(), 2);

	let CompiledStatement::Update(update) = statement else {
		panic!("expected update");
	};
	assert_eq!(update.expressions[0].data_type, Some(tessera_type::Type::Decimal));
	Ok(())
}
