// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::test_utils::test_catalog;
use tessera_dml::{CompiledStatement, CompilerConfig, DmlCompiler, DmlError, InsertMode, InsertStatement};
use tessera_type::IntoDiagnostic;

fn insert(config: CompilerConfig, sql: &str) -> Result<InsertStatement, DmlError> {
	let compiler = DmlCompiler::new(test_catalog(), config);
	match compiler.compile(sql)?.statement {
		CompiledStatement::Insert(insert) => Ok(insert),
		other => panic!("expected insert, got {other:?}"),
	}
}

#[test]
fn test_mysql_upsert() -> Result<(), DmlError> {
	let insert = insert(
		CompilerConfig::mysql(),
		"INSERT INTO t (id, a) VALUES (1, 2) ON DUPLICATE KEY UPDATE a = VALUES(a)",
	)?;
	assert_eq!(insert.mode, InsertMode::Update);
	let assignments = insert.on_duplicate.expect("assignments");
	assert_eq!(assignments.column_map, vec![1]);
	assert_eq!(assignments.expressions[0].to_string(), "VALUES.a");
	Ok(())
}

#[test]
fn test_mysql_syntax_needs_dialect() {
	let err = insert(CompilerConfig::default(), "REPLACE INTO t VALUES (1, 2, 3)").unwrap_err();
	assert!(matches!(err, DmlError::Syntax { .. }));

	let replace = insert(CompilerConfig::mysql(), "REPLACE INTO t VALUES (1, 2, 3)").unwrap();
	assert_eq!(replace.mode, InsertMode::Replace);
}

#[test]
fn test_upsert_rejected_after_replace_or_ignore() {
	for sql in [
		"REPLACE INTO t VALUES (1, 2, 3) ON DUPLICATE KEY UPDATE a = 5",
		"INSERT IGNORE INTO t VALUES (1, 2, 3) ON DUPLICATE KEY UPDATE a = 5",
	] {
		let err = insert(CompilerConfig::mysql(), sql).unwrap_err();
		assert!(matches!(err, DmlError::Syntax { ref found, .. } if found == "ON"), "{sql}: {err:?}");
	}
}

#[test]
fn test_config_from_json() -> Result<(), DmlError> {
	let config = CompilerConfig::from_json(r#"{ "default_namespace": "archive" }"#).expect("valid config");
	let insert = insert(config, "INSERT INTO t (a) VALUES (7)")?;
	assert_eq!(insert.target.qualified_name().to_string(), "archive.t");
	Ok(())
}

#[test]
fn test_diagnostic_code() {
	let err = insert(CompilerConfig::default(), "INSERT INTO t (a, a) VALUES (1, 2)").unwrap_err();
	let diagnostic = err.into_diagnostic();
	assert!(diagnostic.code.starts_with("DML_"));
	assert_eq!(diagnostic.fragment.text(), "a");
}
