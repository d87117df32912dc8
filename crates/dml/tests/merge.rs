// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::test_utils::test_catalog;
use tessera_dml::{
	CompileContext, CompiledStatement, CompilerConfig, DmlError, MergeBranch, MergeStatement, compile_statement,
};

fn merge(sql: &str) -> Result<MergeStatement, DmlError> {
	let catalog = test_catalog();
	let config = CompilerConfig::default();
	let mut ctx = CompileContext::new(&catalog, &config);
	match compile_statement(&mut ctx, sql)? {
		CompiledStatement::Merge(merge) => Ok(merge),
		other => panic!("expected merge, got {other:?}"),
	}
}

#[test]
fn test_upsert_from_staging() -> Result<(), DmlError> {
	let merge = merge(
		"MERGE INTO account a USING staging s ON a.id = s.id \
		 WHEN MATCHED THEN UPDATE SET balance = s.balance \
		 WHEN NOT MATCHED THEN INSERT (name, balance) VALUES (s.name, s.balance)",
	)?;
	assert_eq!(merge.target.name(), "account");
	assert_eq!(merge.ranges.len(), 2);
	assert_eq!(merge.ranges[0].name, "s");

	let update = merge.update.expect("update branch");
	assert_eq!(update.assignments.column_map, vec![2]);
	let insert = merge.insert.expect("insert branch");
	assert_eq!(insert.column_map, vec![1, 2]);
	assert_eq!(insert.check_list, vec![false, true, true, false, false]);
	assert!(merge.delete.is_none());
	Ok(())
}

#[test]
fn test_merge_into_view_adds_filter() -> Result<(), DmlError> {
	let merge = merge(
		"MERGE INTO active_account v USING staging s ON v.id = s.id \
		 WHEN MATCHED THEN UPDATE SET balance = s.balance",
	)?;
	assert_eq!(merge.target.name(), "account");
	assert_eq!(merge.condition.to_string(), "(active = TRUE) AND (account.id = s.id)");
	Ok(())
}

#[test]
fn test_duplicate_branch() {
	let err = merge(
		"MERGE INTO t USING archive.t s ON t.id = s.id \
		 WHEN MATCHED THEN UPDATE SET a = 1 \
		 WHEN MATCHED THEN UPDATE SET b = 1",
	)
	.unwrap_err();
	assert!(matches!(
		err,
		DmlError::DuplicateMergeBranch {
			branch: MergeBranch::Update,
			..
		}
	));
}

#[test]
fn test_identity_policy_applies_to_insert_branch() {
	let err = merge(
		"MERGE INTO account a USING staging s ON a.id = s.id \
		 WHEN NOT MATCHED THEN INSERT (id, name) VALUES (s.id, s.name)",
	)
	.unwrap_err();
	assert!(matches!(err, DmlError::IdentityOverrideRequired { .. }));
}

#[test]
fn test_guards() -> Result<(), DmlError> {
	let merge = merge(
		"MERGE INTO t USING archive.t s ON t.id = s.id \
		 WHEN MATCHED AND s.b = 0 THEN DELETE \
		 WHEN NOT MATCHED AND s.a > 10 THEN INSERT VALUES (s.id, s.a, s.b)",
	)?;
	assert!(merge.delete_first);
	assert_eq!(merge.delete.expect("delete branch").guard.to_string(), "s.b = 0");
	assert_eq!(merge.insert.expect("insert branch").guard.to_string(), "s.a > 10");
	Ok(())
}
