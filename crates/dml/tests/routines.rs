// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::{QualifiedName, test_utils::test_catalog};
use tessera_dml::{
	CallTarget, CompileContext, CompiledStatement, CompilerConfig, DmlCompiler, DmlError, ErrorKind, ObjectKind,
	RangeColumn, StatementKind, TruncateForm, compile_statement,
};
use tessera_type::Type;

#[test]
fn test_call_inside_routine_scope() -> Result<(), DmlError> {
	let catalog = test_catalog();
	let config = CompilerConfig::default();
	let mut ctx = CompileContext::new(&catalog, &config);
	ctx.declare_variables(vec![RangeColumn::new("acct", Type::Int8), RangeColumn::new("bal", Type::Decimal)]);

	let statement = compile_statement(&mut ctx, "CALL fetch_balance(acct, bal)")?;
	let CompiledStatement::ProcedureCall(call) = statement else {
		panic!("expected call");
	};
	let CallTarget::Routine {
		arguments,
		..
	} = &call.target
	else {
		panic!("expected routine call");
	};
	assert!(arguments[1].is_variable());
	assert_eq!(ctx.procedure_calls()[0].name, "fetch_balance");
	assert!(call.write_tables.is_empty());
	Ok(())
}

#[test]
fn test_out_argument_must_be_variable() {
	let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
	let err = compiler.compile("CALL fetch_balance(1, 2 + 3)").unwrap_err();
	assert!(matches!(
		err,
		DmlError::InvalidOutArgument {
			position: 2,
			..
		}
	));
}

#[test]
fn test_call_unknown_routine() {
	let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
	let err = compiler.compile("CALL missing_proc(1, 2)").unwrap_err();
	assert!(matches!(
		err,
		DmlError::UnknownTarget {
			kind: ObjectKind::Routine,
			..
		}
	));
}

#[test]
fn test_call_wrong_arity() {
	let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
	let err = compiler.compile("CALL adjust(1)").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::UnknownTarget);
}

#[test]
fn test_call_scalar_expression() -> Result<(), DmlError> {
	let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
	let compilation = compiler.compile("CALL 1 + 2")?;
	let CompiledStatement::ProcedureCall(call) = compilation.statement else {
		panic!("expected call");
	};
	assert!(matches!(call.target, CallTarget::Expression(ref e) if e.to_string() == "1 + 2"));
	assert!(compilation.procedure_calls.is_empty());
	Ok(())
}

#[test]
fn test_truncate_schema_writes_every_table() -> Result<(), DmlError> {
	let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
	let compilation = compiler.compile("TRUNCATE SCHEMA public RESTART IDENTITY AND COMMIT")?;
	assert_eq!(compilation.statement.kind(), StatementKind::Truncate);

	let CompiledStatement::Truncate(truncate) = compilation.statement else {
		panic!("expected truncate");
	};
	assert!(truncate.restart_identity);
	assert_eq!(
		truncate.form,
		TruncateForm::Command {
			no_check: false
		}
	);
	let written: Vec<_> = truncate.write_tables.into_iter().collect();
	assert_eq!(
		written,
		vec![
			QualifiedName::new("public", "account"),
			QualifiedName::new("public", "ledger"),
			QualifiedName::new("public", "staging"),
			QualifiedName::new("public", "t"),
		]
	);
	Ok(())
}

#[test]
fn test_truncate_view_is_rejected() {
	let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
	let err = compiler.compile("TRUNCATE TABLE active_account").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotUpdatable);
}
