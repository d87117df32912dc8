// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::Relation;
use tracing::{debug, instrument};

use crate::{
	Result,
	compile::write_set,
	context::CompileContext,
	error::{DmlError, ObjectKind},
	range::{DmlOperation, binder::read_range_for_data_change},
	statement::{CompiledStatement, TruncateForm, TruncateStatement, TruncateTarget, WriteSet},
	token::{Keyword, TokenStream},
};

#[instrument(name = "dml::compile::truncate", level = "debug", skip_all)]
pub(crate) fn compile_truncate(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	tokens.consume_keyword(Keyword::Truncate)?;

	let (target, write_tables) = if tokens.consume_if_keyword(Keyword::Table).is_some() {
		let range = read_range_for_data_change(ctx, tokens, DmlOperation::Truncate)?;
		let Some(Relation::Table(table)) = range.relation() else {
			return Err(DmlError::NotUpdatable {
				view: range.name.clone(),
				operation: DmlOperation::Truncate,
				fragment: range.fragment.clone(),
			});
		};
		let write_tables = write_set(table.qualified_name());
		(TruncateTarget::Table(table), write_tables)
	} else if tokens.consume_if_keyword(Keyword::Schema).is_some() {
		let token = tokens.consume_identifier()?;
		let Some(namespace) = ctx.catalog().find_namespace(token.text()) else {
			return Err(DmlError::UnknownTarget {
				kind: ObjectKind::Namespace,
				name: token.text().to_string(),
				fragment: token.fragment,
			});
		};
		let mut tables = ctx.catalog().list_base_tables();
		tables.retain(|name| name.namespace.as_deref() == Some(namespace.name.as_str()));
		tables.sort();
		let write_tables: WriteSet = tables.into_iter().collect();
		(TruncateTarget::Schema(namespace), write_tables)
	} else {
		return Err(DmlError::syntax("TABLE or SCHEMA", &tokens.fragment()));
	};

	let restart_identity = if tokens.consume_if_keyword(Keyword::Restart).is_some() {
		tokens.consume_keyword(Keyword::Identity)?;
		true
	} else {
		if tokens.consume_if_keyword(Keyword::Continue).is_some() {
			tokens.consume_keyword(Keyword::Identity)?;
		}
		false
	};

	let form = if tokens.consume_if_keyword(Keyword::And).is_some() {
		tokens.consume_keyword(Keyword::Commit)?;
		let no_check = match tokens.consume_if_keyword(Keyword::No) {
			Some(_) => {
				tokens.consume_keyword(Keyword::Check)?;
				true
			}
			None => false,
		};
		TruncateForm::Command {
			no_check,
		}
	} else {
		if matches!(target, TruncateTarget::Schema(_)) {
			return Err(DmlError::syntax("AND COMMIT", &tokens.fragment()));
		}
		TruncateForm::Rows
	};

	debug!(tables = write_tables.len(), restart_identity, ?form, "compiled truncate");
	Ok(CompiledStatement::Truncate(TruncateStatement {
		target,
		restart_identity,
		form,
		write_tables,
	}))
}

#[cfg(test)]
mod tests {
	use tessera_catalog::{QualifiedName, test_utils::test_catalog};

	use super::*;
	use crate::{CompilerConfig, compile::compile, token::tokenize};

	fn compile_sql(sql: &str) -> Result<TruncateStatement> {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let mut tokens = TokenStream::new(tokenize(sql)?);
		match compile(&mut ctx, &mut tokens)? {
			CompiledStatement::Truncate(truncate) => Ok(truncate),
			other => panic!("expected truncate, got {other:?}"),
		}
	}

	#[test]
	fn test_truncate_table() {
		let truncate = compile_sql("TRUNCATE TABLE ledger RESTART IDENTITY").unwrap();
		assert!(matches!(truncate.target, TruncateTarget::Table(ref table) if table.name == "ledger"));
		assert!(truncate.restart_identity);
		assert_eq!(truncate.form, TruncateForm::Rows);
		assert_eq!(truncate.write_tables.len(), 1);
	}

	#[test]
	fn test_truncate_table_and_commit() {
		let truncate = compile_sql("TRUNCATE TABLE t CONTINUE IDENTITY AND COMMIT NO CHECK").unwrap();
		assert!(!truncate.restart_identity);
		assert_eq!(
			truncate.form,
			TruncateForm::Command {
				no_check: true
			}
		);
	}

	#[test]
	fn test_truncate_schema() {
		let truncate = compile_sql("TRUNCATE SCHEMA archive AND COMMIT").unwrap();
		let tables: Vec<_> = truncate.write_tables.iter().cloned().collect();
		assert_eq!(tables, vec![QualifiedName::new("archive", "t")]);
	}

	#[test]
	fn test_truncate_schema_requires_commit() {
		let err = compile_sql("TRUNCATE SCHEMA public").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}

	#[test]
	fn test_unknown_schema() {
		let err = compile_sql("TRUNCATE SCHEMA nowhere AND COMMIT").unwrap_err();
		assert!(matches!(
			err,
			DmlError::UnknownTarget {
				kind: ObjectKind::Namespace,
				..
			}
		));
	}

	#[test]
	fn test_bare_name_is_rejected() {
		let err = compile_sql("TRUNCATE ledger").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}
}
