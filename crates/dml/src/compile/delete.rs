// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::{debug, instrument};

use crate::{
	Result,
	compile::{parse_sort_and_slice, view::resolve_view_target, write_set},
	context::CompileContext,
	expression::{Expression, ExpressionParser},
	range::{DmlOperation, binder::read_range_for_data_change, join::process_conditions},
	resolve::{Resolver, Scope, rewrite::mark_used_columns},
	statement::{CompiledStatement, DeleteStatement},
	token::{Keyword, TokenStream},
};

#[instrument(name = "dml::compile::delete", level = "debug", skip_all)]
pub(crate) fn compile_delete(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	tokens.consume_keyword(Keyword::Delete)?;
	tokens.consume_keyword(Keyword::From)?;
	let range = read_range_for_data_change(ctx, tokens, DmlOperation::Delete)?;

	let mut condition = match tokens.consume_if_keyword(Keyword::Where) {
		Some(_) => Some(ExpressionParser::new(ctx, tokens).parse()?),
		None => None,
	};
	let ranges = vec![range.clone()];
	let mut sort_and_slice = parse_sort_and_slice(ctx, tokens, &ranges)?;

	if let Some(condition) = condition.as_mut() {
		let outer = ctx.outer_groups().to_vec();
		Resolver::new(ctx).resolve_condition(condition, Scope::new(&ranges, &outer))?;
	}

	let resolution = resolve_view_target(ctx, range, DmlOperation::Delete)?;
	if let Some(condition) = condition.as_mut() {
		resolution.rewrite(condition);
	}
	if let Some(sort_and_slice) = sort_and_slice.as_mut() {
		for key in sort_and_slice.order_by.iter_mut() {
			resolution.rewrite(&mut key.expression);
		}
	}

	let condition = Expression::and(resolution.filter.clone(), condition);
	let mut target_range = resolution.range.clone();
	if let Some(condition) = &condition {
		mark_used_columns(&mut target_range, condition);
		target_range.add_join_condition(condition.clone());
	}
	let mut ranges = vec![target_range];
	process_conditions(&mut ranges);

	debug!(table = %resolution.target.name(), "compiled delete");
	Ok(CompiledStatement::Delete(DeleteStatement {
		write_tables: write_set(resolution.target.qualified_name()),
		target: resolution.target,
		ranges,
		condition,
		sort_and_slice,
	}))
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;

	use super::*;
	use crate::{CompilerConfig, compile::compile, error::DmlError, token::tokenize};

	fn compile_sql(sql: &str) -> Result<DeleteStatement> {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let mut tokens = TokenStream::new(tokenize(sql)?);
		match compile(&mut ctx, &mut tokens)? {
			CompiledStatement::Delete(delete) => Ok(delete),
			other => panic!("expected delete, got {other:?}"),
		}
	}

	#[test]
	fn test_delete_all_rows() {
		let delete = compile_sql("DELETE FROM archive.t").unwrap();
		assert!(delete.condition.is_none());
		assert_eq!(delete.target.qualified_name().to_string(), "archive.t");
	}

	#[test]
	fn test_delete_through_view_keeps_filter_without_where() {
		let delete = compile_sql("DELETE FROM active_account").unwrap();
		assert_eq!(delete.condition.unwrap().to_string(), "active = TRUE");
		assert_eq!(delete.target.name(), "account");
	}

	#[test]
	fn test_delete_from_view_without_base() {
		let err = compile_sql("DELETE FROM summary").unwrap_err();
		assert!(matches!(err, DmlError::NotUpdatable { .. }));
	}

	#[test]
	fn test_delete_limit() {
		let delete = compile_sql("DELETE FROM t WHERE a = 1 LIMIT 5;").unwrap();
		assert!(delete.sort_and_slice.unwrap().offset.is_none());
	}

	#[test]
	fn test_trailing_tokens() {
		let err = compile_sql("DELETE FROM t WHERE a = 1 garbage").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}
}
