// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::{debug, instrument};

use crate::{
	Result,
	compile::{parse_sort_and_slice, policy, view::resolve_view_target, write_set},
	context::CompileContext,
	expression::{Expression, ExpressionParser},
	range::{DmlOperation, binder::read_range_for_data_change, join::process_conditions},
	resolve::{Resolver, Scope, rewrite::mark_used_columns},
	statement::{CompiledStatement, UpdateStatement},
	target::TargetParser,
	token::{Keyword, TokenStream},
};

#[instrument(name = "dml::compile::update", level = "debug", skip_all)]
pub(crate) fn compile_update(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	tokens.consume_keyword(Keyword::Update)?;
	let range = read_range_for_data_change(ctx, tokens, DmlOperation::Update)?;
	tokens.consume_keyword(Keyword::Set)?;
	let list = TargetParser::new(ctx, tokens).parse_set_clause_list(&range)?;

	let mut condition = match tokens.consume_if_keyword(Keyword::Where) {
		Some(_) => Some(ExpressionParser::new(ctx, tokens).parse()?),
		None => None,
	};

	let ranges = vec![range.clone()];
	let mut sort_and_slice = parse_sort_and_slice(ctx, tokens, &ranges)?;

	let outer = ctx.outer_groups().to_vec();
	let scope = Scope::new(&ranges, &outer);
	let mut expressions = list.expressions;
	for expression in expressions.iter_mut() {
		Resolver::new(ctx).resolve(expression, scope)?;
	}
	if let Some(condition) = condition.as_mut() {
		Resolver::new(ctx).resolve_condition(condition, scope)?;
	}

	let resolution = resolve_view_target(ctx, range, DmlOperation::Update)?;
	let column_map = list.column_map.project(&resolution.column_map);
	for expression in expressions.iter_mut() {
		resolution.rewrite(expression);
	}
	if let Some(condition) = condition.as_mut() {
		resolution.rewrite(condition);
	}
	if let Some(sort_and_slice) = sort_and_slice.as_mut() {
		for key in sort_and_slice.order_by.iter_mut() {
			resolution.rewrite(&mut key.expression);
		}
	}

	let columns = resolution.target.columns();
	policy::resolve_update_expressions(columns, column_map.as_slice(), &mut expressions)?;

	let condition = Expression::and(resolution.filter.clone(), condition);
	let mut target_range = resolution.range.clone();
	for expression in &expressions {
		mark_used_columns(&mut target_range, expression);
	}
	if let Some(condition) = &condition {
		mark_used_columns(&mut target_range, condition);
		target_range.add_join_condition(condition.clone());
	}
	let mut ranges = vec![target_range];
	process_conditions(&mut ranges);

	debug!(table = %resolution.target.name(), columns = column_map.len(), "compiled update");
	Ok(CompiledStatement::Update(UpdateStatement {
		write_tables: write_set(resolution.target.qualified_name()),
		check_list: column_map.check_list(columns.len()),
		column_map: column_map.into_vec(),
		target: resolution.target,
		ranges,
		condition,
		expressions,
		sort_and_slice,
	}))
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;

	use super::*;
	use crate::{CompilerConfig, compile::compile, error::DmlError, token::tokenize};

	fn compile_sql(sql: &str) -> Result<UpdateStatement> {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let mut tokens = TokenStream::new(tokenize(sql)?);
		match compile(&mut ctx, &mut tokens)? {
			CompiledStatement::Update(update) => Ok(update),
			other => panic!("expected update, got {other:?}"),
		}
	}

	#[test]
	fn test_limit_and_order() {
		let update = compile_sql("UPDATE t SET a = a + 1 WHERE b > 0 ORDER BY id DESC LIMIT 10 OFFSET ?").unwrap();
		let slice = update.sort_and_slice.unwrap();
		assert_eq!(slice.order_by.len(), 1);
		assert!(slice.order_by[0].descending);
		assert_eq!(slice.limit.unwrap().to_string(), "10");
		assert_eq!(slice.offset.unwrap().data_type, Some(tessera_type::Type::Int8));
	}

	#[test]
	fn test_order_without_limit() {
		let err = compile_sql("UPDATE t SET a = 1 ORDER BY id").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}

	#[test]
	fn test_alias_qualifies_targets_and_condition() {
		let update = compile_sql("UPDATE t AS x SET x.a = x.b WHERE x.id = 1").unwrap();
		assert_eq!(update.column_map, vec![1]);
		assert_eq!(update.check_list, vec![false, true, false]);
		assert!(update.ranges[0].used_columns[0]);
	}

	#[test]
	fn test_where_must_be_boolean() {
		let err = compile_sql("UPDATE t SET a = 1 WHERE id + 1").unwrap_err();
		assert!(matches!(err, DmlError::TypeMismatch { .. }));
	}

	#[test]
	fn test_assignment_type_mismatch() {
		let err = compile_sql("UPDATE t SET a = 'text'").unwrap_err();
		assert!(matches!(err, DmlError::TypeMismatch { .. }));
	}

	#[test]
	fn test_trigger_view_stays_on_view() {
		let update = compile_sql("UPDATE audited_t SET a = 2").unwrap();
		assert_eq!(update.target.name(), "audited_t");
		assert!(update.condition.is_none());
	}
}
