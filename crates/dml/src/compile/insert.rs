// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::{ColumnDef, IdentityGeneration};
use tessera_type::{Fragment, Type};
use tracing::{debug, instrument};

use crate::{
	Result,
	compile::{
		policy::{self, Overriding, OverridingKind},
		view::{ViewResolution, resolve_view_target},
		write_set,
	},
	context::CompileContext,
	error::DmlError,
	expression::{Expression, ExpressionKind},
	range::{DmlOperation, RangeBinding, binder::read_range_for_data_change},
	resolve::{Resolver, Scope, rewrite::replace_column_references},
	statement::{Assignments, CompiledStatement, InsertMode, InsertSource, InsertStatement},
	target::{ColumnMap, NEW_ROW_QUALIFIER, TargetParser},
	token::{Keyword, Operator, TokenStream},
	value::parse_contextually_typed_table,
};

#[instrument(name = "dml::compile::insert", level = "debug", skip_all)]
pub(crate) fn compile_insert(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	let mysql = ctx.config().dialect.mysql;

	let mut mode = InsertMode::Plain;
	if tokens.consume_if_keyword(Keyword::Replace).is_some() {
		mode = InsertMode::Replace;
	} else {
		tokens.consume_keyword(Keyword::Insert)?;
		if mysql && tokens.consume_if_keyword(Keyword::Ignore).is_some() {
			mode = InsertMode::Ignore;
		}
	}
	if mysql {
		tokens.consume_if_keyword(Keyword::Into);
	} else {
		tokens.consume_keyword(Keyword::Into)?;
	}

	let range = read_range_for_data_change(ctx, tokens, DmlOperation::Insert)?;
	let resolution = resolve_view_target(ctx, range.clone(), DmlOperation::Insert)?;
	let columns = resolution.target.columns().to_vec();

	if tokens.consume_if_keyword(Keyword::Default).is_some() {
		tokens.consume_keyword(Keyword::Values)?;
		let column_map = ColumnMap::all(range.columns.len()).project(&resolution.column_map);
		let fragment = range.fragment.clone();
		debug!(table = %resolution.target.name(), "insert default values");
		return Ok(CompiledStatement::Insert(InsertStatement {
			write_tables: write_set(resolution.target.qualified_name()),
			target: resolution.target,
			mode,
			check_list: column_map.check_list(columns.len()),
			column_map: column_map.into_vec(),
			source: InsertSource::Values(Expression::new(
				ExpressionKind::Values(vec![Expression::new(ExpressionKind::Row(vec![]), fragment.clone())]),
				fragment,
			)),
			override_index: None,
			on_duplicate: None,
		}));
	}

	let mut column_map = ColumnMap::all(range.columns.len());
	if tokens.is_operator(Operator::OpenParen) && !is_query_ahead(tokens) {
		let oracle = ctx.config().dialect.oracle;
		column_map = TargetParser::new(ctx, tokens).parse_column_list(&range, oracle)?;
	}
	let base_map = column_map.project(&resolution.column_map);
	let overriding = policy::parse_overriding(tokens)?;
	let outer = ctx.outer_groups().to_vec();

	let mut override_index = None;
	let source = if tokens.consume_if_keyword(Keyword::Values).is_some()
		|| (mysql && tokens.consume_if_keyword(Keyword::Value).is_some())
	{
		let mut rows = parse_contextually_typed_table(ctx, tokens, column_map.len())?;
		Resolver::new(ctx).resolve(&mut rows, Scope::outer_only(&outer))?;
		let ExpressionKind::Values(cells) = &mut rows.kind else {
			return Err(DmlError::syntax("VALUES", &rows.fragment));
		};
		policy::apply_insert_policy(&columns, base_map.as_slice(), cells, overriding.as_ref())?;
		InsertSource::Values(rows)
	} else if is_query_start(tokens) {
		let expected: Vec<Type> = base_map.as_slice().iter().map(|&c| columns[c].data_type).collect();
		let queries = ctx.queries();
		let fragment = tokens.fragment();
		let plan = queries.compile(ctx, tokens, &outer, Some(&expected))?;
		if plan.column_count() != column_map.len() {
			return Err(DmlError::DegreeMismatch {
				expected: column_map.len(),
				actual: plan.column_count(),
				fragment,
			});
		}
		override_index = check_query_columns(
			&columns,
			base_map.as_slice(),
			&plan.column_types(),
			overriding.as_ref(),
			&fragment,
		)?;
		if mode == InsertMode::Plain {
			mode = InsertMode::Select;
		}
		InsertSource::Query(Box::new(plan))
	} else {
		return Err(DmlError::syntax("VALUES or a query", &tokens.fragment()));
	};

	// REPLACE and IGNORE already settle conflicts; a trailing ON is left for expect_end
	let upsert = mysql && matches!(mode, InsertMode::Plain | InsertMode::Select);
	let on_duplicate = if upsert && tokens.consume_if_keyword(Keyword::On).is_some() {
		tokens.consume_keyword(Keyword::Duplicate)?;
		tokens.consume_keyword(Keyword::Key)?;
		tokens.consume_keyword(Keyword::Update)?;
		mode = InsertMode::Update;
		Some(compile_on_duplicate(ctx, tokens, &range, &resolution)?)
	} else {
		None
	};

	debug!(table = %resolution.target.name(), columns = base_map.len(), ?mode, "compiled insert");
	Ok(CompiledStatement::Insert(InsertStatement {
		write_tables: write_set(resolution.target.qualified_name()),
		check_list: base_map.check_list(columns.len()),
		column_map: base_map.into_vec(),
		target: resolution.target,
		mode,
		source,
		override_index,
		on_duplicate,
	}))
}

/// Whether the bracket at the head of `tokens` opens a query rather than a
/// column list.
fn is_query_ahead(tokens: &TokenStream) -> bool {
	let mut n = 0;
	while tokens.peek_nth(n).is_some_and(|t| t.is_operator(Operator::OpenParen)) {
		n += 1;
	}
	tokens.peek_nth(n).is_some_and(|t| {
		t.is_keyword(Keyword::Select)
			|| t.is_keyword(Keyword::Table)
			|| t.is_keyword(Keyword::With)
			|| t.is_keyword(Keyword::Values)
	})
}

fn is_query_start(tokens: &TokenStream) -> bool {
	tokens.is_operator(Operator::OpenParen)
		|| tokens.is_keyword(Keyword::Select)
		|| tokens.is_keyword(Keyword::Table)
		|| tokens.is_keyword(Keyword::With)
}

/// Column policy for `INSERT ... SELECT`, where cells cannot be DEFAULT.
/// Returns the table column of the identity whose value the executor
/// replaces under `OVERRIDING USER VALUE`.
fn check_query_columns(
	columns: &[ColumnDef],
	column_map: &[usize],
	produced: &[Type],
	overriding: Option<&Overriding>,
	fragment: &Fragment,
) -> Result<Option<usize>> {
	policy::check_overriding_target(columns, column_map, overriding)?;

	let mut override_index = None;
	for (&index, &produced) in column_map.iter().zip(produced) {
		let column = &columns[index];
		if column.is_generated() {
			return Err(DmlError::GeneratedColumnWrite {
				column: column.name.clone(),
				fragment: fragment.clone(),
			});
		}
		match (column.identity, overriding.map(|o| o.kind)) {
			(Some(_), Some(OverridingKind::User)) => {
				override_index = Some(index);
				continue;
			}
			(Some(IdentityGeneration::Always), None) => {
				return Err(DmlError::IdentityOverrideRequired {
					column: column.name.clone(),
					fragment: fragment.clone(),
				});
			}
			_ => {}
		}
		if !column.data_type.can_assign_from(produced) {
			return Err(DmlError::type_mismatch(
				format!("cannot assign {produced} to column {} of type {}", column.name, column.data_type),
				fragment,
			));
		}
	}
	Ok(override_index)
}

/// `ON DUPLICATE KEY UPDATE`: assignments over the target row, where
/// `VALUES(col)` reads the row proposed for insertion.
fn compile_on_duplicate(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	range: &RangeBinding,
	resolution: &ViewResolution,
) -> Result<Assignments> {
	let list = TargetParser::new(ctx, tokens).parse_set_clause_list(range)?;

	let new_row = RangeBinding::new(
		ctx.next_range_id(),
		NEW_ROW_QUALIFIER,
		range.source.clone(),
		range.columns.clone(),
		range.fragment.clone(),
	);
	let base_new_row = RangeBinding::new(
		new_row.id,
		NEW_ROW_QUALIFIER,
		resolution.range.source.clone(),
		resolution.range.columns.clone(),
		range.fragment.clone(),
	);
	let ranges = vec![range.clone(), new_row];
	let outer = ctx.outer_groups().to_vec();

	let mut expressions = list.expressions;
	for expression in expressions.iter_mut() {
		Resolver::new(ctx).resolve(expression, Scope::new(&ranges, &outer))?;
		resolution.rewrite(expression);
		if resolution.is_rewritten() {
			replace_column_references(expression, base_new_row.id, &base_new_row, &resolution.column_map);
		}
	}

	let column_map = list.column_map.project(&resolution.column_map);
	let columns = resolution.target.columns();
	policy::resolve_update_expressions(columns, column_map.as_slice(), &mut expressions)?;
	Ok(Assignments {
		check_list: column_map.check_list(columns.len()),
		column_map: column_map.into_vec(),
		expressions,
	})
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;

	use super::*;
	use crate::{CompilerConfig, compile::compile, token::tokenize};

	fn compile_sql(config: &CompilerConfig, sql: &str) -> Result<InsertStatement> {
		let catalog = test_catalog();
		let mut ctx = CompileContext::new(&catalog, config);
		let mut tokens = TokenStream::new(tokenize(sql)?);
		match compile(&mut ctx, &mut tokens)? {
			CompiledStatement::Insert(insert) => Ok(insert),
			other => panic!("expected insert, got {other:?}"),
		}
	}

	#[test]
	fn test_default_values() {
		let insert = compile_sql(&CompilerConfig::default(), "INSERT INTO ledger DEFAULT VALUES").unwrap();
		assert_eq!(insert.column_map, vec![0, 1, 2]);
		assert_eq!(insert.check_list, vec![true, true, true]);
		let InsertSource::Values(rows) = &insert.source else {
			panic!("expected values");
		};
		assert_eq!(rows.children().len(), 1);
		assert_eq!(rows.children()[0].degree(), 0);
	}

	#[test]
	fn test_query_ahead_detection() {
		let insert = compile_sql(&CompilerConfig::default(), "INSERT INTO t (SELECT id, a, b FROM archive.t)").unwrap();
		assert_eq!(insert.mode, InsertMode::Select);
		assert_eq!(insert.column_map, vec![0, 1, 2]);
	}

	#[test]
	fn test_query_rejects_generated_target() {
		let err = compile_sql(
			&CompilerConfig::default(),
			"INSERT INTO account (name, label) SELECT name, name FROM staging",
		)
		.unwrap_err();
		assert!(matches!(err, DmlError::GeneratedColumnWrite { .. }));
	}

	#[test]
	fn test_query_override_index() {
		let insert = compile_sql(
			&CompilerConfig::default(),
			"INSERT INTO account (id, name) OVERRIDING USER VALUE SELECT id, name FROM staging",
		)
		.unwrap();
		assert_eq!(insert.override_index, Some(0));

		let insert = compile_sql(
			&CompilerConfig::default(),
			"INSERT INTO account (name, id) OVERRIDING USER VALUE SELECT name, id FROM staging",
		)
		.unwrap();
		assert_eq!(insert.override_index, Some(0));
	}

	#[test]
	fn test_mysql_forms() {
		let config = CompilerConfig::mysql();
		let insert = compile_sql(&config, "REPLACE t VALUE (1, 2, 3)").unwrap();
		assert_eq!(insert.mode, InsertMode::Replace);

		let insert = compile_sql(&config, "INSERT IGNORE INTO t (a) VALUES (1)").unwrap();
		assert_eq!(insert.mode, InsertMode::Ignore);

		let err = compile_sql(&CompilerConfig::default(), "REPLACE INTO t VALUES (1, 2, 3)").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}
}
