// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::slice;

use tessera_type::Fragment;
use tracing::{debug, instrument, trace};

use crate::{
	Result,
	compile::{
		policy,
		view::{ViewResolution, resolve_view_target},
		write_set,
	},
	context::CompileContext,
	error::DmlError,
	expression::{Expression, ExpressionKind, ExpressionParser},
	range::{
		DmlOperation, RangeBinding, RangeGroup,
		binder::{read_range_for_data_change, read_table_or_subquery},
		join::process_conditions,
	},
	resolve::{Resolver, Scope, rewrite::mark_used_columns},
	statement::{
		Assignments, CompiledStatement, MergeBranch, MergeDelete, MergeInsert, MergeStatement, MergeUpdate,
	},
	target::{ColumnMap, SetClauseList, TargetParser},
	token::{Keyword, Operator, TokenStream},
	value::parse_contextually_typed_table,
};

struct UpdateBranch {
	guard: Option<Expression>,
	list: SetClauseList,
}

struct InsertBranch {
	guard: Option<Expression>,
	column_map: ColumnMap,
	row: Expression,
}

/// The WHEN clauses as parsed, before resolution.
#[derive(Default)]
struct Branches {
	update: Option<UpdateBranch>,
	delete: Option<Option<Expression>>,
	insert: Option<InsertBranch>,
	delete_first: bool,
}

#[instrument(name = "dml::compile::merge", level = "debug", skip_all)]
pub(crate) fn compile_merge(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	tokens.consume_keyword(Keyword::Merge)?;
	tokens.consume_keyword(Keyword::Into)?;
	let target = read_range_for_data_change(ctx, tokens, DmlOperation::Merge)?;
	tokens.consume_keyword(Keyword::Using)?;
	let source = read_table_or_subquery(ctx, tokens)?;
	tokens.consume_keyword(Keyword::On)?;
	let mut on = ExpressionParser::new(ctx, tokens).parse()?;

	let ranges = RangeGroup::new(vec![source.clone(), target.clone()])?.into_ranges();
	let outer = ctx.outer_groups().to_vec();
	Resolver::new(ctx).resolve_condition(&mut on, Scope::new(&ranges, &outer))?;

	let branches = parse_branches(ctx, tokens, &target)?;

	// update and delete see the matched pair, insert only the source row
	let matched = Scope::new(&ranges, &outer);
	let unmatched = Scope::new(slice::from_ref(&source), &outer);

	let resolution = resolve_view_target(ctx, target, DmlOperation::Merge)?;
	let columns = resolution.target.columns().to_vec();

	let update = match branches.update {
		Some(UpdateBranch {
			guard,
			list,
		}) => {
			let guard = resolve_guard(ctx, guard, matched)?;
			let mut expressions = list.expressions;
			for expression in expressions.iter_mut() {
				Resolver::new(ctx).resolve(expression, matched)?;
				resolution.rewrite(expression);
			}
			let column_map = list.column_map.project(&resolution.column_map);
			policy::resolve_update_expressions(&columns, column_map.as_slice(), &mut expressions)?;
			Some(MergeUpdate {
				guard: rewritten(&resolution, guard),
				assignments: Assignments {
					check_list: column_map.check_list(columns.len()),
					column_map: column_map.into_vec(),
					expressions,
				},
			})
		}
		None => None,
	};

	let delete = match branches.delete {
		Some(guard) => Some(MergeDelete {
			guard: rewritten(&resolution, resolve_guard(ctx, guard, matched)?),
		}),
		None => None,
	};

	let insert = match branches.insert {
		Some(InsertBranch {
			guard,
			column_map,
			mut row,
		}) => {
			let guard = resolve_guard(ctx, guard, unmatched)?;
			Resolver::new(ctx).resolve(&mut row, unmatched)?;
			let column_map = column_map.project(&resolution.column_map);
			policy::apply_insert_policy(&columns, column_map.as_slice(), slice::from_mut(&mut row), None)?;
			Some(MergeInsert {
				guard,
				check_list: column_map.check_list(columns.len()),
				column_map: column_map.into_vec(),
				row,
			})
		}
		None => None,
	};

	resolution.rewrite(&mut on);
	let condition = Expression::and(resolution.filter.clone(), Some(on)).unwrap_or_else(Expression::always_true);

	let mut target_range = resolution.range.clone();
	mark_used_columns(&mut target_range, &condition);
	if let Some(update) = &update {
		for expression in &update.assignments.expressions {
			mark_used_columns(&mut target_range, expression);
		}
	}
	target_range.add_join_condition(condition.clone());
	let mut ranges = vec![source, target_range];
	process_conditions(&mut ranges);

	debug!(
		table = %resolution.target.name(),
		update = update.is_some(),
		delete = delete.is_some(),
		insert = insert.is_some(),
		"compiled merge"
	);
	Ok(CompiledStatement::Merge(MergeStatement {
		write_tables: write_set(resolution.target.qualified_name()),
		target: resolution.target,
		ranges,
		condition,
		update,
		delete,
		insert,
		delete_first: branches.delete_first,
	}))
}

fn parse_branches(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	target: &RangeBinding,
) -> Result<Branches> {
	let mut branches = Branches::default();
	let mut delete_before_update = false;

	while let Some(when) = tokens.consume_if_keyword(Keyword::When) {
		if tokens.consume_if_keyword(Keyword::Not).is_some() {
			tokens.consume_keyword(Keyword::Matched)?;
			let guard = parse_guard(ctx, tokens)?;
			tokens.consume_keyword(Keyword::Then)?;
			tokens.consume_keyword(Keyword::Insert)?;
			if branches.insert.is_some() {
				return Err(duplicate(MergeBranch::Insert, when.fragment));
			}

			let column_map = if tokens.is_operator(Operator::OpenParen) {
				let oracle = ctx.config().dialect.oracle;
				TargetParser::new(ctx, tokens).parse_column_list(target, oracle)?
			} else {
				ColumnMap::all(target.columns.len())
			};
			tokens.consume_keyword(Keyword::Values)?;
			let values = parse_contextually_typed_table(ctx, tokens, column_map.len())?;
			let ExpressionKind::Values(mut rows) = values.kind else {
				return Err(DmlError::syntax("VALUES", &values.fragment));
			};
			if rows.len() != 1 {
				return Err(DmlError::DegreeMismatch {
					expected: 1,
					actual: rows.len(),
					fragment: values.fragment,
				});
			}
			trace!(columns = column_map.len(), "merge insert branch");
			branches.insert = Some(InsertBranch {
				guard,
				column_map,
				row: rows.remove(0),
			});
			continue;
		}

		tokens.consume_keyword(Keyword::Matched)?;
		let guard = parse_guard(ctx, tokens)?;
		tokens.consume_keyword(Keyword::Then)?;
		if tokens.consume_if_keyword(Keyword::Update).is_some() {
			if branches.update.is_some() {
				return Err(duplicate(MergeBranch::Update, when.fragment));
			}
			tokens.consume_keyword(Keyword::Set)?;
			let list = TargetParser::new(ctx, tokens).parse_set_clause_list(target)?;
			trace!(columns = list.column_map.len(), "merge update branch");
			branches.update = Some(UpdateBranch {
				guard,
				list,
			});
		} else if tokens.consume_if_keyword(Keyword::Delete).is_some() {
			if branches.delete.is_some() {
				return Err(duplicate(MergeBranch::Delete, when.fragment));
			}
			delete_before_update = branches.update.is_none();
			trace!("merge delete branch");
			branches.delete = Some(guard);
		} else {
			return Err(DmlError::syntax("UPDATE or DELETE", &tokens.fragment()));
		}
	}

	if branches.update.is_none() && branches.delete.is_none() && branches.insert.is_none() {
		return Err(DmlError::syntax("WHEN", &tokens.fragment()));
	}
	// an unguarded update matches every row, so the delete guard goes first
	let unguarded_update = branches.update.as_ref().is_none_or(|update| update.guard.is_none());
	branches.delete_first = branches.delete.is_some() && (delete_before_update || unguarded_update);
	Ok(branches)
}

/// `AND condition` between `MATCHED` and `THEN`.
fn parse_guard(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<Option<Expression>> {
	match tokens.consume_if_keyword(Keyword::And) {
		Some(_) => Ok(Some(ExpressionParser::new(ctx, tokens).parse()?)),
		None => Ok(None),
	}
}

fn resolve_guard(ctx: &mut CompileContext<'_>, guard: Option<Expression>, scope: Scope<'_>) -> Result<Expression> {
	match guard {
		Some(mut guard) => {
			Resolver::new(ctx).resolve_condition(&mut guard, scope)?;
			Ok(guard)
		}
		None => Ok(Expression::always_true()),
	}
}

fn rewritten(resolution: &ViewResolution, mut expression: Expression) -> Expression {
	resolution.rewrite(&mut expression);
	expression
}

fn duplicate(branch: MergeBranch, fragment: Fragment) -> DmlError {
	DmlError::DuplicateMergeBranch {
		branch,
		fragment,
	}
}
