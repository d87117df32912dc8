// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Two-phase expression resolution: bind column references to ranges, then
//! infer and check types bottom-up.

pub(crate) mod rewrite;
pub(crate) mod types;

use tessera_type::{Fragment, Type};
use tracing::trace;

use crate::{
	Result,
	context::CompileContext,
	error::{DmlError, ObjectKind},
	expression::{
		ColumnBinding, Expression, ExpressionKind, Function, SubqueryBody, SubqueryExpression, SubqueryKind,
	},
	range::{RangeBinding, RangeGroup},
	token::TokenStream,
};

/// The ranges an expression may reference: the local group first, then the
/// enclosing groups from innermost to outermost.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'r> {
	pub ranges: &'r [RangeBinding],
	pub outer: &'r [RangeGroup],
}

impl<'r> Scope<'r> {
	pub fn new(ranges: &'r [RangeBinding], outer: &'r [RangeGroup]) -> Self {
		Self {
			ranges,
			outer,
		}
	}

	pub fn outer_only(outer: &'r [RangeGroup]) -> Self {
		Self {
			ranges: &[],
			outer,
		}
	}
}

/// References that did not bind, with the place they were written.
pub(crate) type Unresolved = Vec<(String, Fragment)>;

pub(crate) fn check_resolved(unresolved: Unresolved) -> Result<()> {
	match unresolved.first() {
		None => Ok(()),
		Some((_, fragment)) => Err(DmlError::UnresolvedReference {
			fragment: fragment.clone(),
			names: unresolved.into_iter().map(|(name, _)| name).collect(),
		}),
	}
}

pub(crate) struct Resolver<'c, 'a> {
	ctx: &'c mut CompileContext<'a>,
}

impl<'c, 'a> Resolver<'c, 'a> {
	pub fn new(ctx: &'c mut CompileContext<'a>) -> Self {
		Self {
			ctx,
		}
	}

	/// Phase one and two for a value expression.
	pub fn resolve(&mut self, expression: &mut Expression, scope: Scope<'_>) -> Result<Option<Type>> {
		self.resolve_references(expression, scope)?;
		types::resolve_types(expression)
	}

	/// Phase one and two for a search condition, which must be BOOLEAN.
	pub fn resolve_condition(&mut self, condition: &mut Expression, scope: Scope<'_>) -> Result<()> {
		self.resolve_references(condition, scope)?;
		types::resolve_condition_types(condition)
	}

	/// Bind every free column reference; fail listing all that stay unbound.
	pub fn resolve_references(&mut self, expression: &mut Expression, scope: Scope<'_>) -> Result<()> {
		let mut unresolved = Unresolved::new();
		self.collect_references(expression, scope, &mut unresolved)?;
		check_resolved(unresolved)
	}

	/// Bind what can be bound and append the rest to `unresolved`.
	pub fn collect_references(
		&mut self,
		expression: &mut Expression,
		scope: Scope<'_>,
		unresolved: &mut Unresolved,
	) -> Result<()> {
		if let ExpressionKind::Column(column) = &mut expression.kind {
			if column.binding.is_none() {
				match lookup(scope, column.qualifier.as_deref(), &column.name, &expression.fragment)? {
					Some(binding) => {
						trace!(column = %column.name, range = %binding.range, "bound column");
						column.binding = Some(binding);
					}
					None => {
						let name = match &column.qualifier {
							Some(qualifier) => format!("{qualifier}.{}", column.name),
							None => column.name.clone(),
						};
						unresolved.push((name, expression.fragment.clone()));
					}
				}
			}
			return Ok(());
		}

		if let ExpressionKind::Subquery(subquery) = &mut expression.kind {
			if let SubqueryBody::Pending(tokens) = &mut subquery.body {
				let tokens = std::mem::take(tokens);
				let plan = self.compile_subquery(tokens, subquery, scope, &expression.fragment)?;
				subquery.body = SubqueryBody::Compiled(Box::new(plan));
			}
			return Ok(());
		}

		if let ExpressionKind::Function(function) = &mut expression.kind {
			if function.function.is_none() {
				function.function = Some(Function::from_name(&function.name).ok_or_else(|| {
					DmlError::UnknownTarget {
						kind: ObjectKind::Function,
						name: function.name.clone(),
						fragment: expression.fragment.clone(),
					}
				})?);
			}
		}

		for child in expression.children_mut() {
			self.collect_references(child, scope, unresolved)?;
		}
		Ok(())
	}

	fn compile_subquery(
		&mut self,
		tokens: Vec<crate::token::Token>,
		subquery: &SubqueryExpression,
		scope: Scope<'_>,
		fragment: &Fragment,
	) -> Result<crate::query::QueryPlan> {
		let mut outer = scope.outer.to_vec();
		if !scope.ranges.is_empty() {
			outer.push(RangeGroup::new(scope.ranges.to_vec())?);
		}

		let queries = self.ctx.queries();
		let mut stream = TokenStream::new(tokens);
		let plan = queries.compile(self.ctx, &mut stream, &outer, None)?;
		stream.expect_end()?;

		let expected = match subquery.kind {
			SubqueryKind::Scalar => 1,
			SubqueryKind::Row {
				degree,
			} => degree,
		};
		if plan.column_count() != expected {
			return Err(DmlError::DegreeMismatch {
				expected,
				actual: plan.column_count(),
				fragment: fragment.clone(),
			});
		}
		Ok(plan)
	}
}

/// Find the range column `qualifier.name` refers to.
pub(crate) fn lookup(
	scope: Scope<'_>,
	qualifier: Option<&str>,
	name: &str,
	fragment: &Fragment,
) -> Result<Option<ColumnBinding>> {
	if let Some(binding) = lookup_in_group(scope.ranges, qualifier, name, fragment)? {
		return Ok(Some(binding));
	}
	for group in scope.outer.iter().rev() {
		if let Some(binding) = lookup_in_group(group.ranges(), qualifier, name, fragment)? {
			return Ok(Some(binding));
		}
	}
	Ok(None)
}

fn lookup_in_group(
	ranges: &[RangeBinding],
	qualifier: Option<&str>,
	name: &str,
	fragment: &Fragment,
) -> Result<Option<ColumnBinding>> {
	let mut found: Option<ColumnBinding> = None;
	for range in ranges {
		if let Some(qualifier) = qualifier {
			if !range.matches_qualifier(qualifier) {
				continue;
			}
		}
		let Some(column) = range.column_index(name) else {
			continue;
		};
		if found.is_some() {
			return Err(DmlError::AmbiguousReference {
				name: name.to_string(),
				fragment: fragment.clone(),
			});
		}
		found = Some(ColumnBinding {
			range: range.id,
			column,
			data_type: range.columns[column].data_type,
			variable: range.is_variables(),
		});
	}
	Ok(found)
}
