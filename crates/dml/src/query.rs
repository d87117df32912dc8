// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Queries embedded in data change statements: INSERT ... SELECT, subqueries
//! in SET lists and conditions, and the MERGE source.
//!
//! Statement compilation only needs the shape of a query (its column names
//! and types) and its expressions, so the query compiler is a collaborator
//! behind [`QueryCompiler`]. [`SelectCompiler`] covers single-block
//! `SELECT`, `TABLE` and `VALUES`.

use tessera_type::{Fragment, Type};
use tracing::{instrument, trace};

use crate::{
	Result,
	context::CompileContext,
	error::DmlError,
	expression::{ColumnBinding, ColumnExpression, Expression, ExpressionKind, ExpressionParser},
	range::{
		RangeBinding, RangeColumn, RangeGroup,
		binder::{bind_relation, read_alias, read_qualified_name},
	},
	resolve::{Resolver, Scope},
	token::{Keyword, Operator, TokenKind, TokenStream},
};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
	pub columns: Vec<RangeColumn>,
	pub body: QueryBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryBody {
	Select {
		projection: Vec<Expression>,
		ranges: Vec<RangeBinding>,
		condition: Option<Expression>,
	},
	/// A `Values` expression of rows.
	Values(Expression),
}

impl QueryPlan {
	pub fn column_count(&self) -> usize {
		self.columns.len()
	}

	pub fn column_types(&self) -> Vec<Type> {
		self.columns.iter().map(|c| c.data_type).collect()
	}

	pub fn for_each_expression(&self, f: &mut dyn FnMut(&Expression)) {
		match &self.body {
			QueryBody::Select {
				projection,
				ranges,
				condition,
			} => {
				projection.iter().for_each(|e| e.for_each(f));
				ranges.iter().filter_map(|r| r.join_condition.as_ref()).for_each(|e| e.for_each(f));
				if let Some(condition) = condition {
					condition.for_each(f);
				}
			}
			QueryBody::Values(rows) => rows.for_each(f),
		}
	}

	pub fn for_each_expression_mut(&mut self, f: &mut dyn FnMut(&mut Expression)) {
		match &mut self.body {
			QueryBody::Select {
				projection,
				ranges,
				condition,
			} => {
				projection.iter_mut().for_each(|e| e.for_each_mut(f));
				ranges.iter_mut().filter_map(|r| r.join_condition.as_mut()).for_each(|e| e.for_each_mut(f));
				if let Some(condition) = condition {
					condition.for_each_mut(f);
				}
			}
			QueryBody::Values(rows) => rows.for_each_mut(f),
		}
	}
}

pub trait QueryCompiler: Send + Sync {
	/// Compile the query at the head of `tokens`. `outer` are the ranges of
	/// the enclosing statement, innermost last. `expected` gives the types
	/// of the slots the result columns are stored into, when known.
	fn compile(
		&self,
		ctx: &mut CompileContext<'_>,
		tokens: &mut TokenStream,
		outer: &[RangeGroup],
		expected: Option<&[Type]>,
	) -> Result<QueryPlan>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SelectCompiler;

impl QueryCompiler for SelectCompiler {
	#[instrument(name = "dml::query::compile", level = "trace", skip_all)]
	fn compile(
		&self,
		ctx: &mut CompileContext<'_>,
		tokens: &mut TokenStream,
		outer: &[RangeGroup],
		expected: Option<&[Type]>,
	) -> Result<QueryPlan> {
		let parens = tokens.consume_open_parens();
		let plan = match tokens.peek().map(|t| t.kind) {
			Some(TokenKind::Keyword(Keyword::Select)) => compile_select(ctx, tokens, outer, expected)?,
			Some(TokenKind::Keyword(Keyword::Table)) => compile_table(ctx, tokens)?,
			Some(TokenKind::Keyword(Keyword::Values)) => compile_values(ctx, tokens, outer, expected)?,
			Some(_) => return Err(DmlError::syntax("SELECT, TABLE or VALUES", &tokens.fragment())),
			None => return Err(tokens.unexpected_end("a query")),
		};
		for _ in 0..parens {
			tokens.consume_operator(Operator::CloseParen)?;
		}
		trace!(columns = plan.column_count(), "compiled query");
		Ok(plan)
	}
}

enum SelectItem {
	All(Fragment),
	Expression(Expression, Option<String>),
}

fn compile_select(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	outer: &[RangeGroup],
	expected: Option<&[Type]>,
) -> Result<QueryPlan> {
	tokens.consume_keyword(Keyword::Select)?;

	let mut items = Vec::new();
	loop {
		if let Some(star) = tokens.consume_if_operator(Operator::Asterisk) {
			items.push(SelectItem::All(star.fragment));
		} else {
			let expression = ExpressionParser::new(ctx, tokens).parse()?;
			let alias = read_alias(tokens)?;
			items.push(SelectItem::Expression(expression, alias));
		}
		if tokens.consume_if_operator(Operator::Comma).is_none() {
			break;
		}
	}

	let mut ranges = Vec::new();
	if tokens.consume_if_keyword(Keyword::From).is_some() {
		loop {
			let (name, fragment) = read_qualified_name(tokens)?;
			let alias = read_alias(tokens)?;
			ranges.push(bind_relation(ctx, &name, alias, fragment)?);
			if tokens.consume_if_operator(Operator::Comma).is_none() {
				break;
			}
		}
	}
	let ranges = RangeGroup::new(ranges)?.into_ranges();

	let mut condition = match tokens.consume_if_keyword(Keyword::Where) {
		Some(_) => Some(ExpressionParser::new(ctx, tokens).parse()?),
		None => None,
	};

	let scope = Scope::new(&ranges, outer);
	let mut projection = Vec::new();
	let mut columns = Vec::new();
	for item in items {
		match item {
			SelectItem::All(fragment) => {
				if ranges.is_empty() {
					return Err(DmlError::syntax("a FROM clause for *", &fragment));
				}
				for range in &ranges {
					for (index, column) in range.columns.iter().enumerate() {
						projection.push(Expression {
							kind: ExpressionKind::Column(ColumnExpression {
								qualifier: Some(range.name.clone()),
								name: column.name.clone(),
								binding: Some(ColumnBinding {
									range: range.id,
									column: index,
									data_type: column.data_type,
									variable: range.is_variables(),
								}),
							}),
							fragment: fragment.clone(),
							data_type: Some(column.data_type),
						});
						columns.push(column.clone());
					}
				}
			}
			SelectItem::Expression(mut expression, alias) => {
				let position = projection.len();
				let data_type = match Resolver::new(ctx).resolve(&mut expression, scope)? {
					Some(data_type) => data_type,
					None => infer_from_expected(&mut expression, expected, position)?,
				};
				let name = match (alias, &expression.kind) {
					(Some(alias), _) => alias,
					(None, ExpressionKind::Column(column)) => column.name.clone(),
					(None, _) => format!("C{}", position + 1),
				};
				columns.push(RangeColumn::new(name, data_type));
				projection.push(expression);
			}
		}
	}

	if let Some(condition) = condition.as_mut() {
		Resolver::new(ctx).resolve_condition(condition, scope)?;
	}

	Ok(QueryPlan {
		columns,
		body: QueryBody::Select {
			projection,
			ranges,
			condition,
		},
	})
}

fn compile_table(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<QueryPlan> {
	tokens.consume_keyword(Keyword::Table)?;
	let (name, fragment) = read_qualified_name(tokens)?;
	let range = bind_relation(ctx, &name, None, fragment.clone())?;

	let projection = range
		.columns
		.iter()
		.enumerate()
		.map(|(index, column)| Expression {
			kind: ExpressionKind::Column(ColumnExpression {
				qualifier: None,
				name: column.name.clone(),
				binding: Some(ColumnBinding {
					range: range.id,
					column: index,
					data_type: column.data_type,
					variable: false,
				}),
			}),
			fragment: fragment.clone(),
			data_type: Some(column.data_type),
		})
		.collect();

	Ok(QueryPlan {
		columns: range.columns.clone(),
		body: QueryBody::Select {
			projection,
			ranges: vec![range],
			condition: None,
		},
	})
}

fn compile_values(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	outer: &[RangeGroup],
	expected: Option<&[Type]>,
) -> Result<QueryPlan> {
	let values = tokens.consume_keyword(Keyword::Values)?;
	let rows = ExpressionParser::new(ctx, tokens).parse_list()?;

	let degree = rows[0].degree();
	let mut column_types: Vec<Option<Type>> = vec![None; degree];
	let mut resolved = Vec::with_capacity(rows.len());
	for mut row in rows {
		if row.degree() != degree {
			return Err(DmlError::DegreeMismatch {
				expected: degree,
				actual: row.degree(),
				fragment: row.fragment.clone(),
			});
		}
		if !row.is_row() {
			let fragment = row.fragment.clone();
			row = Expression::new(ExpressionKind::Row(vec![row]), fragment);
		}

		Resolver::new(ctx).resolve(&mut row, Scope::outer_only(outer))?;
		for (index, element) in row.children().into_iter().enumerate() {
			if element.is_default() {
				return Err(DmlError::syntax("a value expression instead of DEFAULT", &element.fragment));
			}
			if let Some(t) = element.data_type {
				column_types[index] = match column_types[index] {
					None => Some(t),
					Some(current) => Some(Type::promote(current, t).ok_or_else(|| {
						DmlError::type_mismatch(format!("cannot combine {current} and {t}"), &element.fragment)
					})?),
				};
			}
		}
		resolved.push(row);
	}

	let mut columns = Vec::with_capacity(degree);
	for (index, column_type) in column_types.into_iter().enumerate() {
		let data_type = match (column_type, expected.and_then(|e| e.get(index))) {
			(_, Some(t)) => *t,
			(Some(t), None) => t,
			(None, None) => {
				return Err(DmlError::type_mismatch(
					format!("the type of column {} cannot be determined", index + 1),
					&values.fragment,
				));
			}
		};
		for row in resolved.iter_mut() {
			if let Some(element) = row.children_mut().into_iter().nth(index) {
				if element.is_unresolved_parameter() {
					element.set_attributes_as_column(data_type, false);
				}
			}
		}
		columns.push(RangeColumn::new(format!("C{}", index + 1), data_type));
	}

	Ok(QueryPlan {
		columns,
		body: QueryBody::Values(Expression::new(ExpressionKind::Values(resolved), values.fragment)),
	})
}

fn infer_from_expected(expression: &mut Expression, expected: Option<&[Type]>, position: usize) -> Result<Type> {
	match expected.and_then(|e| e.get(position)) {
		Some(data_type) if expression.is_unresolved_parameter() => {
			expression.set_attributes_as_column(*data_type, false);
			Ok(*data_type)
		}
		_ => Err(DmlError::type_mismatch("the type of a selected value cannot be determined", &expression.fragment)),
	}
}
