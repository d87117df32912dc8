// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Write targets: INSERT column lists, SET clause lists and GET style
//! diagnostics assignments.

use tessera_type::Fragment;

use crate::{
	Result,
	context::CompileContext,
	error::DmlError,
	expression::{
		ColumnBinding, ColumnExpression, DiagnosticsItem, Expression, ExpressionKind, ExpressionParser, Precedence,
		SubqueryBody, SubqueryExpression, SubqueryKind,
	},
	range::RangeBinding,
	resolve::{Resolver, Scope, lookup, types::check_assignable},
	token::{Keyword, Operator, TokenKind, TokenStream},
};

/// Qualifier of a column reference to the row proposed for insertion in
/// `ON DUPLICATE KEY UPDATE ... = VALUES(col)`.
pub(crate) const NEW_ROW_QUALIFIER: &str = "VALUES";

/// Ordered, duplicate-free column ordinals of one target list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(Vec<usize>);

impl ColumnMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every column of a relation with `count` columns, in declared order.
	pub fn all(count: usize) -> Self {
		Self((0..count).collect())
	}

	pub fn insert(&mut self, column: usize, name: &str, fragment: &Fragment) -> Result<()> {
		if self.0.contains(&column) {
			return Err(DmlError::DuplicateTarget {
				column: name.to_string(),
				fragment: fragment.clone(),
			});
		}
		self.0.push(column);
		Ok(())
	}

	pub fn as_slice(&self) -> &[usize] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn contains(&self, column: usize) -> bool {
		self.0.contains(&column)
	}

	/// Map every ordinal through `base`, the column map of a view.
	pub fn project(&self, base: &[usize]) -> ColumnMap {
		Self(self.0.iter().map(|&c| base[c]).collect())
	}

	pub fn check_list(&self, column_count: usize) -> Vec<bool> {
		let mut result = vec![false; column_count];
		for &column in &self.0 {
			result[column] = true;
		}
		result
	}

	pub fn into_vec(self) -> Vec<usize> {
		self.0
	}
}

/// The parsed, unresolved targets and values of a SET clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClauseList {
	pub column_map: ColumnMap,
	/// Column references of the targets, bound to the target range.
	pub targets: Vec<Expression>,
	/// One value per target group.
	pub expressions: Vec<Expression>,
}

/// `target = ROW_COUNT` of a GET DIAGNOSTICS style clause.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsAssignment {
	pub target: Expression,
	pub item: Expression,
}

pub struct TargetParser<'c, 'a> {
	ctx: &'c mut CompileContext<'a>,
	tokens: &'c mut TokenStream,
}

impl<'c, 'a> TargetParser<'c, 'a> {
	pub fn new(ctx: &'c mut CompileContext<'a>, tokens: &'c mut TokenStream) -> Self {
		Self {
			ctx,
			tokens,
		}
	}

	/// `(col, col, ...)` naming columns of `range`. With `allow_prefix` a
	/// column may be written as `range.col`.
	pub fn parse_column_list(&mut self, range: &RangeBinding, allow_prefix: bool) -> Result<ColumnMap> {
		self.tokens.consume_operator(Operator::OpenParen)?;
		let mut map = ColumnMap::new();
		loop {
			let target = self.parse_target(range, allow_prefix)?;
			let binding = bound_column(&target)?;
			map.insert(binding.column, &range.columns[binding.column].name, &target.fragment)?;
			if self.tokens.consume_if_operator(Operator::Comma).is_none() {
				break;
			}
		}
		self.tokens.consume_operator(Operator::CloseParen)?;
		Ok(map)
	}

	/// A single column of `range`, returned as a bound column reference.
	pub fn parse_target(&mut self, range: &RangeBinding, allow_prefix: bool) -> Result<Expression> {
		let first = self.tokens.consume_identifier()?;
		let (qualifier, name) = if self.tokens.consume_if_operator(Operator::Dot).is_some() {
			(Some(first), self.tokens.consume_identifier()?)
		} else {
			(None, first)
		};

		if let Some(qualifier) = &qualifier {
			if !allow_prefix {
				return Err(DmlError::syntax("a column name without qualifier", &qualifier.fragment));
			}
			let matches_relation = range.relation_name().is_some_and(|n| n.name.eq_ignore_ascii_case(qualifier.text()));
			if !range.matches_qualifier(qualifier.text()) && !matches_relation {
				return Err(DmlError::UnresolvedReference {
					names: vec![format!("{}.{}", qualifier.text(), name.text())],
					fragment: qualifier.fragment.clone(),
				});
			}
		}

		let column = range.column_index(name.text()).ok_or_else(|| DmlError::UnresolvedReference {
			names: vec![name.text().to_string()],
			fragment: name.fragment.clone(),
		})?;
		let data_type = range.columns[column].data_type;
		Ok(Expression {
			kind: ExpressionKind::Column(ColumnExpression {
				qualifier: qualifier.map(|q| q.text().to_string()),
				name: range.columns[column].name.clone(),
				binding: Some(ColumnBinding {
					range: range.id,
					column,
					data_type,
					variable: false,
				}),
			}),
			fragment: name.fragment,
			data_type: Some(data_type),
		})
	}

	/// `target = value [, ...]` after `SET`. A target may be a bracketed
	/// group, whose value is a row or a row subquery of the same degree.
	pub fn parse_set_clause_list(&mut self, range: &RangeBinding) -> Result<SetClauseList> {
		let mut result = SetClauseList {
			column_map: ColumnMap::new(),
			targets: vec![],
			expressions: vec![],
		};

		loop {
			let bracketed = self.tokens.consume_if_operator(Operator::OpenParen).is_some();
			let mut degree = 0;
			loop {
				let target = self.parse_target(range, true)?;
				let binding = bound_column(&target)?;
				result.column_map.insert(binding.column, &range.columns[binding.column].name, &target.fragment)?;
				result.targets.push(target);
				degree += 1;
				if !bracketed || self.tokens.consume_if_operator(Operator::Comma).is_none() {
					break;
				}
			}
			if bracketed {
				self.tokens.consume_operator(Operator::CloseParen)?;
			}

			self.tokens.consume_operator(Operator::Equal)?;
			let value = self.parse_assigned_value(bracketed, degree)?;
			result.expressions.push(value);

			if self.tokens.consume_if_operator(Operator::Comma).is_none() {
				break;
			}
		}
		Ok(result)
	}

	fn parse_assigned_value(&mut self, bracketed: bool, degree: usize) -> Result<Expression> {
		let position = self.tokens.position();
		let parens = self.tokens.consume_open_parens();
		if parens > 0 && self.tokens.is_keyword(Keyword::Select) && bracketed {
			// the query owns the innermost bracket pair
			self.tokens.rewind(position + parens - 1);
			let open = self.tokens.consume_operator(Operator::OpenParen)?;
			let body = self.tokens.take_parenthesised()?;
			for _ in 1..parens {
				self.tokens.consume_operator(Operator::CloseParen)?;
			}
			return Ok(Expression::new(
				ExpressionKind::Subquery(SubqueryExpression {
					kind: SubqueryKind::Row {
						degree,
					},
					body: SubqueryBody::Pending(body),
				}),
				open.fragment,
			));
		}
		self.tokens.rewind(position);

		let mysql_values = self.ctx.config().dialect.mysql && self.tokens.is_keyword(Keyword::Values);
		if mysql_values {
			self.tokens.consume_keyword(Keyword::Values)?;
		}

		if degree > 1 || mysql_values {
			let open = self.tokens.consume_operator(Operator::OpenParen)?;
			let mut row = ExpressionParser::new(self.ctx, self.tokens).parse_row()?;
			self.tokens.consume_operator(Operator::CloseParen)?;
			let actual = if row.is_row() {
				row.degree()
			} else {
				1
			};
			if actual != degree {
				return Err(DmlError::DegreeMismatch {
					expected: degree,
					actual,
					fragment: open.fragment,
				});
			}
			if mysql_values {
				qualify_new_row(&mut row);
			}
			return Ok(row);
		}

		ExpressionParser::new(self.ctx, self.tokens).parse()
	}

	/// `target = ROW_COUNT | MORE [, ...]`. Targets are variables of the
	/// enclosing routine.
	pub fn parse_get_clause_list(&mut self) -> Result<Vec<DiagnosticsAssignment>> {
		let outer = self.ctx.outer_groups().to_vec();
		let mut result = Vec::new();
		loop {
			let mut target = ExpressionParser::new(self.ctx, self.tokens).parse_node(Precedence::Comparison)?;
			let ExpressionKind::Column(column) = &mut target.kind else {
				return Err(DmlError::syntax("a variable", &target.fragment));
			};
			let binding = lookup(Scope::outer_only(&outer), column.qualifier.as_deref(), &column.name, &target.fragment)?
				.filter(|b| b.variable)
				.ok_or_else(|| DmlError::UnresolvedReference {
					names: vec![column.name.clone()],
					fragment: target.fragment.clone(),
				})?;
			column.binding = Some(binding);
			target.data_type = Some(binding.data_type);

			self.tokens.consume_operator(Operator::Equal)?;
			let token = self.tokens.next()?;
			let item = match token.kind {
				TokenKind::Keyword(Keyword::RowCount) => DiagnosticsItem::RowCount,
				TokenKind::Keyword(Keyword::More) => DiagnosticsItem::More,
				_ => return Err(DmlError::syntax("ROW_COUNT or MORE", &token.fragment)),
			};
			let mut item = Expression::new(ExpressionKind::Diagnostics(item), token.fragment);
			Resolver::new(self.ctx).resolve(&mut item, Scope::outer_only(&outer))?;
			check_assignable(binding.data_type, &item, &column_name(&target))?;

			result.push(DiagnosticsAssignment {
				target,
				item,
			});
			if self.tokens.consume_if_operator(Operator::Comma).is_none() {
				break;
			}
		}
		Ok(result)
	}
}

fn bound_column(target: &Expression) -> Result<ColumnBinding> {
	target.column_binding().copied().ok_or_else(|| DmlError::syntax("a column name", &target.fragment))
}

fn column_name(expression: &Expression) -> String {
	match &expression.kind {
		ExpressionKind::Column(column) => column.name.clone(),
		_ => expression.fragment.text().to_string(),
	}
}

/// Turn the unqualified column references of `VALUES(...)` into references
/// to the row proposed for insertion.
fn qualify_new_row(expression: &mut Expression) {
	expression.for_each_mut(&mut |e| {
		if let ExpressionKind::Column(column) = &mut e.kind {
			if column.qualifier.is_none() && column.binding.is_none() {
				column.qualifier = Some(NEW_ROW_QUALIFIER.to_string());
			}
		}
	});
}
