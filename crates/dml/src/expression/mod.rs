// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod parse;

use std::fmt::{Display, Formatter};

pub(crate) use parse::{ExpressionParser, Precedence};
use tessera_type::{Fragment, Type, Value};

use crate::{query::QueryPlan, range::RangeId, token::Token};

/// A node of an expression tree. `data_type` stays `None` until type
/// resolution has visited the node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
	pub kind: ExpressionKind,
	pub fragment: Fragment,
	pub data_type: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
	Constant(Value),
	Parameter(ParameterExpression),
	Column(ColumnExpression),
	/// The `DEFAULT` marker of an inserted or assigned value.
	Default,
	/// Row value constructor `(a, b)` or `ROW(a, b)`.
	Row(Vec<Expression>),
	/// A table value constructor: the rows of a `VALUES` list.
	Values(Vec<Expression>),
	Subquery(SubqueryExpression),
	Diagnostics(DiagnosticsItem),
	Unary {
		operator: UnaryOperator,
		operand: Box<Expression>,
	},
	Binary {
		operator: BinaryOperator,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	IsNull {
		operand: Box<Expression>,
		negated: bool,
	},
	Function(FunctionExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterExpression {
	/// Zero-based position of the `?` in the statement.
	pub index: usize,
	/// The type was taken from the column or routine parameter the marker is
	/// assigned to.
	pub as_column: bool,
	/// The marker receives a value back (OUT or INOUT routine parameter).
	pub writeable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpression {
	pub qualifier: Option<String>,
	pub name: String,
	pub binding: Option<ColumnBinding>,
}

/// Where a column reference was bound to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
	pub range: RangeId,
	pub column: usize,
	pub data_type: Type,
	/// Bound to a routine variable rather than a table column.
	pub variable: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubqueryKind {
	/// Must produce a single column.
	Scalar,
	/// Produces a row of the given degree.
	Row {
		degree: usize,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryExpression {
	pub kind: SubqueryKind,
	pub body: SubqueryBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubqueryBody {
	/// Tokens of the query, compiled when references are resolved so the
	/// enclosing ranges are known.
	Pending(Vec<Token>),
	Compiled(Box<QueryPlan>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DiagnosticsItem {
	RowCount,
	More,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
	Not,
	Negate,
	Plus,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
	And,
	Or,
	Equal,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	Add,
	Subtract,
	Multiply,
	Divide,
	Remainder,
	Concat,
}

impl BinaryOperator {
	pub fn is_comparison(&self) -> bool {
		matches!(
			self,
			BinaryOperator::Equal
				| BinaryOperator::NotEqual
				| BinaryOperator::Less | BinaryOperator::LessEqual
				| BinaryOperator::Greater
				| BinaryOperator::GreaterEqual
		)
	}

	pub fn is_logical(&self) -> bool {
		matches!(self, BinaryOperator::And | BinaryOperator::Or)
	}

	pub const fn as_str(&self) -> &'static str {
		match self {
			BinaryOperator::And => "AND",
			BinaryOperator::Or => "OR",
			BinaryOperator::Equal => "=",
			BinaryOperator::NotEqual => "<>",
			BinaryOperator::Less => "<",
			BinaryOperator::LessEqual => "<=",
			BinaryOperator::Greater => ">",
			BinaryOperator::GreaterEqual => ">=",
			BinaryOperator::Add => "+",
			BinaryOperator::Subtract => "-",
			BinaryOperator::Multiply => "*",
			BinaryOperator::Divide => "/",
			BinaryOperator::Remainder => "%",
			BinaryOperator::Concat => "||",
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Function {
	Coalesce,
	Upper,
	Lower,
	Abs,
	Length,
}

impl Function {
	pub fn from_name(name: &str) -> Option<Function> {
		match name.to_ascii_uppercase().as_str() {
			"COALESCE" => Some(Function::Coalesce),
			"UPPER" => Some(Function::Upper),
			"LOWER" => Some(Function::Lower),
			"ABS" => Some(Function::Abs),
			"LENGTH" | "CHAR_LENGTH" => Some(Function::Length),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
	pub name: String,
	/// Set once the name is resolved to a built-in.
	pub function: Option<Function>,
	pub arguments: Vec<Expression>,
}

impl Expression {
	pub fn new(kind: ExpressionKind, fragment: Fragment) -> Self {
		Self {
			kind,
			fragment,
			data_type: None,
		}
	}

	pub fn constant(value: Value, fragment: Fragment) -> Self {
		let data_type = Some(value.get_type());
		Self {
			kind: ExpressionKind::Constant(value),
			fragment,
			data_type,
		}
	}

	/// A resolved `TRUE`, used where an absent condition means "always".
	pub fn always_true() -> Self {
		Self::constant(Value::Boolean(true), Fragment::internal("TRUE"))
	}

	pub fn default_marker(fragment: Fragment) -> Self {
		Self::new(ExpressionKind::Default, fragment)
	}

	/// `left AND right`; either side may be absent.
	pub fn and(left: Option<Expression>, right: Option<Expression>) -> Option<Expression> {
		match (left, right) {
			(None, None) => None,
			(Some(e), None) | (None, Some(e)) => Some(e),
			(Some(left), Some(right)) => {
				let fragment = left.fragment.with_text("AND");
				Some(Expression {
					kind: ExpressionKind::Binary {
						operator: BinaryOperator::And,
						left: Box::new(left),
						right: Box::new(right),
					},
					fragment,
					data_type: Some(Type::Boolean),
				})
			}
		}
	}

	pub fn is_default(&self) -> bool {
		matches!(self.kind, ExpressionKind::Default)
	}

	pub fn is_row(&self) -> bool {
		matches!(self.kind, ExpressionKind::Row(_))
	}

	pub fn is_row_subquery(&self) -> bool {
		matches!(
			self.kind,
			ExpressionKind::Subquery(SubqueryExpression {
				kind: SubqueryKind::Row { .. },
				..
			})
		)
	}

	/// A `?` marker whose type is not known yet.
	pub fn is_unresolved_parameter(&self) -> bool {
		matches!(self.kind, ExpressionKind::Parameter(_)) && self.data_type.is_none()
	}

	/// Whether the expression is a reference to a routine variable.
	pub fn is_variable(&self) -> bool {
		matches!(
			&self.kind,
			ExpressionKind::Column(ColumnExpression {
				binding: Some(ColumnBinding {
					variable: true,
					..
				}),
				..
			})
		)
	}

	pub fn column_binding(&self) -> Option<&ColumnBinding> {
		match &self.kind {
			ExpressionKind::Column(column) => column.binding.as_ref(),
			_ => None,
		}
	}

	/// Give a parameter marker the type of the slot it is assigned to.
	pub fn set_attributes_as_column(&mut self, data_type: Type, writeable: bool) {
		if let ExpressionKind::Parameter(parameter) = &mut self.kind {
			parameter.as_column = true;
			parameter.writeable = writeable;
			self.data_type = Some(data_type);
		}
	}

	/// Number of values the expression produces when used as a row.
	pub fn degree(&self) -> usize {
		match &self.kind {
			ExpressionKind::Row(elements) => elements.len(),
			ExpressionKind::Subquery(SubqueryExpression {
				kind: SubqueryKind::Row {
					degree,
				},
				..
			}) => *degree,
			_ => 1,
		}
	}

	pub fn children(&self) -> Vec<&Expression> {
		match &self.kind {
			ExpressionKind::Row(elements) | ExpressionKind::Values(elements) => elements.iter().collect(),
			ExpressionKind::Unary {
				operand,
				..
			}
			| ExpressionKind::IsNull {
				operand,
				..
			} => vec![operand.as_ref()],
			ExpressionKind::Binary {
				left,
				right,
				..
			} => vec![left.as_ref(), right.as_ref()],
			ExpressionKind::Function(function) => function.arguments.iter().collect(),
			_ => vec![],
		}
	}

	pub fn children_mut(&mut self) -> Vec<&mut Expression> {
		match &mut self.kind {
			ExpressionKind::Row(elements) | ExpressionKind::Values(elements) => elements.iter_mut().collect(),
			ExpressionKind::Unary {
				operand,
				..
			}
			| ExpressionKind::IsNull {
				operand,
				..
			} => vec![operand.as_mut()],
			ExpressionKind::Binary {
				left,
				right,
				..
			} => vec![left.as_mut(), right.as_mut()],
			ExpressionKind::Function(function) => function.arguments.iter_mut().collect(),
			_ => vec![],
		}
	}

	/// Visit every node, children first, descending into compiled subqueries.
	pub fn for_each(&self, f: &mut dyn FnMut(&Expression)) {
		for child in self.children() {
			child.for_each(f);
		}
		if let ExpressionKind::Subquery(SubqueryExpression {
			body: SubqueryBody::Compiled(plan),
			..
		}) = &self.kind
		{
			plan.for_each_expression(f);
		}
		f(self);
	}

	pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut Expression)) {
		for child in self.children_mut() {
			child.for_each_mut(f);
		}
		if let ExpressionKind::Subquery(SubqueryExpression {
			body: SubqueryBody::Compiled(plan),
			..
		}) = &mut self.kind
		{
			plan.for_each_expression_mut(f);
		}
		f(self);
	}

	/// Ranges referenced anywhere in the expression, in first-seen order.
	pub fn referenced_ranges(&self) -> Vec<RangeId> {
		let mut result = Vec::new();
		self.for_each(&mut |e| {
			if let Some(binding) = e.column_binding() {
				if !result.contains(&binding.range) {
					result.push(binding.range);
				}
			}
		});
		result
	}

	/// Split a condition into its top-level AND operands.
	pub fn into_conjuncts(self) -> Vec<Expression> {
		match self.kind {
			ExpressionKind::Binary {
				operator: BinaryOperator::And,
				left,
				right,
			} => {
				let mut result = left.into_conjuncts();
				result.extend(right.into_conjuncts());
				result
			}
			kind => vec![Expression {
				kind,
				fragment: self.fragment,
				data_type: self.data_type,
			}],
		}
	}

	/// No unbound column reference and no untyped scalar node remains.
	pub fn is_resolved(&self) -> bool {
		let mut resolved = true;
		self.for_each(&mut |e| match &e.kind {
			ExpressionKind::Row(_) | ExpressionKind::Values(_) | ExpressionKind::Default => {}
			ExpressionKind::Subquery(subquery) => {
				if matches!(subquery.body, SubqueryBody::Pending(_)) {
					resolved = false;
				}
			}
			ExpressionKind::Column(column) => {
				if column.binding.is_none() || e.data_type.is_none() {
					resolved = false;
				}
			}
			_ => {
				if e.data_type.is_none() {
					resolved = false;
				}
			}
		});
		resolved
	}
}

impl Display for Expression {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		fn operand(f: &mut Formatter<'_>, e: &Expression) -> std::fmt::Result {
			match e.kind {
				ExpressionKind::Binary {
					..
				} => write!(f, "({e})"),
				_ => write!(f, "{e}"),
			}
		}

		fn list(f: &mut Formatter<'_>, elements: &[Expression]) -> std::fmt::Result {
			for (i, e) in elements.iter().enumerate() {
				if i > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{e}")?;
			}
			Ok(())
		}

		match &self.kind {
			ExpressionKind::Constant(value) => write!(f, "{value}"),
			ExpressionKind::Parameter(_) => f.write_str("?"),
			ExpressionKind::Column(column) => match &column.qualifier {
				Some(qualifier) => write!(f, "{qualifier}.{}", column.name),
				None => f.write_str(&column.name),
			},
			ExpressionKind::Default => f.write_str("DEFAULT"),
			ExpressionKind::Row(elements) => {
				f.write_str("(")?;
				list(f, elements)?;
				f.write_str(")")
			}
			ExpressionKind::Values(rows) => {
				f.write_str("VALUES ")?;
				list(f, rows)
			}
			ExpressionKind::Subquery(_) => f.write_str("(<subquery>)"),
			ExpressionKind::Diagnostics(DiagnosticsItem::RowCount) => f.write_str("ROW_COUNT"),
			ExpressionKind::Diagnostics(DiagnosticsItem::More) => f.write_str("MORE"),
			ExpressionKind::Unary {
				operator,
				operand: inner,
			} => {
				match operator {
					UnaryOperator::Not => f.write_str("NOT ")?,
					UnaryOperator::Negate => f.write_str("-")?,
					UnaryOperator::Plus => f.write_str("+")?,
				}
				operand(f, inner)
			}
			ExpressionKind::Binary {
				operator,
				left,
				right,
			} => {
				operand(f, left)?;
				write!(f, " {} ", operator.as_str())?;
				operand(f, right)
			}
			ExpressionKind::IsNull {
				operand: inner,
				negated,
			} => {
				operand(f, inner)?;
				if *negated {
					f.write_str(" IS NOT NULL")
				} else {
					f.write_str(" IS NULL")
				}
			}
			ExpressionKind::Function(function) => {
				write!(f, "{}(", function.name.to_ascii_uppercase())?;
				list(f, &function.arguments)?;
				f.write_str(")")
			}
		}
	}
}
