// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_type::Value;

use crate::{
	Result,
	context::CompileContext,
	error::DmlError,
	expression::{
		BinaryOperator, ColumnExpression, Expression, ExpressionKind, FunctionExpression, ParameterExpression,
		SubqueryBody, SubqueryExpression, SubqueryKind, UnaryOperator,
	},
	token::{Keyword, Operator, Token, TokenKind, TokenStream},
};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) enum Precedence {
	None,
	LogicOr,
	LogicAnd,
	LogicNot,
	Comparison,
	Term,
	Factor,
	Prefix,
}

const fn get_precedence_for_operator(op: Operator) -> Precedence {
	use Operator::*;
	use Precedence::*;

	match op {
		Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => Comparison,
		Plus | Minus | Concat => Term,
		Asterisk | Slash | Percent => Factor,
		_ => None,
	}
}

const fn binary_operator(op: Operator) -> Option<BinaryOperator> {
	match op {
		Operator::Equal => Some(BinaryOperator::Equal),
		Operator::NotEqual => Some(BinaryOperator::NotEqual),
		Operator::Less => Some(BinaryOperator::Less),
		Operator::LessEqual => Some(BinaryOperator::LessEqual),
		Operator::Greater => Some(BinaryOperator::Greater),
		Operator::GreaterEqual => Some(BinaryOperator::GreaterEqual),
		Operator::Plus => Some(BinaryOperator::Add),
		Operator::Minus => Some(BinaryOperator::Subtract),
		Operator::Concat => Some(BinaryOperator::Concat),
		Operator::Asterisk => Some(BinaryOperator::Multiply),
		Operator::Slash => Some(BinaryOperator::Divide),
		Operator::Percent => Some(BinaryOperator::Remainder),
		_ => None,
	}
}

/// Pratt parser for value and boolean expressions. Column references come
/// out unbound; subqueries come out as pending token bodies.
pub(crate) struct ExpressionParser<'c, 'a> {
	ctx: &'c mut CompileContext<'a>,
	tokens: &'c mut TokenStream,
}

impl<'c, 'a> ExpressionParser<'c, 'a> {
	pub(crate) fn new(ctx: &'c mut CompileContext<'a>, tokens: &'c mut TokenStream) -> Self {
		Self {
			ctx,
			tokens,
		}
	}

	pub(crate) fn parse(&mut self) -> Result<Expression> {
		self.parse_node(Precedence::None)
	}

	/// `a, b, c` up to the first token that does not continue the list.
	pub(crate) fn parse_list(&mut self) -> Result<Vec<Expression>> {
		let mut result = vec![self.parse()?];
		while self.tokens.consume_if_operator(Operator::Comma).is_some() {
			result.push(self.parse()?);
		}
		Ok(result)
	}

	/// The elements of a row between brackets; a single element stays scalar.
	pub(crate) fn parse_row(&mut self) -> Result<Expression> {
		let open = self.tokens.fragment();
		let mut elements = self.parse_list()?;
		if elements.len() == 1 {
			return Ok(elements.remove(0));
		}
		Ok(Expression::new(ExpressionKind::Row(elements), open))
	}

	pub(crate) fn parse_node(&mut self, precedence: Precedence) -> Result<Expression> {
		let mut left = self.parse_prefix()?;

		while !self.tokens.is_eof() {
			if precedence >= self.current_precedence() {
				break;
			}
			left = self.parse_infix(left)?;
		}
		Ok(left)
	}

	fn current_precedence(&self) -> Precedence {
		match self.tokens.peek().map(|t| t.kind) {
			Some(TokenKind::Operator(op)) => get_precedence_for_operator(op),
			Some(TokenKind::Keyword(Keyword::Or)) => Precedence::LogicOr,
			Some(TokenKind::Keyword(Keyword::And)) => Precedence::LogicAnd,
			Some(TokenKind::Keyword(Keyword::Is)) => Precedence::Comparison,
			_ => Precedence::None,
		}
	}

	fn parse_infix(&mut self, left: Expression) -> Result<Expression> {
		let token = self.tokens.next()?;
		let (operator, precedence) = match token.kind {
			TokenKind::Keyword(Keyword::Is) => {
				let negated = self.tokens.consume_if_keyword(Keyword::Not).is_some();
				self.tokens.consume_keyword(Keyword::Null)?;
				return Ok(Expression::new(
					ExpressionKind::IsNull {
						operand: Box::new(left),
						negated,
					},
					token.fragment,
				));
			}
			TokenKind::Keyword(Keyword::Or) => (BinaryOperator::Or, Precedence::LogicOr),
			TokenKind::Keyword(Keyword::And) => (BinaryOperator::And, Precedence::LogicAnd),
			TokenKind::Operator(op) => match binary_operator(op) {
				Some(operator) => (operator, get_precedence_for_operator(op)),
				None => return Err(DmlError::syntax("an operator", &token.fragment)),
			},
			_ => return Err(DmlError::syntax("an operator", &token.fragment)),
		};

		let right = self.parse_node(precedence)?;
		Ok(Expression::new(
			ExpressionKind::Binary {
				operator,
				left: Box::new(left),
				right: Box::new(right),
			},
			token.fragment,
		))
	}

	fn parse_prefix(&mut self) -> Result<Expression> {
		let token = self.tokens.current()?.clone();
		match token.kind {
			TokenKind::Keyword(Keyword::Not) => {
				self.tokens.next()?;
				let operand = self.parse_node(Precedence::LogicNot)?;
				Ok(self.unary(UnaryOperator::Not, operand, token))
			}
			TokenKind::Operator(Operator::Minus) => {
				self.tokens.next()?;
				let operand = self.parse_node(Precedence::Prefix)?;
				// fold negative literals
				if let ExpressionKind::Constant(value) = &operand.kind {
					match value {
						Value::Int8(v) => {
							return Ok(Expression::constant(
								Value::Int8(-v),
								token.fragment.with_text(format!("-{v}")),
							));
						}
						Value::Float8(v) => {
							return Ok(Expression::constant(
								Value::Float8(-v),
								token.fragment.with_text(format!("-{v}")),
							));
						}
						_ => {}
					}
				}
				Ok(self.unary(UnaryOperator::Negate, operand, token))
			}
			TokenKind::Operator(Operator::Plus) => {
				self.tokens.next()?;
				let operand = self.parse_node(Precedence::Prefix)?;
				Ok(self.unary(UnaryOperator::Plus, operand, token))
			}
			_ => self.parse_primary(),
		}
	}

	fn unary(&self, operator: UnaryOperator, operand: Expression, token: Token) -> Expression {
		Expression::new(
			ExpressionKind::Unary {
				operator,
				operand: Box::new(operand),
			},
			token.fragment,
		)
	}

	fn parse_primary(&mut self) -> Result<Expression> {
		let token = self.tokens.next()?;
		let fragment = token.fragment.clone();
		match token.kind {
			TokenKind::Integer => {
				let value: i64 =
					token.text().parse().map_err(|_| DmlError::syntax("an integer in range", &fragment))?;
				Ok(Expression::constant(Value::Int8(value), fragment))
			}
			TokenKind::Float => {
				let value: f64 = token.text().parse().map_err(|_| DmlError::syntax("a number", &fragment))?;
				Ok(Expression::constant(Value::Float8(value), fragment))
			}
			TokenKind::String => Ok(Expression::constant(Value::Utf8(token.text().to_string()), fragment)),
			TokenKind::Keyword(Keyword::True) => Ok(Expression::constant(Value::Boolean(true), fragment)),
			TokenKind::Keyword(Keyword::False) => Ok(Expression::constant(Value::Boolean(false), fragment)),
			TokenKind::Keyword(Keyword::Null) => Ok(Expression::constant(Value::Undefined, fragment)),
			TokenKind::Keyword(Keyword::Default) => Ok(Expression::default_marker(fragment)),
			TokenKind::Parameter => {
				let index = self.ctx.next_parameter();
				Ok(Expression::new(
					ExpressionKind::Parameter(ParameterExpression {
						index,
						as_column: false,
						writeable: false,
					}),
					fragment,
				))
			}
			TokenKind::Keyword(Keyword::Row) => {
				self.tokens.consume_operator(Operator::OpenParen)?;
				let elements = self.parse_list()?;
				self.tokens.consume_operator(Operator::CloseParen)?;
				Ok(Expression::new(ExpressionKind::Row(elements), fragment))
			}
			TokenKind::Operator(Operator::OpenParen) => {
				if self.is_query_start() {
					let body = self.tokens.take_parenthesised()?;
					return Ok(Expression::new(
						ExpressionKind::Subquery(SubqueryExpression {
							kind: SubqueryKind::Scalar,
							body: SubqueryBody::Pending(body),
						}),
						fragment,
					));
				}
				let row = self.parse_row()?;
				self.tokens.consume_operator(Operator::CloseParen)?;
				Ok(row)
			}
			_ if token.is_identifier() => self.parse_identifier(token),
			_ => Err(DmlError::syntax("an expression", &fragment)),
		}
	}

	fn is_query_start(&self) -> bool {
		self.tokens.is_keyword(Keyword::Select)
			|| self.tokens.is_keyword(Keyword::With)
			|| self.tokens.is_keyword(Keyword::Table)
			|| self.tokens.is_keyword(Keyword::Values)
	}

	fn parse_identifier(&mut self, token: Token) -> Result<Expression> {
		if self.tokens.consume_if_operator(Operator::OpenParen).is_some() {
			let arguments = if self.tokens.is_operator(Operator::CloseParen) {
				vec![]
			} else {
				self.parse_list()?
			};
			self.tokens.consume_operator(Operator::CloseParen)?;
			return Ok(Expression::new(
				ExpressionKind::Function(FunctionExpression {
					name: token.text().to_string(),
					function: None,
					arguments,
				}),
				token.fragment,
			));
		}

		if self.tokens.is_operator(Operator::Dot) && self.tokens.peek_nth(1).is_some_and(Token::is_identifier) {
			self.tokens.next()?;
			let column = self.tokens.consume_identifier()?;
			return Ok(Expression::new(
				ExpressionKind::Column(ColumnExpression {
					qualifier: Some(token.text().to_string()),
					name: column.text().to_string(),
					binding: None,
				}),
				column.fragment,
			));
		}

		Ok(Expression::new(
			ExpressionKind::Column(ColumnExpression {
				qualifier: None,
				name: token.text().to_string(),
				binding: None,
			}),
			token.fragment,
		))
	}
}
