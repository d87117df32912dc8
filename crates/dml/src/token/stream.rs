// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_type::Fragment;

use crate::{
	Result,
	error::DmlError,
	token::{Keyword, Operator, Token, TokenKind},
};

/// Cursor over a tokenized statement with single-token look-ahead and
/// rewind to any earlier position.
#[derive(Debug, Clone)]
pub struct TokenStream {
	tokens: Vec<Token>,
	position: usize,
}

impl TokenStream {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self {
			tokens,
			position: 0,
		}
	}

	pub fn position(&self) -> usize {
		self.position
	}

	pub fn rewind(&mut self, position: usize) {
		self.position = position.min(self.tokens.len());
	}

	pub fn is_eof(&self) -> bool {
		self.position >= self.tokens.len()
	}

	pub fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.position)
	}

	pub fn peek_nth(&self, n: usize) -> Option<&Token> {
		self.tokens.get(self.position + n)
	}

	pub fn current(&self) -> Result<&Token> {
		self.peek().ok_or_else(|| self.unexpected_end("a token"))
	}

	pub fn next(&mut self) -> Result<Token> {
		let token = self.current()?.clone();
		self.position += 1;
		Ok(token)
	}

	/// Fragment of the current token, or of the last one at end of input.
	pub fn fragment(&self) -> Fragment {
		self.peek()
			.or_else(|| self.tokens.last())
			.map(|t| t.fragment.clone())
			.unwrap_or_default()
	}

	pub fn is_keyword(&self, keyword: Keyword) -> bool {
		self.peek().is_some_and(|t| t.is_keyword(keyword))
	}

	pub fn is_operator(&self, operator: Operator) -> bool {
		self.peek().is_some_and(|t| t.is_operator(operator))
	}

	pub fn is_identifier(&self) -> bool {
		self.peek().is_some_and(Token::is_identifier)
	}

	pub fn consume_keyword(&mut self, keyword: Keyword) -> Result<Token> {
		self.expect(TokenKind::Keyword(keyword), keyword.as_str())
	}

	pub fn consume_operator(&mut self, operator: Operator) -> Result<Token> {
		self.expect(TokenKind::Operator(operator), operator.as_str())
	}

	pub fn consume_if_keyword(&mut self, keyword: Keyword) -> Option<Token> {
		if self.is_keyword(keyword) {
			self.position += 1;
			return self.tokens.get(self.position - 1).cloned();
		}
		None
	}

	pub fn consume_if_operator(&mut self, operator: Operator) -> Option<Token> {
		if self.is_operator(operator) {
			self.position += 1;
			return self.tokens.get(self.position - 1).cloned();
		}
		None
	}

	pub fn consume_identifier(&mut self) -> Result<Token> {
		let token = self.current()?;
		if !token.is_identifier() {
			return Err(DmlError::syntax("an identifier", &token.fragment));
		}
		self.next()
	}

	/// Consume consecutive `(` and return how many were read.
	pub fn consume_open_parens(&mut self) -> usize {
		let mut count = 0;
		while self.consume_if_operator(Operator::OpenParen).is_some() {
			count += 1;
		}
		count
	}

	/// Accept an optional trailing `;` and require the end of input.
	pub fn expect_end(&mut self) -> Result<()> {
		self.consume_if_operator(Operator::Semicolon);
		match self.peek() {
			None => Ok(()),
			Some(token) => Err(DmlError::syntax("end of statement", &token.fragment)),
		}
	}

	/// Take the tokens of a parenthesised body, leaving the stream after the
	/// matching `)`. The opening `(` must already be consumed.
	pub fn take_parenthesised(&mut self) -> Result<Vec<Token>> {
		let start = self.position;
		let mut depth = 1usize;
		while let Some(token) = self.peek() {
			if token.is_operator(Operator::OpenParen) {
				depth += 1;
			} else if token.is_operator(Operator::CloseParen) {
				depth -= 1;
				if depth == 0 {
					let body = self.tokens[start..self.position].to_vec();
					self.position += 1;
					return Ok(body);
				}
			}
			self.position += 1;
		}
		Err(self.unexpected_end(")"))
	}

	fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
		let token = self.current().map_err(|_| self.unexpected_end(expected))?;
		if token.kind != kind {
			return Err(DmlError::syntax(expected, &token.fragment));
		}
		self.next()
	}

	pub(crate) fn unexpected_end(&self, expected: &str) -> DmlError {
		DmlError::UnexpectedEnd {
			expected: expected.to_string(),
			fragment: self.tokens.last().map(|t| t.fragment.clone()).unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::token::tokenize;

	fn stream(sql: &str) -> TokenStream {
		TokenStream::new(tokenize(sql).unwrap())
	}

	#[test]
	fn test_rewind() {
		let mut tokens = stream("INSERT INTO t");
		let start = tokens.position();
		tokens.consume_keyword(Keyword::Insert).unwrap();
		tokens.consume_keyword(Keyword::Into).unwrap();
		tokens.rewind(start);
		assert!(tokens.is_keyword(Keyword::Insert));
	}

	#[test]
	fn test_consume_wrong_keyword() {
		let mut tokens = stream("DELETE t");
		tokens.next().unwrap();
		let err = tokens.consume_keyword(Keyword::From).unwrap_err();
		assert_eq!(err, DmlError::syntax("FROM", &Fragment::statement("t", 1, 8)));
	}

	#[test]
	fn test_consume_at_end() {
		let mut tokens = stream("DELETE");
		tokens.next().unwrap();
		let err = tokens.consume_keyword(Keyword::From).unwrap_err();
		assert!(matches!(err, DmlError::UnexpectedEnd { .. }));
	}

	#[test]
	fn test_take_parenthesised() {
		let mut tokens = stream("(SELECT (a) FROM t) x");
		assert_eq!(tokens.consume_open_parens(), 1);
		let body = tokens.take_parenthesised().unwrap();
		assert_eq!(body.len(), 6);
		assert_eq!(tokens.next().unwrap().text(), "x");
	}

	#[test]
	fn test_expect_end() {
		let mut tokens = stream("; x");
		assert!(tokens.expect_end().is_err());

		let mut tokens = stream(";");
		assert!(tokens.expect_end().is_ok());
	}
}
