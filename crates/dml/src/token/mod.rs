// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod keyword;
mod stream;

pub use keyword::{KEYWORD_MAP, Keyword};
pub use stream::TokenStream;
use tessera_type::Fragment;

use crate::{Result, error::DmlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
	Asterisk,     // *
	Comma,        // ,
	Dot,          // .
	Semicolon,    // ;
	OpenParen,    // (
	CloseParen,   // )
	Plus,         // +
	Minus,        // -
	Slash,        // /
	Percent,      // %
	Concat,       // ||
	Equal,        // =
	NotEqual,     // <> or !=
	Less,         // <
	Greater,      // >
	LessEqual,    // <=
	GreaterEqual, // >=
}

impl Operator {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Operator::Asterisk => "*",
			Operator::Comma => ",",
			Operator::Dot => ".",
			Operator::Semicolon => ";",
			Operator::OpenParen => "(",
			Operator::CloseParen => ")",
			Operator::Plus => "+",
			Operator::Minus => "-",
			Operator::Slash => "/",
			Operator::Percent => "%",
			Operator::Concat => "||",
			Operator::Equal => "=",
			Operator::NotEqual => "<>",
			Operator::Less => "<",
			Operator::Greater => ">",
			Operator::LessEqual => "<=",
			Operator::GreaterEqual => ">=",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	Keyword(Keyword),
	Identifier,
	/// `"Name"`; the fragment holds the unquoted text
	QuotedIdentifier,
	Integer,
	Float,
	/// `'text'`; the fragment holds the unquoted text
	String,
	/// `?`
	Parameter,
	Operator(Operator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub fragment: Fragment,
}

impl Token {
	pub fn text(&self) -> &str {
		self.fragment.text()
	}

	pub fn is_keyword(&self, keyword: Keyword) -> bool {
		self.kind == TokenKind::Keyword(keyword)
	}

	pub fn is_operator(&self, operator: Operator) -> bool {
		self.kind == TokenKind::Operator(operator)
	}

	/// Whether the token can name a table, column or routine.
	pub fn is_identifier(&self) -> bool {
		match self.kind {
			TokenKind::Identifier | TokenKind::QuotedIdentifier => true,
			TokenKind::Keyword(keyword) => !keyword.is_reserved(),
			_ => false,
		}
	}
}

pub fn tokenize(sql: &str) -> Result<Vec<Token>> {
	let mut tokens = Vec::new();
	let chars: Vec<char> = sql.chars().collect();
	let len = chars.len();
	let mut i = 0;
	let mut line = 1u32;
	let mut line_start = 0usize;

	macro_rules! position {
		($at:expr) => {
			(line, ($at - line_start + 1) as u32)
		};
	}

	while i < len {
		let c = chars[i];

		if c == '\n' {
			line += 1;
			i += 1;
			line_start = i;
			continue;
		}

		if c.is_whitespace() {
			i += 1;
			continue;
		}

		// line comments
		if c == '-' && i + 1 < len && chars[i + 1] == '-' {
			while i < len && chars[i] != '\n' {
				i += 1;
			}
			continue;
		}

		// block comments
		if c == '/' && i + 1 < len && chars[i + 1] == '*' {
			i += 2;
			while i < len && !(chars[i] == '*' && i + 1 < len && chars[i + 1] == '/') {
				if chars[i] == '\n' {
					line += 1;
					line_start = i + 1;
				}
				i += 1;
			}
			i += 2;
			continue;
		}

		let (l, col) = position!(i);

		let operator = match c {
			'*' => Some((Operator::Asterisk, 1)),
			',' => Some((Operator::Comma, 1)),
			'.' => Some((Operator::Dot, 1)),
			';' => Some((Operator::Semicolon, 1)),
			'(' => Some((Operator::OpenParen, 1)),
			')' => Some((Operator::CloseParen, 1)),
			'+' => Some((Operator::Plus, 1)),
			'-' => Some((Operator::Minus, 1)),
			'/' => Some((Operator::Slash, 1)),
			'%' => Some((Operator::Percent, 1)),
			'=' => Some((Operator::Equal, 1)),
			'|' if i + 1 < len && chars[i + 1] == '|' => Some((Operator::Concat, 2)),
			'!' if i + 1 < len && chars[i + 1] == '=' => Some((Operator::NotEqual, 2)),
			'<' if i + 1 < len && chars[i + 1] == '=' => Some((Operator::LessEqual, 2)),
			'<' if i + 1 < len && chars[i + 1] == '>' => Some((Operator::NotEqual, 2)),
			'<' => Some((Operator::Less, 1)),
			'>' if i + 1 < len && chars[i + 1] == '=' => Some((Operator::GreaterEqual, 2)),
			'>' => Some((Operator::Greater, 1)),
			_ => None,
		};
		if let Some((operator, width)) = operator {
			let text: String = chars[i..i + width].iter().collect();
			tokens.push(Token {
				kind: TokenKind::Operator(operator),
				fragment: Fragment::statement(text, l, col),
			});
			i += width;
			continue;
		}

		if c == '?' {
			tokens.push(Token {
				kind: TokenKind::Parameter,
				fragment: Fragment::statement("?", l, col),
			});
			i += 1;
			continue;
		}

		// string literals and quoted identifiers
		if c == '\'' || c == '"' {
			let quote = c;
			i += 1;
			let mut s = String::new();
			let mut closed = false;
			while i < len {
				if chars[i] == quote {
					// doubled quote is an escaped quote
					if i + 1 < len && chars[i + 1] == quote {
						s.push(quote);
						i += 2;
					} else {
						closed = true;
						i += 1;
						break;
					}
				} else {
					if chars[i] == '\n' {
						line += 1;
						line_start = i + 1;
					}
					s.push(chars[i]);
					i += 1;
				}
			}
			if !closed {
				return Err(DmlError::UnexpectedEnd {
					expected: format!("closing {quote}"),
					fragment: Fragment::statement(s, l, col),
				});
			}
			let kind = if quote == '\'' {
				TokenKind::String
			} else {
				TokenKind::QuotedIdentifier
			};
			tokens.push(Token {
				kind,
				fragment: Fragment::statement(s, l, col),
			});
			continue;
		}

		if c.is_ascii_digit() {
			let start = i;
			while i < len && chars[i].is_ascii_digit() {
				i += 1;
			}
			let kind = if i < len && chars[i] == '.' && i + 1 < len && chars[i + 1].is_ascii_digit() {
				i += 1;
				while i < len && chars[i].is_ascii_digit() {
					i += 1;
				}
				TokenKind::Float
			} else {
				TokenKind::Integer
			};
			let text: String = chars[start..i].iter().collect();
			tokens.push(Token {
				kind,
				fragment: Fragment::statement(text, l, col),
			});
			continue;
		}

		if c.is_alphabetic() || c == '_' {
			let start = i;
			while i < len && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
				i += 1;
			}
			let word: String = chars[start..i].iter().collect();
			let kind = match KEYWORD_MAP.get(&word.to_ascii_lowercase()) {
				Some(keyword) => TokenKind::Keyword(*keyword),
				None => TokenKind::Identifier,
			};
			tokens.push(Token {
				kind,
				fragment: Fragment::statement(word, l, col),
			});
			continue;
		}

		return Err(DmlError::Syntax {
			expected: "a valid token".to_string(),
			found: c.to_string(),
			fragment: Fragment::statement(c.to_string(), l, col),
		});
	}

	Ok(tokens)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(sql: &str) -> Vec<TokenKind> {
		tokenize(sql).unwrap().into_iter().map(|t| t.kind).collect()
	}

	#[test]
	fn test_simple_update() {
		assert_eq!(
			kinds("UPDATE t SET a = 1"),
			vec![
				TokenKind::Keyword(Keyword::Update),
				TokenKind::Identifier,
				TokenKind::Keyword(Keyword::Set),
				TokenKind::Identifier,
				TokenKind::Operator(Operator::Equal),
				TokenKind::Integer,
			]
		);
	}

	#[test]
	fn test_string_literal() {
		let tokens = tokenize("'it''s'").unwrap();
		assert_eq!(tokens[0].kind, TokenKind::String);
		assert_eq!(tokens[0].text(), "it's");
	}

	#[test]
	fn test_quoted_identifier() {
		let tokens = tokenize("\"Order\"").unwrap();
		assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier);
		assert_eq!(tokens[0].text(), "Order");
		assert!(tokens[0].is_identifier());
	}

	#[test]
	fn test_comparison_operators() {
		assert_eq!(
			kinds("a <> b != c <= d || e"),
			vec![
				TokenKind::Identifier,
				TokenKind::Operator(Operator::NotEqual),
				TokenKind::Identifier,
				TokenKind::Operator(Operator::NotEqual),
				TokenKind::Identifier,
				TokenKind::Operator(Operator::LessEqual),
				TokenKind::Identifier,
				TokenKind::Operator(Operator::Concat),
				TokenKind::Identifier,
			]
		);
	}

	#[test]
	fn test_numeric_literals() {
		assert_eq!(kinds("42 3.14"), vec![TokenKind::Integer, TokenKind::Float]);
	}

	#[test]
	fn test_positions() {
		let tokens = tokenize("DELETE FROM t\n  WHERE id = ?").unwrap();
		let r#where = &tokens[3];
		assert_eq!(r#where.fragment.line(), 2);
		assert_eq!(r#where.fragment.column(), 3);
		assert_eq!(tokens[6].kind, TokenKind::Parameter);
	}

	#[test]
	fn test_comments_are_skipped() {
		assert_eq!(kinds("-- leading\nCALL /* inline */ p"), vec![TokenKind::Keyword(Keyword::Call), TokenKind::Identifier]);
	}

	#[test]
	fn test_unterminated_string() {
		let err = tokenize("'abc").unwrap_err();
		assert!(matches!(err, DmlError::UnexpectedEnd { .. }));
	}

	#[test]
	fn test_unexpected_character() {
		let err = tokenize("a # b").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}
}
