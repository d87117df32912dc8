// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementColumn(pub u32);

impl Deref for StatementColumn {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl PartialEq<i32> for StatementColumn {
	fn eq(&self, other: &i32) -> bool {
		self.0 == *other as u32
	}
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementLine(pub u32);

impl Deref for StatementLine {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl PartialEq<i32> for StatementLine {
	fn eq(&self, other: &i32) -> bool {
		self.0 == *other as u32
	}
}

/// A piece of source text together with where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fragment {
	/// No fragment information available
	#[default]
	None,

	/// Fragment from a SQL statement with position information
	Statement {
		text: String,
		line: StatementLine,
		column: StatementColumn,
	},

	/// Fragment produced by the compiler itself (e.g. a synthesized DEFAULT)
	Internal {
		text: String,
	},
}

impl Fragment {
	pub fn statement(text: impl Into<String>, line: u32, column: u32) -> Self {
		Fragment::Statement {
			text: text.into(),
			line: StatementLine(line),
			column: StatementColumn(column),
		}
	}

	pub fn internal(text: impl Into<String>) -> Self {
		Fragment::Internal {
			text: text.into(),
		}
	}

	/// Fragment positioned at the start of the first line, for tests.
	pub fn testing(text: impl Into<String>) -> Self {
		Self::statement(text, 1, 0)
	}

	pub fn text(&self) -> &str {
		match self {
			Fragment::None => "",
			Fragment::Statement {
				text,
				..
			}
			| Fragment::Internal {
				text,
			} => text,
		}
	}

	pub fn line(&self) -> StatementLine {
		match self {
			Fragment::Statement {
				line,
				..
			} => *line,
			_ => StatementLine(1),
		}
	}

	pub fn column(&self) -> StatementColumn {
		match self {
			Fragment::Statement {
				column,
				..
			} => *column,
			_ => StatementColumn(0),
		}
	}

	/// Keep the position of `self` but replace the text.
	pub fn with_text(&self, text: impl Into<String>) -> Self {
		match self {
			Fragment::Statement {
				line,
				column,
				..
			} => Fragment::Statement {
				text: text.into(),
				line: *line,
				column: *column,
			},
			_ => Fragment::internal(text),
		}
	}
}

impl Display for Fragment {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.text())
	}
}

impl AsRef<str> for Fragment {
	fn as_ref(&self) -> &str {
		self.text()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_text_keeps_position() {
		let fragment = Fragment::statement("abc", 3, 7);
		let other = fragment.with_text("xyz");
		assert_eq!(other.text(), "xyz");
		assert_eq!(other.line(), 3);
		assert_eq!(other.column(), 7);
	}

	#[test]
	fn test_none_defaults() {
		let fragment = Fragment::None;
		assert_eq!(fragment.text(), "");
		assert_eq!(fragment.line(), 1);
		assert_eq!(fragment.column(), 0);
	}
}
