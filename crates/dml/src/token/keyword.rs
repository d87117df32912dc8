// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Keyword definitions.

use std::{collections::HashMap, sync::LazyLock};

macro_rules! keyword {
	( $( $variant:ident => $string:literal ),* $(,)? ) => {
		/// SQL keywords understood by the DML compiler.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum Keyword {
			$( $variant ),*
		}

		impl Keyword {
			/// Get the canonical string representation.
			pub const fn as_str(&self) -> &'static str {
				match self {
					$( Keyword::$variant => $string ),*
				}
			}
		}

		/// Map from lowercase keyword strings to Keyword variants.
		pub static KEYWORD_MAP: LazyLock<HashMap<String, Keyword>> = LazyLock::new(|| {
			let mut map = HashMap::new();
			$( map.insert($string.to_ascii_lowercase(), Keyword::$variant); )*
			map
		});
	};
}

keyword! {
	// Statements
	Insert     => "INSERT",
	Replace    => "REPLACE",
	Update     => "UPDATE",
	Delete     => "DELETE",
	Merge      => "MERGE",
	Truncate   => "TRUNCATE",
	Call       => "CALL",

	// Clauses
	Into       => "INTO",
	Values     => "VALUES",
	Value      => "VALUE",
	Default    => "DEFAULT",
	Set        => "SET",
	From       => "FROM",
	Where      => "WHERE",
	Using      => "USING",
	On         => "ON",
	When       => "WHEN",
	Matched    => "MATCHED",
	Then       => "THEN",
	Select     => "SELECT",
	With       => "WITH",
	Table      => "TABLE",
	Schema     => "SCHEMA",
	As         => "AS",
	Order      => "ORDER",
	By         => "BY",
	Asc        => "ASC",
	Desc       => "DESC",
	Limit      => "LIMIT",
	Offset     => "OFFSET",
	Row        => "ROW",

	// INSERT options
	Overriding => "OVERRIDING",
	User       => "USER",
	System     => "SYSTEM",
	Ignore     => "IGNORE",
	Duplicate  => "DUPLICATE",
	Key        => "KEY",

	// TRUNCATE options
	Continue   => "CONTINUE",
	Restart    => "RESTART",
	Identity   => "IDENTITY",
	Commit     => "COMMIT",
	No         => "NO",
	Check      => "CHECK",

	// Diagnostics items
	RowCount   => "ROW_COUNT",
	More       => "MORE",

	// Operators and literals
	And        => "AND",
	Or         => "OR",
	Not        => "NOT",
	Is         => "IS",
	Null       => "NULL",
	True       => "TRUE",
	False      => "FALSE",
}

impl Keyword {
	/// Reserved keywords can never be used as names.
	pub fn is_reserved(&self) -> bool {
		!matches!(
			self,
			Keyword::Value
				| Keyword::Replace | Keyword::User
				| Keyword::System | Keyword::Ignore
				| Keyword::Duplicate | Keyword::Key
				| Keyword::Continue | Keyword::Restart
				| Keyword::Identity | Keyword::Commit
				| Keyword::No | Keyword::Check
				| Keyword::RowCount | Keyword::More
				| Keyword::Matched | Keyword::Asc
				| Keyword::Desc | Keyword::Schema
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_keyword_lookup_is_case_insensitive() {
		assert_eq!(KEYWORD_MAP.get("merge"), Some(&Keyword::Merge));
		assert_eq!(KEYWORD_MAP.get("row_count"), Some(&Keyword::RowCount));
		assert_eq!(Keyword::Overriding.as_str(), "OVERRIDING");
	}

	#[test]
	fn test_reserved() {
		assert!(Keyword::Where.is_reserved());
		assert!(!Keyword::Value.is_reserved());
		assert!(!Keyword::RowCount.is_reserved());
	}
}
