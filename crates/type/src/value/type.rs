// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

/// All column and expression types known to the compiler
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
	/// A boolean: true or false.
	Boolean,
	/// A 2-byte signed integer
	Int2,
	/// A 4-byte signed integer
	Int4,
	/// An 8-byte signed integer
	Int8,
	/// A 4-byte floating point
	Float4,
	/// An 8-byte floating point
	Float8,
	/// An exact numeric with arbitrary precision
	Decimal,
	/// A UTF-8 encoded text.
	Utf8,
	/// A binary large object (BLOB)
	Blob,
	/// A date value (year, month, day)
	Date,
	/// A date and time value
	DateTime,
	/// A time value
	Time,
	/// Value is not defined (the type of a bare NULL)
	Undefined,
}

impl Type {
	pub fn is_number(&self) -> bool {
		self.is_integer() || self.is_floating_point() || matches!(self, Type::Decimal)
	}

	pub fn is_integer(&self) -> bool {
		matches!(self, Type::Int2 | Type::Int4 | Type::Int8)
	}

	pub fn is_floating_point(&self) -> bool {
		matches!(self, Type::Float4 | Type::Float8)
	}

	pub fn is_bool(&self) -> bool {
		matches!(self, Type::Boolean)
	}

	pub fn is_utf8(&self) -> bool {
		matches!(self, Type::Utf8)
	}

	pub fn is_temporal(&self) -> bool {
		matches!(self, Type::Date | Type::DateTime | Type::Time)
	}

	pub fn is_blob(&self) -> bool {
		matches!(self, Type::Blob)
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Type::Undefined)
	}

	fn numeric_rank(&self) -> u8 {
		match self {
			Type::Int2 => 1,
			Type::Int4 => 2,
			Type::Int8 => 3,
			Type::Decimal => 4,
			Type::Float4 => 5,
			Type::Float8 => 6,
			_ => 0,
		}
	}

	/// The common type of two operands of an arithmetic or comparison
	/// operator, or `None` when the operands cannot be combined.
	pub fn promote(left: Type, right: Type) -> Option<Type> {
		if left == right {
			return Some(left);
		}
		if left.is_undefined() {
			return Some(right);
		}
		if right.is_undefined() {
			return Some(left);
		}
		if left.is_number() && right.is_number() {
			return Some(if left.numeric_rank() >= right.numeric_rank() {
				left
			} else {
				right
			});
		}
		// character literals are accepted where a temporal value is expected
		if left.is_temporal() && right.is_utf8() {
			return Some(left);
		}
		if left.is_utf8() && right.is_temporal() {
			return Some(right);
		}
		None
	}

	/// Whether a value of type `source` may be stored into a slot of this type.
	pub fn can_assign_from(&self, source: Type) -> bool {
		if *self == source || source.is_undefined() {
			return true;
		}
		match self {
			Type::Int2 | Type::Int4 | Type::Int8 | Type::Decimal | Type::Float4 | Type::Float8 => {
				source.is_number()
			}
			Type::Utf8 => source.is_utf8(),
			Type::Date | Type::DateTime | Type::Time => source.is_utf8() || source.is_temporal(),
			Type::Blob => source.is_blob() || source.is_utf8(),
			Type::Boolean => false,
			Type::Undefined => true,
		}
	}

	/// Whether values of the two types can be compared with `=`, `<` and friends.
	pub fn is_comparable_with(&self, other: Type) -> bool {
		Type::promote(*self, other).is_some()
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Type::Boolean => f.write_str("BOOLEAN"),
			Type::Int2 => f.write_str("SMALLINT"),
			Type::Int4 => f.write_str("INTEGER"),
			Type::Int8 => f.write_str("BIGINT"),
			Type::Float4 => f.write_str("REAL"),
			Type::Float8 => f.write_str("DOUBLE"),
			Type::Decimal => f.write_str("DECIMAL"),
			Type::Utf8 => f.write_str("VARCHAR"),
			Type::Blob => f.write_str("BLOB"),
			Type::Date => f.write_str("DATE"),
			Type::DateTime => f.write_str("TIMESTAMP"),
			Type::Time => f.write_str("TIME"),
			Type::Undefined => f.write_str("UNDEFINED"),
		}
	}
}

impl FromStr for Type {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"BOOL" | "BOOLEAN" => Ok(Type::Boolean),
			"INT2" | "SMALLINT" => Ok(Type::Int2),
			"INT" | "INT4" | "INTEGER" => Ok(Type::Int4),
			"INT8" | "BIGINT" => Ok(Type::Int8),
			"FLOAT4" | "REAL" => Ok(Type::Float4),
			"FLOAT8" | "DOUBLE" | "FLOAT" => Ok(Type::Float8),
			"DECIMAL" | "NUMERIC" => Ok(Type::Decimal),
			"TEXT" | "VARCHAR" | "CHAR" | "UTF8" => Ok(Type::Utf8),
			"BLOB" => Ok(Type::Blob),
			"DATE" => Ok(Type::Date),
			"TIMESTAMP" | "DATETIME" => Ok(Type::DateTime),
			"TIME" => Ok(Type::Time),
			_ => Err(format!("unknown type '{s}'")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_promote_numeric() {
		assert_eq!(Type::promote(Type::Int4, Type::Int8), Some(Type::Int8));
		assert_eq!(Type::promote(Type::Float8, Type::Int2), Some(Type::Float8));
		assert_eq!(Type::promote(Type::Undefined, Type::Utf8), Some(Type::Utf8));
		assert_eq!(Type::promote(Type::Boolean, Type::Int4), None);
	}

	#[test]
	fn test_assignability() {
		assert!(Type::Int4.can_assign_from(Type::Int8));
		assert!(Type::Date.can_assign_from(Type::Utf8));
		assert!(Type::Utf8.can_assign_from(Type::Undefined));
		assert!(!Type::Utf8.can_assign_from(Type::Int4));
		assert!(!Type::Boolean.can_assign_from(Type::Int4));
	}

	#[test]
	fn test_parse_aliases() {
		assert_eq!("integer".parse::<Type>(), Ok(Type::Int4));
		assert_eq!("VARCHAR".parse::<Type>(), Ok(Type::Utf8));
		assert!("geometry".parse::<Type>().is_err());
	}
}
