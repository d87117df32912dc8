// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod r#type;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use self::r#type::Type;

/// A literal value as it appears in a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// Value is not defined (SQL NULL)
	Undefined,
	Boolean(bool),
	Int8(i64),
	Float8(f64),
	Utf8(String),
}

impl Value {
	pub fn get_type(&self) -> Type {
		match self {
			Value::Undefined => Type::Undefined,
			Value::Boolean(_) => Type::Boolean,
			Value::Int8(_) => Type::Int8,
			Value::Float8(_) => Type::Float8,
			Value::Utf8(_) => Type::Utf8,
		}
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Undefined => f.write_str("NULL"),
			Value::Boolean(true) => f.write_str("TRUE"),
			Value::Boolean(false) => f.write_str("FALSE"),
			Value::Int8(value) => Display::fmt(value, f),
			Value::Float8(value) => Display::fmt(value, f),
			Value::Utf8(value) => write!(f, "'{}'", value.replace('\'', "''")),
		}
	}
}
