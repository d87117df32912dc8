// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Shared value types, source fragments and diagnostics.

pub mod error;
pub mod fragment;
pub mod value;

pub use error::{
	Error,
	diagnostic::{Diagnostic, IntoDiagnostic},
};
pub use fragment::{Fragment, StatementColumn, StatementLine};
pub use value::{Value, r#type::Type};

pub type Result<T> = std::result::Result<T, Error>;
