// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compiler for SQL data change statements.
//!
//! Turns the text of an INSERT, UPDATE, DELETE, MERGE, TRUNCATE or CALL
//! statement into a [`CompiledStatement`]: every name bound to a table,
//! view column, routine or variable, every expression typed, identity and
//! generated column rules enforced, and writes through updatable views
//! redirected onto their base tables.
//!
//! ```ignore
//! use tessera_dml::{CompileContext, CompilerConfig, compile_statement};
//!
//! let config = CompilerConfig::default();
//! let mut ctx = CompileContext::new(&catalog, &config);
//! let statement = compile_statement(&mut ctx, "UPDATE account SET balance = balance + ? WHERE id = ?")?;
//! ```

use tracing::instrument;

mod compile;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod query;
pub mod range;
mod resolve;
pub mod statement;
pub mod target;
pub mod token;
mod value;

pub use compiler::DmlCompiler;
pub use config::{CompilerConfig, Dialect};
pub use context::CompileContext;
pub use error::{DmlError, ErrorKind, ObjectKind};
pub use expression::{
	BinaryOperator, ColumnBinding, ColumnExpression, DiagnosticsItem, Expression, ExpressionKind, Function,
	FunctionExpression, ParameterExpression, SubqueryBody, SubqueryExpression, SubqueryKind, UnaryOperator,
};
pub use query::{QueryBody, QueryCompiler, QueryPlan, SelectCompiler};
pub use range::{DmlOperation, RangeBinding, RangeColumn, RangeGroup, RangeId, RangeSource};
pub use statement::{
	Assignments, CallStatement, CallTarget, CompiledStatement, DeleteStatement, InsertMode, InsertSource,
	InsertStatement, MergeBranch, MergeDelete, MergeInsert, MergeStatement, MergeUpdate, SortAndSlice, SortKey,
	StatementKind, TruncateForm, TruncateStatement, TruncateTarget, UpdateStatement, WriteSet,
};
pub use target::{ColumnMap, DiagnosticsAssignment, SetClauseList, TargetParser};
pub use token::{Token, TokenKind, TokenStream, tokenize};

pub type Result<T> = std::result::Result<T, DmlError>;

/// Compile one statement against the scopes and collaborators of `ctx`.
/// Parameter markers and routine calls are accumulated in `ctx`.
#[instrument(name = "dml::compile_statement", level = "debug", skip(ctx))]
pub fn compile_statement(ctx: &mut CompileContext<'_>, sql: &str) -> Result<CompiledStatement> {
	let mut tokens = TokenStream::new(tokenize(sql)?);
	compile::compile(ctx, &mut tokens)
}
