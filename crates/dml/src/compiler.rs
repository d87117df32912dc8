// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shareable compiler bound to one catalog.

use std::sync::Arc;

use tessera_catalog::{MaterializedCatalog, RoutineDef};

use crate::{CompileContext, CompiledStatement, CompilerConfig, Result, compile_statement};

struct Inner {
	catalog: MaterializedCatalog,
	config: CompilerConfig,
}

/// The result of compiling a top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
	pub statement: CompiledStatement,
	/// Number of `?` markers in the statement.
	pub parameter_count: usize,
	/// Routines the statement calls.
	pub procedure_calls: Vec<RoutineDef>,
}

/// Compiles top-level statements, without enclosing scopes.
#[derive(Clone)]
pub struct DmlCompiler {
	inner: Arc<Inner>,
}

impl DmlCompiler {
	pub fn new(catalog: MaterializedCatalog, config: CompilerConfig) -> Self {
		Self {
			inner: Arc::new(Inner {
				catalog,
				config,
			}),
		}
	}

	pub fn config(&self) -> &CompilerConfig {
		&self.inner.config
	}

	pub fn compile(&self, sql: &str) -> Result<Compilation> {
		let mut ctx = CompileContext::new(&self.inner.catalog, &self.inner.config);
		let statement = compile_statement(&mut ctx, sql)?;
		Ok(Compilation {
			statement,
			parameter_count: ctx.parameter_count(),
			procedure_calls: ctx.procedure_calls().to_vec(),
		})
	}
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;

	use super::*;
	use crate::StatementKind;

	#[test]
	fn test_compile_collects_parameters_and_calls() {
		let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
		let compilation = compiler.compile("CALL adjust(?, ?)").unwrap();
		assert_eq!(compilation.statement.kind(), StatementKind::ProcedureCall);
		assert_eq!(compilation.parameter_count, 2);
		assert_eq!(compilation.procedure_calls.len(), 1);
	}

	#[test]
	fn test_compiler_is_shareable() {
		let compiler = DmlCompiler::new(test_catalog(), CompilerConfig::default());
		let other = compiler.clone();
		let handle = std::thread::spawn(move || other.compile("DELETE FROM t WHERE id = 1").map(|c| c.statement.kind()));
		assert_eq!(handle.join().unwrap().unwrap(), StatementKind::Delete);
		assert!(compiler.compile("DELETE FROM nowhere").is_err());
	}
}
