// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::{CatalogReader, RoutineDef};
use tessera_type::Fragment;

use crate::{
	CompilerConfig,
	query::{QueryCompiler, SelectCompiler},
	range::{RangeBinding, RangeColumn, RangeGroup, RangeId, RangeSource},
};

static SELECT_COMPILER: SelectCompiler = SelectCompiler;

/// State of one compile call: the collaborators, the enclosing scopes and
/// everything accumulated while the statement is compiled.
pub struct CompileContext<'a> {
	catalog: &'a dyn CatalogReader,
	config: &'a CompilerConfig,
	queries: &'a dyn QueryCompiler,
	outer: Vec<RangeGroup>,
	procedure_calls: Vec<RoutineDef>,
	next_range: usize,
	parameters: usize,
}

impl<'a> CompileContext<'a> {
	pub fn new(catalog: &'a dyn CatalogReader, config: &'a CompilerConfig) -> Self {
		Self {
			catalog,
			config,
			queries: &SELECT_COMPILER,
			outer: vec![],
			procedure_calls: vec![],
			next_range: 0,
			parameters: 0,
		}
	}

	pub fn with_query_compiler(mut self, queries: &'a dyn QueryCompiler) -> Self {
		self.queries = queries;
		self
	}

	pub fn catalog(&self) -> &'a dyn CatalogReader {
		self.catalog
	}

	pub fn config(&self) -> &'a CompilerConfig {
		self.config
	}

	pub(crate) fn queries(&self) -> &'a dyn QueryCompiler {
		self.queries
	}

	pub fn default_namespace(&self) -> &'a str {
		&self.config.default_namespace
	}

	/// Add an enclosing scope; later groups are searched first.
	pub fn push_outer_group(&mut self, group: RangeGroup) {
		self.outer.push(group);
	}

	/// Declare routine variables as an enclosing scope. References that bind
	/// to them are assignable by OUT and INOUT routine arguments.
	pub fn declare_variables(&mut self, columns: Vec<RangeColumn>) -> RangeId {
		let id = self.next_range_id();
		let range = RangeBinding::new(id, "", RangeSource::Variables, columns, Fragment::internal("variables"));
		self.outer.push(RangeGroup::single(range));
		id
	}

	pub fn outer_groups(&self) -> &[RangeGroup] {
		&self.outer
	}

	pub fn next_range_id(&mut self) -> RangeId {
		let id = RangeId(self.next_range);
		self.next_range += 1;
		id
	}

	pub(crate) fn next_parameter(&mut self) -> usize {
		let index = self.parameters;
		self.parameters += 1;
		index
	}

	/// Number of `?` markers seen so far.
	pub fn parameter_count(&self) -> usize {
		self.parameters
	}

	pub(crate) fn add_procedure_call(&mut self, routine: RoutineDef) {
		self.procedure_calls.push(routine);
	}

	/// Routines the compiled statement calls.
	pub fn procedure_calls(&self) -> &[RoutineDef] {
		&self.procedure_calls
	}
}
