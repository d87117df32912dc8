// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use indexmap::IndexSet;
use tessera_catalog::{NamespaceDef, QualifiedName, Relation, RoutineDef, TableDef};

use crate::{expression::Expression, query::QueryPlan, range::RangeBinding};

/// Tables (or trigger-mutable views) a statement writes, in first-seen order.
pub type WriteSet = IndexSet<QualifiedName>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatementKind {
	Insert,
	Update,
	Delete,
	Merge,
	Truncate,
	ProcedureCall,
}

/// The fully resolved result of compiling one data change statement.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledStatement {
	Insert(InsertStatement),
	Update(UpdateStatement),
	Delete(DeleteStatement),
	Merge(MergeStatement),
	Truncate(TruncateStatement),
	ProcedureCall(CallStatement),
}

impl CompiledStatement {
	pub fn kind(&self) -> StatementKind {
		match self {
			CompiledStatement::Insert(_) => StatementKind::Insert,
			CompiledStatement::Update(_) => StatementKind::Update,
			CompiledStatement::Delete(_) => StatementKind::Delete,
			CompiledStatement::Merge(_) => StatementKind::Merge,
			CompiledStatement::Truncate(_) => StatementKind::Truncate,
			CompiledStatement::ProcedureCall(_) => StatementKind::ProcedureCall,
		}
	}

	pub fn write_tables(&self) -> &WriteSet {
		match self {
			CompiledStatement::Insert(s) => &s.write_tables,
			CompiledStatement::Update(s) => &s.write_tables,
			CompiledStatement::Delete(s) => &s.write_tables,
			CompiledStatement::Merge(s) => &s.write_tables,
			CompiledStatement::Truncate(s) => &s.write_tables,
			CompiledStatement::ProcedureCall(s) => &s.write_tables,
		}
	}

	/// Every expression held by the statement, including subquery bodies.
	pub fn for_each_expression(&self, f: &mut dyn FnMut(&Expression)) {
		fn visit_ranges(ranges: &[RangeBinding], f: &mut dyn FnMut(&Expression)) {
			ranges.iter().filter_map(|r| r.join_condition.as_ref()).for_each(|e| e.for_each(f));
		}

		match self {
			CompiledStatement::Insert(s) => {
				match &s.source {
					InsertSource::Values(rows) => rows.for_each(f),
					InsertSource::Query(plan) => plan.for_each_expression(f),
				}
				if let Some(update) = &s.on_duplicate {
					update.expressions.iter().for_each(|e| e.for_each(f));
				}
			}
			CompiledStatement::Update(s) => {
				visit_ranges(&s.ranges, f);
				s.expressions.iter().for_each(|e| e.for_each(f));
				if let Some(condition) = &s.condition {
					condition.for_each(f);
				}
			}
			CompiledStatement::Delete(s) => {
				visit_ranges(&s.ranges, f);
				if let Some(condition) = &s.condition {
					condition.for_each(f);
				}
			}
			CompiledStatement::Merge(s) => {
				visit_ranges(&s.ranges, f);
				if let Some(update) = &s.update {
					update.guard.for_each(f);
					update.assignments.expressions.iter().for_each(|e| e.for_each(f));
				}
				if let Some(delete) = &s.delete {
					delete.guard.for_each(f);
				}
				if let Some(insert) = &s.insert {
					insert.guard.for_each(f);
					insert.row.for_each(f);
				}
			}
			CompiledStatement::Truncate(_) => {}
			CompiledStatement::ProcedureCall(s) => match &s.target {
				CallTarget::Routine {
					arguments,
					..
				} => arguments.iter().for_each(|e| e.for_each(f)),
				CallTarget::Expression(e) => e.for_each(f),
			},
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertMode {
	Plain,
	/// `INSERT ... SELECT` or `INSERT ... TABLE`.
	Select,
	/// `REPLACE INTO`: a row with a conflicting key is replaced.
	Replace,
	/// `INSERT IGNORE`: a row with a conflicting key is skipped.
	Ignore,
	/// `ON DUPLICATE KEY UPDATE`.
	Update,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
	/// A `Values` expression; every row is a `Row` of the target degree.
	Values(Expression),
	Query(Box<QueryPlan>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
	/// The base table, or a view that handles inserts itself.
	pub target: Relation,
	pub mode: InsertMode,
	/// Ordinals of the target columns, in value order.
	pub column_map: Vec<usize>,
	/// `column_map` as a flag per column of `target`.
	pub check_list: Vec<bool>,
	pub source: InsertSource,
	/// Identity column of `target` whose value from an `INSERT ... SELECT`
	/// is replaced by the generated one (`OVERRIDING USER VALUE`).
	pub override_index: Option<usize>,
	pub on_duplicate: Option<Assignments>,
	pub write_tables: WriteSet,
}

/// The assignments of a SET clause, resolved against the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignments {
	pub column_map: Vec<usize>,
	pub check_list: Vec<bool>,
	/// One entry per target group; a row or row subquery spans several
	/// consecutive slots of `column_map`.
	pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
	pub expression: Expression,
	pub descending: bool,
}

/// `[ORDER BY ...] LIMIT n [OFFSET m]` of an UPDATE or DELETE.
#[derive(Debug, Clone, PartialEq)]
pub struct SortAndSlice {
	pub order_by: Vec<SortKey>,
	pub limit: Option<Expression>,
	pub offset: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
	pub target: Relation,
	/// The range over `target`, carrying its part of the condition.
	pub ranges: Vec<RangeBinding>,
	/// The full search condition, including view filters.
	pub condition: Option<Expression>,
	pub column_map: Vec<usize>,
	pub check_list: Vec<bool>,
	pub expressions: Vec<Expression>,
	pub sort_and_slice: Option<SortAndSlice>,
	pub write_tables: WriteSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
	pub target: Relation,
	pub ranges: Vec<RangeBinding>,
	pub condition: Option<Expression>,
	pub sort_and_slice: Option<SortAndSlice>,
	pub write_tables: WriteSet,
}

/// The kinds of WHEN clause a MERGE may hold, each at most once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MergeBranch {
	Update,
	Delete,
	Insert,
}

impl Display for MergeBranch {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			MergeBranch::Update => f.write_str("MATCHED THEN UPDATE"),
			MergeBranch::Delete => f.write_str("MATCHED THEN DELETE"),
			MergeBranch::Insert => f.write_str("NOT MATCHED"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeUpdate {
	pub guard: Expression,
	pub assignments: Assignments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeDelete {
	pub guard: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeInsert {
	pub guard: Expression,
	pub column_map: Vec<usize>,
	pub check_list: Vec<bool>,
	/// A single `Row` of the insert degree.
	pub row: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeStatement {
	pub target: Relation,
	/// The source range followed by the target range; the ON condition is
	/// distributed over them.
	pub ranges: Vec<RangeBinding>,
	/// The ON condition, including view filters of the target.
	pub condition: Expression,
	pub update: Option<MergeUpdate>,
	pub delete: Option<MergeDelete>,
	pub insert: Option<MergeInsert>,
	/// Evaluate the delete guard before the update guard for a matched row.
	pub delete_first: bool,
	pub write_tables: WriteSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TruncateTarget {
	Table(TableDef),
	Schema(NamespaceDef),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TruncateForm {
	/// Row level truncation inside the current transaction.
	Rows,
	/// `AND COMMIT`: executed as a command that commits.
	Command {
		no_check: bool,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruncateStatement {
	pub target: TruncateTarget,
	pub restart_identity: bool,
	pub form: TruncateForm,
	pub write_tables: WriteSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
	Routine {
		routine: RoutineDef,
		arguments: Vec<Expression>,
	},
	/// `CALL expr` where the name is not a routine.
	Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
	pub target: CallTarget,
	pub write_tables: WriteSet,
}
