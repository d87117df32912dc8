// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub(crate) mod binder;
pub(crate) mod join;

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use tessera_catalog::{ColumnDef, QualifiedName, Relation, TableDef, ViewDef};
use tessera_type::{Fragment, Type};

use crate::{Result, error::DmlError, expression::Expression, query::QueryPlan};

/// Handle of a range binding, unique within one compile call. Expressions
/// refer to ranges through it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeId(pub usize);

impl Display for RangeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// The data-change operation a target range is bound for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DmlOperation {
	Insert,
	Update,
	Delete,
	Merge,
	Truncate,
}

impl DmlOperation {
	/// Whether the view executes the operation itself (instead-of trigger).
	pub fn is_trigger_mutable(&self, view: &ViewDef) -> bool {
		match self {
			DmlOperation::Insert => view.trigger_insertable,
			DmlOperation::Update => view.trigger_updatable,
			DmlOperation::Delete => view.trigger_deletable,
			DmlOperation::Merge => view.trigger_updatable && view.trigger_insertable,
			DmlOperation::Truncate => false,
		}
	}

	/// Whether the operation can be applied to the view at all.
	pub fn is_view_mutable(&self, view: &ViewDef) -> bool {
		match self {
			DmlOperation::Truncate => false,
			_ => self.is_trigger_mutable(view) || view.is_updatable(),
		}
	}
}

impl Display for DmlOperation {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			DmlOperation::Insert => f.write_str("INSERT"),
			DmlOperation::Update => f.write_str("UPDATE"),
			DmlOperation::Delete => f.write_str("DELETE"),
			DmlOperation::Merge => f.write_str("MERGE"),
			DmlOperation::Truncate => f.write_str("TRUNCATE"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeSource {
	Table(TableDef),
	View(ViewDef),
	/// A subquery in a FROM or USING clause.
	Derived(Box<QueryPlan>),
	/// Variables of an enclosing routine.
	Variables,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeColumn {
	pub name: String,
	pub data_type: Type,
}

impl RangeColumn {
	pub fn new(name: impl Into<String>, data_type: Type) -> Self {
		Self {
			name: name.into(),
			data_type,
		}
	}
}

impl From<&ColumnDef> for RangeColumn {
	fn from(column: &ColumnDef) -> Self {
		Self::new(column.name.clone(), column.data_type)
	}
}

/// A name scope exposing the columns of a table, view, derived table or a
/// set of variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBinding {
	pub id: RangeId,
	/// Correlation name: the alias, or the relation name without namespace.
	pub name: String,
	pub source: RangeSource,
	pub columns: Vec<RangeColumn>,
	pub used_columns: Vec<bool>,
	pub join_condition: Option<Expression>,
	pub fragment: Fragment,
}

impl RangeBinding {
	pub fn new(
		id: RangeId,
		name: impl Into<String>,
		source: RangeSource,
		columns: Vec<RangeColumn>,
		fragment: Fragment,
	) -> Self {
		let used_columns = vec![false; columns.len()];
		Self {
			id,
			name: name.into(),
			source,
			columns,
			used_columns,
			join_condition: None,
			fragment,
		}
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
	}

	pub fn matches_qualifier(&self, qualifier: &str) -> bool {
		self.name.eq_ignore_ascii_case(qualifier)
	}

	pub fn is_variables(&self) -> bool {
		matches!(self.source, RangeSource::Variables)
	}

	/// Name of the table or view behind the range.
	pub fn relation_name(&self) -> Option<QualifiedName> {
		match &self.source {
			RangeSource::Table(table) => Some(table.qualified_name()),
			RangeSource::View(view) => Some(view.qualified_name()),
			_ => None,
		}
	}

	/// The table or view behind the range.
	pub fn relation(&self) -> Option<Relation> {
		match &self.source {
			RangeSource::Table(table) => Some(Relation::Table(table.clone())),
			RangeSource::View(view) => Some(Relation::View(view.clone())),
			_ => None,
		}
	}

	/// Column definitions of a table or view range.
	pub fn column_defs(&self) -> Option<&[ColumnDef]> {
		match &self.source {
			RangeSource::Table(table) => Some(&table.columns),
			RangeSource::View(view) => Some(&view.columns),
			_ => None,
		}
	}

	pub fn add_join_condition(&mut self, condition: Expression) {
		self.join_condition = Expression::and(self.join_condition.take(), Some(condition));
	}

	pub fn mark_all_used(&mut self) {
		self.used_columns.iter_mut().for_each(|used| *used = true);
	}
}

/// Ranges visible to one expression, in scope order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeGroup {
	ranges: Vec<RangeBinding>,
}

impl RangeGroup {
	pub fn new(ranges: Vec<RangeBinding>) -> Result<Self> {
		for (i, range) in ranges.iter().enumerate() {
			if ranges[..i].iter().any(|r| r.name.eq_ignore_ascii_case(&range.name)) {
				return Err(DmlError::DuplicateRangeName {
					name: range.name.clone(),
					fragment: range.fragment.clone(),
				});
			}
		}
		Ok(Self {
			ranges,
		})
	}

	pub fn single(range: RangeBinding) -> Self {
		Self {
			ranges: vec![range],
		}
	}

	pub fn ranges(&self) -> &[RangeBinding] {
		&self.ranges
	}

	pub fn into_ranges(self) -> Vec<RangeBinding> {
		self.ranges
	}
}

impl Deref for RangeGroup {
	type Target = [RangeBinding];

	fn deref(&self) -> &Self::Target {
		&self.ranges
	}
}
