// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Identity and generated column rules for inserted and assigned values.

use tessera_catalog::{ColumnDef, IdentityGeneration};
use tessera_type::Fragment;

use crate::{
	Result,
	error::DmlError,
	expression::{Expression, ExpressionKind, SubqueryBody, SubqueryExpression, SubqueryKind},
	resolve::types::check_assignable,
	token::{Keyword, TokenStream},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum OverridingKind {
	User,
	System,
}

#[derive(Debug, Clone)]
pub(crate) struct Overriding {
	pub kind: OverridingKind,
	pub fragment: Fragment,
}

/// `OVERRIDING { USER | SYSTEM } VALUE`
pub(crate) fn parse_overriding(tokens: &mut TokenStream) -> Result<Option<Overriding>> {
	let Some(token) = tokens.consume_if_keyword(Keyword::Overriding) else {
		return Ok(None);
	};
	let kind = if tokens.consume_if_keyword(Keyword::User).is_some() {
		OverridingKind::User
	} else if tokens.consume_if_keyword(Keyword::System).is_some() {
		OverridingKind::System
	} else {
		return Err(DmlError::syntax("USER or SYSTEM", &tokens.fragment()));
	};
	tokens.consume_keyword(Keyword::Value)?;
	Ok(Some(Overriding {
		kind,
		fragment: token.fragment,
	}))
}

fn identity_of(columns: &[ColumnDef]) -> Option<(usize, IdentityGeneration)> {
	columns.iter().enumerate().find_map(|(i, c)| c.identity.map(|g| (i, g)))
}

/// Fail when an OVERRIDING clause is present but the identity column is not
/// among the targets.
pub(crate) fn check_overriding_target(
	columns: &[ColumnDef],
	column_map: &[usize],
	overriding: Option<&Overriding>,
) -> Result<()> {
	let Some(overriding) = overriding else {
		return Ok(());
	};
	match identity_of(columns) {
		Some((identity, _)) if column_map.contains(&identity) => Ok(()),
		_ => Err(DmlError::OverridingWithoutIdentity {
			fragment: overriding.fragment.clone(),
		}),
	}
}

/// Check every cell of the resolved insert `rows` against the column it is
/// stored into. Parameters take the type of their column.
pub(crate) fn apply_insert_policy(
	columns: &[ColumnDef],
	column_map: &[usize],
	rows: &mut [Expression],
	overriding: Option<&Overriding>,
) -> Result<()> {
	check_overriding_target(columns, column_map, overriding)?;
	let identity = identity_of(columns);

	for row in rows {
		let ExpressionKind::Row(cells) = &mut row.kind else {
			return Err(DmlError::syntax("a row value", &row.fragment));
		};
		for (cell, &index) in cells.iter_mut().zip(column_map) {
			let column = &columns[index];
			if cell.is_default() {
				continue;
			}

			if let Some((identity, generation)) = identity {
				if identity == index {
					match (generation, overriding.map(|o| o.kind)) {
						(_, Some(OverridingKind::User)) => {
							*cell = Expression::default_marker(cell.fragment.clone());
							continue;
						}
						(IdentityGeneration::Always, None) => {
							return Err(DmlError::IdentityOverrideRequired {
								column: column.name.clone(),
								fragment: cell.fragment.clone(),
							});
						}
						_ => {}
					}
				}
			}

			if column.is_generated() {
				return Err(DmlError::GeneratedColumnWrite {
					column: column.name.clone(),
					fragment: cell.fragment.clone(),
				});
			}
			assign(column, cell)?;
		}
	}
	Ok(())
}

/// Check the values of a resolved SET clause list. Rows and row subqueries
/// span as many entries of `column_map` as their degree.
pub(crate) fn resolve_update_expressions(
	columns: &[ColumnDef],
	column_map: &[usize],
	expressions: &mut [Expression],
) -> Result<()> {
	let mut slot = 0;
	for expression in expressions {
		if let ExpressionKind::Row(elements) = &mut expression.kind {
			for element in elements {
				check_update_cell(&columns[column_map[slot]], element)?;
				slot += 1;
			}
			continue;
		}

		if let ExpressionKind::Subquery(SubqueryExpression {
			kind: SubqueryKind::Row {
				..
			},
			body: SubqueryBody::Compiled(plan),
		}) = &expression.kind
		{
			for produced in &plan.columns {
				let column = &columns[column_map[slot]];
				check_update_target(column, false, &expression.fragment)?;
				if !column.data_type.can_assign_from(produced.data_type) {
					return Err(DmlError::type_mismatch(
						format!(
							"cannot assign {} to column {} of type {}",
							produced.data_type, column.name, column.data_type
						),
						&expression.fragment,
					));
				}
				slot += 1;
			}
			continue;
		}

		check_update_cell(&columns[column_map[slot]], expression)?;
		slot += 1;
	}
	Ok(())
}

fn check_update_cell(column: &ColumnDef, cell: &mut Expression) -> Result<()> {
	check_update_target(column, cell.is_default(), &cell.fragment)?;
	if cell.is_default() {
		return Ok(());
	}
	assign(column, cell)
}

/// Generated columns are never assigned; an ALWAYS identity only to DEFAULT.
fn check_update_target(column: &ColumnDef, is_default: bool, fragment: &Fragment) -> Result<()> {
	if column.is_generated() {
		return Err(DmlError::GeneratedColumnWrite {
			column: column.name.clone(),
			fragment: fragment.clone(),
		});
	}
	if column.identity == Some(IdentityGeneration::Always) && !is_default {
		return Err(DmlError::IdentityOverrideRequired {
			column: column.name.clone(),
			fragment: fragment.clone(),
		});
	}
	Ok(())
}

fn assign(column: &ColumnDef, cell: &mut Expression) -> Result<()> {
	if cell.is_unresolved_parameter() {
		cell.set_attributes_as_column(column.data_type, false);
	}
	check_assignable(column.data_type, cell, &column.name)
}
