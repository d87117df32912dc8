// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	expression::{ColumnBinding, Expression, ExpressionKind},
	range::{RangeBinding, RangeId},
};

/// Redirect every reference to a column of range `from` to the column of
/// `to` that `column_map` maps it to.
pub(crate) fn replace_column_references(
	expression: &mut Expression,
	from: RangeId,
	to: &RangeBinding,
	column_map: &[usize],
) {
	expression.for_each_mut(&mut |e| {
		let ExpressionKind::Column(column) = &mut e.kind else {
			return;
		};
		let Some(binding) = column.binding else {
			return;
		};
		if binding.range != from {
			return;
		}
		let Some(&target) = column_map.get(binding.column) else {
			return;
		};
		let target_column = &to.columns[target];
		column.binding = Some(ColumnBinding {
			range: to.id,
			column: target,
			data_type: target_column.data_type,
			variable: false,
		});
		column.name = target_column.name.clone();
		if column.qualifier.is_some() {
			column.qualifier = Some(to.name.clone());
		}
		e.data_type = Some(target_column.data_type);
	});
}

/// Mark the columns of `range` that `expression` reads.
pub(crate) fn mark_used_columns(range: &mut RangeBinding, expression: &Expression) {
	expression.for_each(&mut |e| {
		if let Some(binding) = e.column_binding() {
			if binding.range == range.id {
				if let Some(used) = range.used_columns.get_mut(binding.column) {
					*used = true;
				}
			}
		}
	});
}
