// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::trace;

use crate::range::RangeBinding;

/// Split the join conditions of `ranges` into conjuncts and attach each one
/// to the last range it references, so it is evaluated as soon as all of its
/// inputs are available. Conjuncts referencing none of the ranges stay on
/// the first one.
pub(crate) fn process_conditions(ranges: &mut [RangeBinding]) {
	if ranges.is_empty() {
		return;
	}

	let mut conjuncts = Vec::new();
	for range in ranges.iter_mut() {
		if let Some(condition) = range.join_condition.take() {
			conjuncts.extend(condition.into_conjuncts());
		}
	}

	for conjunct in conjuncts {
		let referenced = conjunct.referenced_ranges();
		let position = ranges.iter().rposition(|r| referenced.contains(&r.id)).unwrap_or(0);
		trace!(range = %ranges[position].name, condition = %conjunct, "placed condition");
		ranges[position].add_join_condition(conjunct);
	}
}
