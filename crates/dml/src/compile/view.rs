// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::slice;

use tessera_catalog::Relation;
use tracing::debug;

use crate::{
	Result,
	context::CompileContext,
	error::DmlError,
	expression::{Expression, ExpressionParser},
	range::{
		DmlOperation, RangeBinding, RangeSource,
		binder::{find_relation, relation_range},
	},
	resolve::{Resolver, Scope, rewrite::replace_column_references},
	token::{TokenStream, tokenize},
};

/// Where a data change against a range really lands.
#[derive(Debug)]
pub(crate) struct ViewResolution {
	/// The range the statement was written against.
	pub original: RangeBinding,
	/// A base table, or a view that performs the operation itself.
	pub target: Relation,
	/// The range over `target`; equal to `original` when nothing was
	/// rewritten.
	pub range: RangeBinding,
	/// `column_map[i]` is the column of `target` behind column `i` of
	/// `original`.
	pub column_map: Vec<usize>,
	/// The AND of the filters of every view on the way, bound to `range`.
	pub filter: Option<Expression>,
}

impl ViewResolution {
	pub fn is_rewritten(&self) -> bool {
		self.original.id != self.range.id
	}

	/// Redirect references to the original range onto the target range.
	pub fn rewrite(&self, expression: &mut Expression) {
		if self.is_rewritten() {
			replace_column_references(expression, self.original.id, &self.range, &self.column_map);
		}
	}
}

/// Peel views that cannot perform `operation` themselves, one layer at a
/// time, until a base table or a self-handling view is reached.
pub(crate) fn resolve_view_target(
	ctx: &mut CompileContext<'_>,
	original: RangeBinding,
	operation: DmlOperation,
) -> Result<ViewResolution> {
	let mut current = original.clone();
	let mut column_map: Vec<usize> = (0..original.columns.len()).collect();
	let mut filter: Option<Expression> = None;

	loop {
		let view = match &current.source {
			RangeSource::View(view) if !operation.is_trigger_mutable(view) => view.clone(),
			_ => break,
		};
		let Some(base) = &view.base else {
			return Err(DmlError::NotUpdatable {
				view: view.qualified_name().to_string(),
				operation,
				fragment: current.fragment.clone(),
			});
		};

		let base_name = base.relation.qualify(&view.namespace_name);
		let relation = find_relation(ctx, &base_name, &current.fragment)?;
		let mut base_range = relation_range(ctx, relation, None, current.fragment.clone());

		if let Some(filter) = filter.as_mut() {
			replace_column_references(filter, current.id, &base_range, &base.column_map);
		}

		let view_filter = match &base.filter {
			Some(text) => {
				let mut tokens = TokenStream::new(tokenize(text)?);
				let mut condition = ExpressionParser::new(ctx, &mut tokens).parse()?;
				tokens.expect_end()?;
				Resolver::new(ctx).resolve_condition(&mut condition, Scope::new(slice::from_ref(&base_range), &[]))?;
				Some(condition)
			}
			None => None,
		};
		filter = Expression::and(view_filter, filter);

		column_map = column_map.iter().map(|&c| base.column_map[c]).collect();
		base_range.mark_all_used();

		debug!(view = %view.name, base = %base_name, columns = column_map.len(), "rewrote view onto its base");
		current = base_range;
	}

	let Some(target) = current.relation() else {
		return Err(DmlError::syntax("a table or view", &current.fragment));
	};

	Ok(ViewResolution {
		original,
		target,
		range: current,
		column_map,
		filter,
	})
}

#[cfg(test)]
mod tests {
	use tessera_catalog::{QualifiedName, test_utils::test_catalog};
	use tessera_type::Fragment;

	use super::*;
	use crate::{CompilerConfig, range::binder::bind_relation};

	fn resolve(name: &str, operation: DmlOperation) -> Result<ViewResolution> {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let range = bind_relation(&mut ctx, &QualifiedName::unqualified(name), None, Fragment::testing(name))?;
		resolve_view_target(&mut ctx, range, operation)
	}

	#[test]
	fn test_table_is_its_own_target() {
		let resolution = resolve("t", DmlOperation::Update).unwrap();
		assert!(!resolution.is_rewritten());
		assert_eq!(resolution.column_map, vec![0, 1, 2]);
		assert!(resolution.filter.is_none());
	}

	#[test]
	fn test_layered_view_composes_filters() {
		let resolution = resolve("rich_active", DmlOperation::Delete).unwrap();
		assert!(resolution.is_rewritten());
		assert_eq!(resolution.target.name(), "account");
		assert_eq!(resolution.column_map, vec![0, 1, 2]);
		assert_eq!(resolution.filter.unwrap().to_string(), "(active = TRUE) AND (balance > 1000)");
	}

	#[test]
	fn test_projection_through_column_map() {
		let resolution = resolve("account_labels", DmlOperation::Update).unwrap();
		assert_eq!(resolution.column_map, vec![0, 4]);
	}

	#[test]
	fn test_trigger_view_is_not_rewritten() {
		let resolution = resolve("audited_t", DmlOperation::Update).unwrap();
		assert!(!resolution.is_rewritten());
		assert!(matches!(resolution.target, Relation::View(_)));
	}
}
