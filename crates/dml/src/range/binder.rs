// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::{QualifiedName, Relation};
use tessera_type::Fragment;
use tracing::debug;

use crate::{
	Result,
	context::CompileContext,
	error::{DmlError, ObjectKind},
	range::{DmlOperation, RangeBinding, RangeColumn, RangeSource},
	token::{Keyword, Operator, TokenKind, TokenStream},
};

/// `name` or `namespace.name`.
pub(crate) fn read_qualified_name(tokens: &mut TokenStream) -> Result<(QualifiedName, Fragment)> {
	let first = tokens.consume_identifier()?;
	if tokens.is_operator(Operator::Dot) && tokens.peek_nth(1).is_some_and(|t| t.is_identifier()) {
		tokens.consume_operator(Operator::Dot)?;
		let second = tokens.consume_identifier()?;
		let fragment = first.fragment.with_text(format!("{}.{}", first.text(), second.text()));
		return Ok((QualifiedName::new(first.text(), second.text()), fragment));
	}
	Ok((QualifiedName::unqualified(first.text()), first.fragment))
}

/// `AS alias` or a bare identifier following a relation name.
pub(crate) fn read_alias(tokens: &mut TokenStream) -> Result<Option<String>> {
	if tokens.consume_if_keyword(Keyword::As).is_some() {
		return Ok(Some(tokens.consume_identifier()?.text().to_string()));
	}
	match tokens.peek() {
		Some(token) if matches!(token.kind, TokenKind::Identifier | TokenKind::QuotedIdentifier) => {
			Ok(Some(tokens.next()?.text().to_string()))
		}
		_ => Ok(None),
	}
}

pub(crate) fn find_relation(ctx: &CompileContext<'_>, name: &QualifiedName, fragment: &Fragment) -> Result<Relation> {
	ctx.catalog().find_relation(name.namespace_or(ctx.default_namespace()), &name.name).ok_or_else(|| {
		DmlError::UnknownTarget {
			kind: ObjectKind::Relation,
			name: name.to_string(),
			fragment: fragment.clone(),
		}
	})
}

/// A fresh range over a table or view.
pub(crate) fn relation_range(
	ctx: &mut CompileContext<'_>,
	relation: Relation,
	alias: Option<String>,
	fragment: Fragment,
) -> RangeBinding {
	let name = alias.unwrap_or_else(|| relation.name().to_string());
	let columns = relation.columns().iter().map(RangeColumn::from).collect();
	let source = match relation {
		Relation::Table(table) => RangeSource::Table(table),
		Relation::View(view) => RangeSource::View(view),
	};
	RangeBinding::new(ctx.next_range_id(), name, source, columns, fragment)
}

pub(crate) fn bind_relation(
	ctx: &mut CompileContext<'_>,
	name: &QualifiedName,
	alias: Option<String>,
	fragment: Fragment,
) -> Result<RangeBinding> {
	let relation = find_relation(ctx, name, &fragment)?;
	Ok(relation_range(ctx, relation, alias, fragment))
}

/// The target of INSERT, UPDATE, DELETE, MERGE or TRUNCATE. Views must be
/// mutable for the operation, either through triggers or by being a simple
/// projection of one base relation.
pub(crate) fn read_range_for_data_change(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	operation: DmlOperation,
) -> Result<RangeBinding> {
	let (name, fragment) = read_qualified_name(tokens)?;
	let alias = match operation {
		DmlOperation::Insert | DmlOperation::Truncate => None,
		_ => read_alias(tokens)?,
	};
	let range = bind_relation(ctx, &name, alias, fragment)?;

	if let RangeSource::View(view) = &range.source {
		if !operation.is_view_mutable(view) {
			return Err(DmlError::NotUpdatable {
				view: view.qualified_name().to_string(),
				operation,
				fragment: range.fragment.clone(),
			});
		}
	}

	debug!(target = %range.name, %operation, "bound data change target");
	Ok(range)
}

/// A table reference or a parenthesised query with a correlation name, as
/// used for the MERGE source.
pub(crate) fn read_table_or_subquery(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<RangeBinding> {
	if let Some(open) = tokens.consume_if_operator(Operator::OpenParen) {
		let body = tokens.take_parenthesised()?;
		let outer = ctx.outer_groups().to_vec();
		let queries = ctx.queries();
		let mut stream = TokenStream::new(body);
		let plan = queries.compile(ctx, &mut stream, &outer, None)?;
		stream.expect_end()?;

		let Some(alias) = read_alias(tokens)? else {
			return Err(DmlError::syntax("a correlation name for the derived table", &tokens.fragment()));
		};
		let columns = plan.columns.clone();
		return Ok(RangeBinding::new(
			ctx.next_range_id(),
			alias,
			RangeSource::Derived(Box::new(plan)),
			columns,
			open.fragment,
		));
	}

	let (name, fragment) = read_qualified_name(tokens)?;
	let alias = read_alias(tokens)?;
	bind_relation(ctx, &name, alias, fragment)
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;

	use super::*;
	use crate::{CompilerConfig, token::tokenize};

	fn stream(sql: &str) -> TokenStream {
		TokenStream::new(tokenize(sql).unwrap())
	}

	#[test]
	fn test_qualified_name_and_alias() {
		let mut tokens = stream("archive.t AS x");
		let (name, _) = read_qualified_name(&mut tokens).unwrap();
		assert_eq!(name, QualifiedName::new("archive", "t"));
		assert_eq!(read_alias(&mut tokens).unwrap(), Some("x".to_string()));
	}

	#[test]
	fn test_alias_does_not_swallow_keywords() {
		let mut tokens = stream("t SET a = 1");
		read_qualified_name(&mut tokens).unwrap();
		assert_eq!(read_alias(&mut tokens).unwrap(), None);
	}

	#[test]
	fn test_unknown_relation() {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let err = read_range_for_data_change(&mut ctx, &mut stream("nowhere"), DmlOperation::Update).unwrap_err();
		assert!(matches!(err, DmlError::UnknownTarget { kind: ObjectKind::Relation, name, .. } if name == "nowhere"));
	}

	#[test]
	fn test_view_without_base_is_not_updatable() {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let err = read_range_for_data_change(&mut ctx, &mut stream("summary"), DmlOperation::Delete).unwrap_err();
		assert!(matches!(err, DmlError::NotUpdatable { operation: DmlOperation::Delete, .. }));
	}

	#[test]
	fn test_truncate_view_is_rejected() {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let err =
			read_range_for_data_change(&mut ctx, &mut stream("active_account"), DmlOperation::Truncate).unwrap_err();
		assert!(matches!(err, DmlError::NotUpdatable { operation: DmlOperation::Truncate, .. }));
	}

	#[test]
	fn test_derived_source_requires_alias() {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);

		let range = read_table_or_subquery(&mut ctx, &mut stream("(SELECT id, a FROM t) AS s")).unwrap();
		assert_eq!(range.name, "s");
		assert_eq!(range.columns.len(), 2);

		let err = read_table_or_subquery(&mut ctx, &mut stream("(SELECT id FROM t)")).unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));
	}
}
