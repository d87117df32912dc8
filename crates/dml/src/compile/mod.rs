// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Statement compilers, one per leading keyword.

mod call;
mod delete;
mod insert;
mod merge;
mod policy;
mod truncate;
mod update;
mod view;

use tessera_catalog::QualifiedName;
use tessera_type::Type;

use crate::{
	CompilerConfig, Result,
	context::CompileContext,
	error::DmlError,
	expression::{Expression, ExpressionParser, Precedence},
	range::{RangeBinding, RangeGroup},
	resolve::{Resolver, Scope},
	statement::{CompiledStatement, SortAndSlice, SortKey, WriteSet},
	token::{Keyword, Operator, Token, TokenKind, TokenStream},
};

/// Leading keywords of the statements this crate compiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum StatementStart {
	Insert,
	/// MySQL `REPLACE INTO`.
	Replace,
	Update,
	Delete,
	Merge,
	Truncate,
	Call,
}

impl StatementStart {
	fn from_token(token: &Token, config: &CompilerConfig) -> Option<Self> {
		match token.kind {
			TokenKind::Keyword(Keyword::Insert) => Some(StatementStart::Insert),
			TokenKind::Keyword(Keyword::Replace) if config.dialect.mysql => Some(StatementStart::Replace),
			TokenKind::Keyword(Keyword::Update) => Some(StatementStart::Update),
			TokenKind::Keyword(Keyword::Delete) => Some(StatementStart::Delete),
			TokenKind::Keyword(Keyword::Merge) => Some(StatementStart::Merge),
			TokenKind::Keyword(Keyword::Truncate) => Some(StatementStart::Truncate),
			TokenKind::Keyword(Keyword::Call) => Some(StatementStart::Call),
			_ => None,
		}
	}
}

/// Compile the statement in `tokens`, which must hold exactly one statement.
pub(crate) fn compile(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	let Some(token) = tokens.peek() else {
		return Err(tokens.unexpected_end("a data change statement"));
	};
	let Some(start) = StatementStart::from_token(token, ctx.config()) else {
		return Err(DmlError::syntax("INSERT, UPDATE, DELETE, MERGE, TRUNCATE or CALL", &token.fragment));
	};

	let statement = match start {
		StatementStart::Insert | StatementStart::Replace => insert::compile_insert(ctx, tokens)?,
		StatementStart::Update => update::compile_update(ctx, tokens)?,
		StatementStart::Delete => delete::compile_delete(ctx, tokens)?,
		StatementStart::Merge => merge::compile_merge(ctx, tokens)?,
		StatementStart::Truncate => truncate::compile_truncate(ctx, tokens)?,
		StatementStart::Call => call::compile_call(ctx, tokens)?,
	};
	tokens.expect_end()?;
	Ok(statement)
}

fn write_set(name: QualifiedName) -> WriteSet {
	let mut result = WriteSet::new();
	result.insert(name);
	result
}

/// `[ORDER BY key [ASC | DESC], ...] LIMIT n [OFFSET m]` of UPDATE and
/// DELETE. Sort keys are resolved against `ranges`.
fn parse_sort_and_slice(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	ranges: &[RangeBinding],
) -> Result<Option<SortAndSlice>> {
	let outer = ctx.outer_groups().to_vec();
	let mut order_by = Vec::new();
	if tokens.consume_if_keyword(Keyword::Order).is_some() {
		tokens.consume_keyword(Keyword::By)?;
		loop {
			let mut expression = ExpressionParser::new(ctx, tokens).parse()?;
			Resolver::new(ctx).resolve(&mut expression, Scope::new(ranges, &outer))?;
			let descending = if tokens.consume_if_keyword(Keyword::Desc).is_some() {
				true
			} else {
				tokens.consume_if_keyword(Keyword::Asc);
				false
			};
			order_by.push(SortKey {
				expression,
				descending,
			});
			if tokens.consume_if_operator(Operator::Comma).is_none() {
				break;
			}
		}
	}

	if tokens.consume_if_keyword(Keyword::Limit).is_none() {
		if order_by.is_empty() {
			return Ok(None);
		}
		return Err(DmlError::syntax("LIMIT", &tokens.fragment()));
	}

	let limit = parse_slice_bound(ctx, tokens, &outer)?;
	let offset = match tokens.consume_if_keyword(Keyword::Offset) {
		Some(_) => Some(parse_slice_bound(ctx, tokens, &outer)?),
		None => None,
	};
	Ok(Some(SortAndSlice {
		order_by,
		limit: Some(limit),
		offset,
	}))
}

fn parse_slice_bound(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	outer: &[RangeGroup],
) -> Result<Expression> {
	let mut bound = ExpressionParser::new(ctx, tokens).parse_node(Precedence::Comparison)?;
	match Resolver::new(ctx).resolve(&mut bound, Scope::outer_only(outer))? {
		None if bound.is_unresolved_parameter() => bound.set_attributes_as_column(Type::Int8, false),
		Some(t) if t.is_integer() => {}
		_ => return Err(DmlError::type_mismatch("LIMIT and OFFSET require an integer", &bound.fragment)),
	}
	Ok(bound)
}
