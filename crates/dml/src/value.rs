// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	Result,
	context::CompileContext,
	error::DmlError,
	expression::{Expression, ExpressionKind, ExpressionParser},
	token::{Operator, TokenStream},
};

/// The rows following `VALUES` in an INSERT or MERGE, each a row of
/// `degree` elements. `DEFAULT` is allowed as an element.
pub(crate) fn parse_contextually_typed_table(
	ctx: &mut CompileContext<'_>,
	tokens: &mut TokenStream,
	degree: usize,
) -> Result<Expression> {
	let start = tokens.fragment();
	let mut rows = Vec::new();
	loop {
		rows.push(parse_row_value(ctx, tokens, degree)?);
		if tokens.consume_if_operator(Operator::Comma).is_none() {
			break;
		}
	}
	Ok(Expression::new(ExpressionKind::Values(rows), start))
}

fn parse_row_value(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream, degree: usize) -> Result<Expression> {
	let fragment = tokens.fragment();
	let elements = if tokens.consume_if_operator(Operator::OpenParen).is_some() {
		let elements = ExpressionParser::new(ctx, tokens).parse_list()?;
		tokens.consume_operator(Operator::CloseParen)?;
		elements
	} else {
		vec![ExpressionParser::new(ctx, tokens).parse()?]
	};

	if elements.len() != degree {
		return Err(DmlError::DegreeMismatch {
			expected: degree,
			actual: elements.len(),
			fragment,
		});
	}
	Ok(Expression::new(ExpressionKind::Row(elements), fragment))
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;

	use super::*;
	use crate::{CompilerConfig, token::tokenize};

	fn parse(sql: &str, degree: usize) -> Result<Expression> {
		let catalog = test_catalog();
		let config = CompilerConfig::default();
		let mut ctx = CompileContext::new(&catalog, &config);
		let mut tokens = TokenStream::new(tokenize(sql)?);
		parse_contextually_typed_table(&mut ctx, &mut tokens, degree)
	}

	#[test]
	fn test_rows_are_wrapped() {
		let values = parse("(1, DEFAULT), (?, 'x')", 2).unwrap();
		assert_eq!(values.children().len(), 2);
		assert!(values.children().iter().all(|row| row.is_row() && row.degree() == 2));

		let values = parse("1, 2", 1).unwrap();
		assert_eq!(values.to_string(), "VALUES (1), (2)");
	}

	#[test]
	fn test_row_degree_must_match() {
		let err = parse("(1, 2), (3)", 2).unwrap_err();
		assert!(matches!(err, DmlError::DegreeMismatch { expected: 2, actual: 1, .. }));
	}
}
