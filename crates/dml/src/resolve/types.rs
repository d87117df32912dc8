// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_type::{Fragment, Type};

use crate::{
	Result,
	error::DmlError,
	expression::{
		BinaryOperator, DiagnosticsItem, Expression, ExpressionKind, Function, SubqueryBody, SubqueryExpression,
		SubqueryKind, UnaryOperator,
	},
};

/// Infer the type of every node below `expression`. Returns `None` for rows,
/// table value constructors, `DEFAULT` and parameter markers whose type
/// could not be inferred from their surroundings.
pub(crate) fn resolve_types(expression: &mut Expression) -> Result<Option<Type>> {
	let fragment = expression.fragment.clone();
	let result = match &mut expression.kind {
		ExpressionKind::Constant(value) => Some(value.get_type()),
		ExpressionKind::Parameter(_) => expression.data_type,
		ExpressionKind::Default => None,
		ExpressionKind::Column(column) => match column.binding {
			Some(binding) => Some(binding.data_type),
			None => {
				return Err(DmlError::UnresolvedReference {
					names: vec![column.name.clone()],
					fragment,
				});
			}
		},
		ExpressionKind::Row(elements) | ExpressionKind::Values(elements) => {
			for element in elements {
				resolve_types(element)?;
			}
			None
		}
		ExpressionKind::Subquery(SubqueryExpression {
			kind,
			body,
		}) => match (kind, body) {
			(_, SubqueryBody::Pending(_)) => return Err(DmlError::syntax("a resolved subquery", &fragment)),
			(SubqueryKind::Scalar, SubqueryBody::Compiled(plan)) => plan.columns.first().map(|c| c.data_type),
			(SubqueryKind::Row { .. }, SubqueryBody::Compiled(_)) => None,
		},
		ExpressionKind::Diagnostics(item) => Some(match item {
			DiagnosticsItem::RowCount => Type::Int8,
			DiagnosticsItem::More => Type::Utf8,
		}),
		ExpressionKind::Unary {
			operator,
			operand,
		} => Some(resolve_unary(*operator, operand, &fragment)?),
		ExpressionKind::Binary {
			operator,
			left,
			right,
		} => Some(resolve_binary(*operator, left, right, &fragment)?),
		ExpressionKind::IsNull {
			operand,
			..
		} => {
			if scalar_type(operand)?.is_none() {
				return Err(DmlError::type_mismatch(
					"the type of a parameter tested with IS NULL cannot be determined",
					&operand.fragment,
				));
			}
			Some(Type::Boolean)
		}
		ExpressionKind::Function(function) => {
			let Some(builtin) = function.function else {
				return Err(DmlError::syntax("a resolved function", &fragment));
			};
			Some(resolve_function(builtin, &mut function.arguments, &fragment)?)
		}
	};

	expression.data_type = result;
	Ok(result)
}

/// Resolve a search condition and require it to be BOOLEAN. A bare
/// parameter marker becomes a BOOLEAN parameter.
pub(crate) fn resolve_condition_types(condition: &mut Expression) -> Result<()> {
	match scalar_type(condition)? {
		None => {
			condition.data_type = Some(Type::Boolean);
			Ok(())
		}
		Some(Type::Boolean) => Ok(()),
		Some(other) => Err(DmlError::type_mismatch(
			format!("search condition must be BOOLEAN, found {other}"),
			&condition.fragment,
		)),
	}
}

/// Whether a value of type `source` may be assigned to `target`.
pub(crate) fn check_assignable(target: Type, source: &Expression, column: &str) -> Result<()> {
	match source.data_type {
		Some(source_type) if !target.can_assign_from(source_type) => Err(DmlError::type_mismatch(
			format!("cannot assign {source_type} to column {column} of type {target}"),
			&source.fragment,
		)),
		_ => Ok(()),
	}
}

/// Type of an operand that must be a single value.
fn scalar_type(expression: &mut Expression) -> Result<Option<Type>> {
	match expression.kind {
		ExpressionKind::Default => {
			return Err(DmlError::syntax("a value expression instead of DEFAULT", &expression.fragment));
		}
		ExpressionKind::Row(_)
		| ExpressionKind::Values(_)
		| ExpressionKind::Subquery(SubqueryExpression {
			kind: SubqueryKind::Row {
				..
			},
			..
		}) => {
			return Err(DmlError::DegreeMismatch {
				expected: 1,
				actual: expression.degree(),
				fragment: expression.fragment.clone(),
			});
		}
		_ => {}
	}
	resolve_types(expression)
}

fn resolve_unary(operator: UnaryOperator, operand: &mut Expression, fragment: &Fragment) -> Result<Type> {
	let operand_type = scalar_type(operand)?;
	match operator {
		UnaryOperator::Not => match operand_type {
			None => {
				operand.data_type = Some(Type::Boolean);
				Ok(Type::Boolean)
			}
			Some(Type::Boolean) | Some(Type::Undefined) => Ok(Type::Boolean),
			Some(other) => Err(DmlError::type_mismatch(format!("NOT requires BOOLEAN, found {other}"), fragment)),
		},
		UnaryOperator::Negate | UnaryOperator::Plus => match operand_type {
			None => Err(DmlError::type_mismatch("the type of a signed parameter cannot be determined", fragment)),
			Some(t) if t.is_number() || t.is_undefined() => Ok(t),
			Some(other) => {
				Err(DmlError::type_mismatch(format!("sign operator requires a number, found {other}"), fragment))
			}
		},
	}
}

fn resolve_binary(
	operator: BinaryOperator,
	left: &mut Expression,
	right: &mut Expression,
	fragment: &Fragment,
) -> Result<Type> {
	let left_type = scalar_type(left)?;
	let right_type = scalar_type(right)?;

	let (left_type, right_type) = match (left_type, right_type) {
		(Some(l), Some(r)) => (l, r),
		(None, Some(r)) => {
			let t = parameter_type(operator, r);
			left.data_type = Some(t);
			(t, r)
		}
		(Some(l), None) => {
			let t = parameter_type(operator, l);
			right.data_type = Some(t);
			(l, t)
		}
		(None, None) if operator.is_logical() => {
			left.data_type = Some(Type::Boolean);
			right.data_type = Some(Type::Boolean);
			(Type::Boolean, Type::Boolean)
		}
		(None, None) => {
			return Err(DmlError::type_mismatch(
				format!("the types of both operands of {} cannot be determined", operator.as_str()),
				fragment,
			));
		}
	};

	if operator.is_logical() {
		let accepted = |t: Type| t.is_bool() || t.is_undefined();
		if !accepted(left_type) || !accepted(right_type) {
			return Err(DmlError::type_mismatch(
				format!("{} requires BOOLEAN operands, found {left_type} and {right_type}", operator.as_str()),
				fragment,
			));
		}
		return Ok(Type::Boolean);
	}

	if operator.is_comparison() {
		if !left_type.is_comparable_with(right_type) {
			return Err(DmlError::type_mismatch(format!("cannot compare {left_type} with {right_type}"), fragment));
		}
		return Ok(Type::Boolean);
	}

	if operator == BinaryOperator::Concat {
		let accepted = |t: Type| t.is_utf8() || t.is_undefined() || t.is_number();
		if !accepted(left_type) || !accepted(right_type) {
			return Err(DmlError::type_mismatch(
				format!("cannot concatenate {left_type} and {right_type}"),
				fragment,
			));
		}
		return Ok(Type::Utf8);
	}

	match Type::promote(left_type, right_type) {
		Some(t) if t.is_number() || t.is_undefined() => Ok(t),
		_ => Err(DmlError::type_mismatch(
			format!("operator {} cannot combine {left_type} and {right_type}", operator.as_str()),
			fragment,
		)),
	}
}

fn parameter_type(operator: BinaryOperator, other: Type) -> Type {
	if operator.is_logical() {
		Type::Boolean
	} else if operator == BinaryOperator::Concat {
		Type::Utf8
	} else {
		other
	}
}

fn resolve_function(function: Function, arguments: &mut [Expression], fragment: &Fragment) -> Result<Type> {
	let expected = match function {
		Function::Coalesce => None,
		_ => Some(1),
	};
	if let Some(expected) = expected {
		if arguments.len() != expected {
			return Err(DmlError::DegreeMismatch {
				expected,
				actual: arguments.len(),
				fragment: fragment.clone(),
			});
		}
	}

	match function {
		Function::Coalesce => {
			if arguments.is_empty() {
				return Err(DmlError::DegreeMismatch {
					expected: 1,
					actual: 0,
					fragment: fragment.clone(),
				});
			}
			let mut result: Option<Type> = None;
			for argument in arguments.iter_mut() {
				if let Some(t) = scalar_type(argument)? {
					result = match result {
						None => Some(t),
						Some(r) => Some(Type::promote(r, t).ok_or_else(|| {
							DmlError::type_mismatch(
								format!("COALESCE cannot combine {r} and {t}"),
								&argument.fragment,
							)
						})?),
					};
				}
			}
			let Some(result) = result else {
				return Err(DmlError::type_mismatch(
					"the type of COALESCE cannot be determined",
					fragment,
				));
			};
			for argument in arguments.iter_mut() {
				if argument.is_unresolved_parameter() {
					argument.data_type = Some(result);
				}
			}
			Ok(result)
		}
		Function::Upper | Function::Lower | Function::Length => {
			let argument = &mut arguments[0];
			match scalar_type(argument)? {
				None => argument.data_type = Some(Type::Utf8),
				Some(t) if t.is_utf8() || t.is_undefined() => {}
				Some(other) => {
					return Err(DmlError::type_mismatch(
						format!("character argument expected, found {other}"),
						&argument.fragment,
					));
				}
			}
			Ok(if function == Function::Length {
				Type::Int4
			} else {
				Type::Utf8
			})
		}
		Function::Abs => {
			let argument = &mut arguments[0];
			match scalar_type(argument)? {
				None => Err(DmlError::type_mismatch(
					"the type of the ABS argument cannot be determined",
					&argument.fragment,
				)),
				Some(t) if t.is_number() || t.is_undefined() => Ok(t),
				Some(other) => Err(DmlError::type_mismatch(
					format!("numeric argument expected, found {other}"),
					&argument.fragment,
				)),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use tessera_type::Value;

	use super::*;
	use crate::expression::ParameterExpression;

	fn constant(value: Value) -> Expression {
		Expression::constant(value, Fragment::testing("c"))
	}

	fn parameter() -> Expression {
		Expression::new(
			ExpressionKind::Parameter(ParameterExpression {
				index: 0,
				as_column: false,
				writeable: false,
			}),
			Fragment::testing("?"),
		)
	}

	fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
		Expression::new(
			ExpressionKind::Binary {
				operator,
				left: Box::new(left),
				right: Box::new(right),
			},
			Fragment::testing(operator.as_str()),
		)
	}

	#[test]
	fn test_arithmetic_promotes() {
		let mut e = binary(BinaryOperator::Add, constant(Value::Int8(1)), constant(Value::Float8(2.0)));
		assert_eq!(resolve_types(&mut e).unwrap(), Some(Type::Float8));
	}

	#[test]
	fn test_parameter_takes_type_of_other_operand() {
		let mut e = binary(BinaryOperator::Equal, parameter(), constant(Value::Utf8("x".into())));
		assert_eq!(resolve_types(&mut e).unwrap(), Some(Type::Boolean));
		let ExpressionKind::Binary {
			left,
			..
		} = &e.kind
		else {
			panic!("expected binary");
		};
		assert_eq!(left.data_type, Some(Type::Utf8));
	}

	#[test]
	fn test_bare_parameter_condition_is_boolean() {
		let mut e = parameter();
		resolve_condition_types(&mut e).unwrap();
		assert_eq!(e.data_type, Some(Type::Boolean));
	}

	#[test]
	fn test_non_boolean_condition() {
		let mut e = binary(BinaryOperator::Add, constant(Value::Int8(1)), constant(Value::Int8(2)));
		let err = resolve_condition_types(&mut e).unwrap_err();
		assert!(matches!(err, DmlError::TypeMismatch { .. }));
	}

	#[test]
	fn test_and_requires_booleans() {
		let mut e = binary(BinaryOperator::And, constant(Value::Int8(1)), constant(Value::Boolean(true)));
		assert!(matches!(resolve_types(&mut e).unwrap_err(), DmlError::TypeMismatch { .. }));
	}

	#[test]
	fn test_incomparable_types() {
		let mut e = binary(BinaryOperator::Less, constant(Value::Boolean(true)), constant(Value::Int8(1)));
		assert!(matches!(resolve_types(&mut e).unwrap_err(), DmlError::TypeMismatch { .. }));
	}

	#[test]
	fn test_default_inside_operator() {
		let mut e =
			binary(BinaryOperator::Add, Expression::default_marker(Fragment::testing("DEFAULT")), constant(Value::Int8(1)));
		assert!(matches!(resolve_types(&mut e).unwrap_err(), DmlError::Syntax { .. }));
	}

	#[test]
	fn test_check_assignable() {
		let e = constant(Value::Utf8("x".into()));
		assert!(check_assignable(Type::Utf8, &e, "name").is_ok());
		assert!(matches!(check_assignable(Type::Int4, &e, "id").unwrap_err(), DmlError::TypeMismatch { .. }));
	}
}
