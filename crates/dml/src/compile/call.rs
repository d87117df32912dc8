// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_catalog::{ParameterDef, ParameterMode, QualifiedName, RoutineDef};
use tessera_type::Fragment;
use tracing::{debug, instrument, trace};

use crate::{
	Result,
	context::CompileContext,
	error::{DmlError, ObjectKind},
	expression::{Expression, ExpressionKind, ExpressionParser},
	range::binder::read_qualified_name,
	resolve::{Resolver, Scope},
	statement::{CallStatement, CallTarget, CompiledStatement, WriteSet},
	token::{Keyword, Operator, TokenStream},
};

#[instrument(name = "dml::compile::call", level = "debug", skip_all)]
pub(crate) fn compile_call(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	tokens.consume_keyword(Keyword::Call)?;
	let start = tokens.position();

	let mut lookup = None;
	if tokens.is_identifier() {
		let (name, fragment) = read_qualified_name(tokens)?;
		let routines = find_routines(ctx, &name);
		lookup = Some((name, fragment, routines));
	}

	let (name, fragment, routines) = match lookup {
		Some((name, fragment, routines)) if !routines.is_empty() => (name, fragment, routines),
		lookup => {
			if ctx.config().strict_procedure_call {
				let (name, fragment) = match lookup {
					Some((name, fragment, _)) => (name.to_string(), fragment),
					None => (String::new(), tokens.fragment()),
				};
				return Err(unknown_routine(name, fragment));
			}
			tokens.rewind(start);
			return compile_expression_call(ctx, tokens);
		}
	};

	let arguments = parse_arguments(ctx, tokens)?;
	let Some(routine) = routines.into_iter().find(|routine| routine.arity() == arguments.len()) else {
		return Err(unknown_routine(format!("{}/{}", name, arguments.len()), fragment));
	};

	let arguments = bind_arguments(ctx, &routine, arguments)?;
	debug!(routine = %routine.qualified_name(), arguments = arguments.len(), "compiled call");
	ctx.add_procedure_call(routine.clone());
	Ok(CompiledStatement::ProcedureCall(CallStatement {
		target: CallTarget::Routine {
			routine,
			arguments,
		},
		write_tables: WriteSet::new(),
	}))
}

/// Routines named `name`; an unqualified miss follows a synonym in the
/// default namespace.
fn find_routines(ctx: &CompileContext<'_>, name: &QualifiedName) -> Vec<RoutineDef> {
	let catalog = ctx.catalog();
	let namespace = name.namespace_or(ctx.default_namespace());
	let routines = catalog.find_routines(namespace, &name.name);
	if !routines.is_empty() || name.namespace.is_some() {
		return routines;
	}
	match catalog.find_synonym(ctx.default_namespace(), &name.name) {
		Some(synonym) => {
			trace!(%name, %synonym, "following synonym");
			catalog.find_routines(synonym.namespace_or(ctx.default_namespace()), &synonym.name)
		}
		None => routines,
	}
}

fn parse_arguments(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<Vec<Expression>> {
	if tokens.consume_if_operator(Operator::OpenParen).is_none() {
		if ctx.config().dialect.oracle {
			return Ok(vec![]);
		}
		return Err(DmlError::syntax("(", &tokens.fragment()));
	}
	if tokens.consume_if_operator(Operator::CloseParen).is_some() {
		return Ok(vec![]);
	}
	let arguments = ExpressionParser::new(ctx, tokens).parse_list()?;
	tokens.consume_operator(Operator::CloseParen)?;
	Ok(arguments)
}

fn bind_arguments(
	ctx: &mut CompileContext<'_>,
	routine: &RoutineDef,
	mut arguments: Vec<Expression>,
) -> Result<Vec<Expression>> {
	let outer = ctx.outer_groups().to_vec();
	for (index, (argument, parameter)) in arguments.iter_mut().zip(&routine.parameters).enumerate() {
		let position = index + 1;
		Resolver::new(ctx).resolve(argument, Scope::outer_only(&outer))?;

		let writeable = parameter.mode.is_writeable();
		let is_parameter = matches!(argument.kind, ExpressionKind::Parameter(_));
		if writeable && !argument.is_variable() && !is_parameter {
			return Err(DmlError::InvalidOutArgument {
				routine: routine.qualified_name().to_string(),
				position,
				fragment: argument.fragment.clone(),
			});
		}

		if argument.is_unresolved_parameter() {
			argument.set_attributes_as_column(parameter.data_type, writeable);
			continue;
		}
		check_argument(routine, parameter, position, argument)?;
	}
	Ok(arguments)
}

fn check_argument(routine: &RoutineDef, parameter: &ParameterDef, position: usize, argument: &Expression) -> Result<()> {
	let Some(actual) = argument.data_type else {
		return Ok(());
	};
	let accepts = match parameter.mode {
		ParameterMode::In => parameter.data_type.can_assign_from(actual),
		ParameterMode::Out => actual.can_assign_from(parameter.data_type),
		ParameterMode::InOut => {
			parameter.data_type.can_assign_from(actual) && actual.can_assign_from(parameter.data_type)
		}
	};
	if accepts {
		return Ok(());
	}
	Err(DmlError::ArgumentTypeMismatch {
		routine: routine.qualified_name().to_string(),
		position,
		expected: parameter.data_type,
		actual,
		fragment: argument.fragment.clone(),
	})
}

/// `CALL expr`: a scalar expression statement over the enclosing scopes.
fn compile_expression_call(ctx: &mut CompileContext<'_>, tokens: &mut TokenStream) -> Result<CompiledStatement> {
	let mut expression = ExpressionParser::new(ctx, tokens).parse()?;
	let outer = ctx.outer_groups().to_vec();
	Resolver::new(ctx).resolve(&mut expression, Scope::outer_only(&outer)).map_err(|err| match err {
		DmlError::UnresolvedReference {
			names,
			fragment,
		} => unknown_routine(names.join(", "), fragment),
		DmlError::UnknownTarget {
			kind: ObjectKind::Function,
			name,
			fragment,
		} => unknown_routine(name, fragment),
		err => err,
	})?;

	debug!(expression = %expression, "compiled expression call");
	Ok(CompiledStatement::ProcedureCall(CallStatement {
		target: CallTarget::Expression(expression),
		write_tables: WriteSet::new(),
	}))
}

fn unknown_routine(name: String, fragment: Fragment) -> DmlError {
	DmlError::UnknownTarget {
		kind: ObjectKind::Routine,
		name,
		fragment,
	}
}

#[cfg(test)]
mod tests {
	use tessera_catalog::test_utils::test_catalog;
	use tessera_type::Type;

	use super::*;
	use crate::{
		CompilerConfig,
		compile::compile,
		expression::ParameterExpression,
		range::RangeColumn,
		token::tokenize,
	};

	fn compile_with(
		config: &CompilerConfig,
		variables: Vec<RangeColumn>,
		sql: &str,
	) -> Result<(CallStatement, Vec<RoutineDef>)> {
		let catalog = test_catalog();
		let mut ctx = CompileContext::new(&catalog, config);
		if !variables.is_empty() {
			ctx.declare_variables(variables);
		}
		let mut tokens = TokenStream::new(tokenize(sql)?);
		match compile(&mut ctx, &mut tokens)? {
			CompiledStatement::ProcedureCall(call) => Ok((call, ctx.procedure_calls().to_vec())),
			other => panic!("expected call, got {other:?}"),
		}
	}

	fn compile_sql(sql: &str) -> Result<CallStatement> {
		compile_with(&CompilerConfig::default(), vec![], sql).map(|(call, _)| call)
	}

	#[test]
	fn test_call_records_routine() {
		let (call, calls) = compile_with(&CompilerConfig::default(), vec![], "CALL adjust(1, 2.5)").unwrap();
		let CallTarget::Routine {
			routine,
			arguments,
		} = call.target
		else {
			panic!("expected routine call");
		};
		assert_eq!(routine.name, "adjust");
		assert_eq!(arguments.len(), 2);
		assert_eq!(calls.len(), 1);
	}

	#[test]
	fn test_overload_by_arity() {
		let call = compile_sql("CALL log_event('boot', 2)").unwrap();
		let CallTarget::Routine {
			routine,
			..
		} = call.target
		else {
			panic!("expected routine call");
		};
		assert_eq!(routine.arity(), 2);
	}

	#[test]
	fn test_synonym() {
		let call = compile_sql("CALL bump(1, 2)").unwrap();
		assert!(matches!(call.target, CallTarget::Routine { ref routine, .. } if routine.name == "adjust"));
	}

	#[test]
	fn test_out_argument_parameter() {
		let call = compile_sql("CALL fetch_balance(?, ?)").unwrap();
		let CallTarget::Routine {
			arguments,
			..
		} = call.target
		else {
			panic!("expected routine call");
		};
		assert_eq!(
			arguments[1].kind,
			ExpressionKind::Parameter(ParameterExpression {
				index: 1,
				as_column: true,
				writeable: true,
			})
		);
		assert_eq!(arguments[1].data_type, Some(Type::Decimal));
	}

	#[test]
	fn test_out_argument_variable() {
		let variables = vec![RangeColumn::new("bal", Type::Decimal)];
		let result = compile_with(&CompilerConfig::default(), variables, "CALL fetch_balance(1, bal)");
		assert!(result.is_ok());
	}

	#[test]
	fn test_out_argument_must_be_assignable() {
		let err = compile_sql("CALL fetch_balance(1, 2)").unwrap_err();
		assert!(matches!(
			err,
			DmlError::InvalidOutArgument {
				position: 2,
				..
			}
		));
	}

	#[test]
	fn test_argument_type_mismatch() {
		let err = compile_sql("CALL log_event('boot', 'high')").unwrap_err();
		assert!(matches!(
			err,
			DmlError::ArgumentTypeMismatch {
				position: 2,
				..
			}
		));
	}

	#[test]
	fn test_expression_fallback() {
		let call = compile_sql("CALL upper('x')").unwrap();
		assert!(matches!(call.target, CallTarget::Expression(_)));
	}

	#[test]
	fn test_unknown_routine() {
		let err = compile_sql("CALL nothing(1)").unwrap_err();
		assert!(matches!(
			err,
			DmlError::UnknownTarget {
				kind: ObjectKind::Routine,
				..
			}
		));
	}

	#[test]
	fn test_strict_mode() {
		let config = CompilerConfig {
			strict_procedure_call: true,
			..CompilerConfig::default()
		};
		let err = compile_with(&config, vec![], "CALL upper('x')").unwrap_err();
		assert!(matches!(
			err,
			DmlError::UnknownTarget {
				kind: ObjectKind::Routine,
				..
			}
		));
	}

	#[test]
	fn test_oracle_bracket_less_call() {
		let err = compile_sql("CALL adjust").unwrap_err();
		assert!(matches!(err, DmlError::Syntax { .. }));

		let err = compile_with(&CompilerConfig::oracle(), vec![], "CALL adjust").unwrap_err();
		assert!(matches!(err, DmlError::UnknownTarget { .. }));
	}
}
