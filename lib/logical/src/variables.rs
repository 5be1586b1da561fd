use crate::algebra::Expression;
use rdf_federation_common::error::UnsupportedExpressionError;
use rdf_federation_model::Variable;

/// Returns the free variables referenced by `expression`.
///
/// Existence tests contribute the in-scope variables of their operation. Arguments of extension
/// function calls are not analyzed.
///
/// # Errors
///
/// Returns an error for aggregates and wildcards, as their variables depend on the grouping
/// context.
pub fn expression_variables(
    expression: &Expression,
) -> Result<Vec<Variable>, UnsupportedExpressionError> {
    let mut result = Vec::new();
    collect_expression_variables(expression, false, &mut result)?;
    Ok(result)
}

/// Returns every variable `expression` may read, including the arguments of extension function
/// calls.
///
/// A filter can only be relocated below operations that bind all of these variables.
///
/// # Errors
///
/// Same as [expression_variables].
pub fn referenced_variables(
    expression: &Expression,
) -> Result<Vec<Variable>, UnsupportedExpressionError> {
    let mut result = Vec::new();
    collect_expression_variables(expression, true, &mut result)?;
    Ok(result)
}

fn collect_expression_variables(
    expression: &Expression,
    function_arguments: bool,
    result: &mut Vec<Variable>,
) -> Result<(), UnsupportedExpressionError> {
    match expression {
        Expression::Term(_) => {}
        Expression::NamedFunction { args, .. } => {
            if function_arguments {
                for arg in args {
                    collect_expression_variables(arg, function_arguments, result)?;
                }
            }
        }
        Expression::Variable(variable) => push_unique(result, variable),
        Expression::Operator { args, .. } => {
            for arg in args {
                collect_expression_variables(arg, function_arguments, result)?;
            }
        }
        Expression::Exists { operation, .. } => {
            for variable in &operation.in_scope_variables() {
                push_unique(result, variable);
            }
        }
        Expression::Aggregate { .. } => return Err(UnsupportedExpressionError::Aggregate),
        Expression::Wildcard => return Err(UnsupportedExpressionError::Wildcard),
    }
    Ok(())
}

fn push_unique(result: &mut Vec<Variable>, variable: &Variable) {
    if !result.contains(variable) {
        result.push(variable.clone());
    }
}
