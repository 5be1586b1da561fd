use crate::algebra::{Expression, Operation, Operator};
use crate::DFResult;
use datafusion::common::tree_node::{Transformed, TreeNode};

/// Splits every filter on a conjunction into stacked filters, one per conjunct.
///
/// `FILTER(A && B && C)` becomes `FILTER(A)` on top of `FILTER(B)` on top of `FILTER(C)`.
pub(crate) fn split_conjunctive_filters(operation: Operation) -> DFResult<Transformed<Operation>> {
    operation.transform_down(|operation| {
        Ok(match operation {
            Operation::Filter { inner, expression } if expression.as_conjunction().is_some() => {
                let mut conjuncts = Vec::new();
                collect_conjuncts(expression, &mut conjuncts);
                let result = conjuncts
                    .into_iter()
                    .rev()
                    .fold(*inner, Operation::filter);
                Transformed::yes(result)
            }
            operation => Transformed::no(operation),
        })
    })
}

fn collect_conjuncts(expression: Expression, result: &mut Vec<Expression>) {
    match expression {
        Expression::Operator { operator, mut args }
            if operator == Operator::And && args.len() == 2 =>
        {
            let rhs = args.pop();
            let lhs = args.pop();
            for conjunct in [lhs, rhs].into_iter().flatten() {
                collect_conjuncts(conjunct, result);
            }
        }
        expression => result.push(expression),
    }
}

/// Merges stacked filters into a single filter on the conjunction of their expressions.
///
/// The conjunction is right-associated and keeps the order of the filters from top to bottom.
pub(crate) fn merge_conjunctive_filters(operation: Operation) -> DFResult<Transformed<Operation>> {
    operation.transform_down(|operation| {
        Ok(match operation {
            Operation::Filter { inner, expression } if matches!(*inner, Operation::Filter { .. }) => {
                let mut expressions = vec![expression];
                let mut current = *inner;
                while let Operation::Filter { inner, expression } = current {
                    expressions.push(expression);
                    current = *inner;
                }

                let conjunction = expressions
                    .into_iter()
                    .rev()
                    .reduce(|rhs, lhs| Expression::and(lhs, rhs));
                match conjunction {
                    Some(conjunction) => Transformed::yes(Operation::filter(current, conjunction)),
                    None => Transformed::no(current),
                }
            }
            operation => Transformed::no(operation),
        })
    })
}
