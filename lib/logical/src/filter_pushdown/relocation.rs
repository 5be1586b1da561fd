use crate::algebra::{Expression, Operation};
use crate::filter_pushdown::equality::{pushable_equality, substitute_into_leaf};
use crate::filter_pushdown::FILTER_PUSHDOWN;
use crate::overlap::{classify_overlap, intersects, OverlapPartition};
use datafusion::common::tree_node::Transformed;
use rdf_federation_common::FilterPushdownConfig;
use rdf_federation_model::Variable;
use tracing::debug;

/// Relocates a single filter as deep into an operation as possible.
///
/// The result is [Transformed::yes] if the filter has been moved, removed or absorbed and
/// [Transformed::no] if the operation has only been wrapped in the filter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FilterRelocation<'a> {
    config: &'a FilterPushdownConfig,
}

impl<'a> FilterRelocation<'a> {
    pub(crate) fn new(config: &'a FilterPushdownConfig) -> Self {
        Self { config }
    }

    /// Pushes the filter `expression`, which references `variables`, into `operation`.
    pub(crate) fn push_down(
        self,
        expression: &Expression,
        variables: &[Variable],
        operation: Operation,
    ) -> Transformed<Operation> {
        // No solution can pass the filter.
        if expression.is_false() {
            debug!(actor = FILTER_PUSHDOWN, "Replaced operation filtered by false with an empty union");
            return Transformed::yes(Operation::empty());
        }

        // The result of an existence test depends on the operation it is evaluated on.
        if expression.is_exists() {
            return wrap(operation, expression);
        }

        // Filters without variables are never moved or voided.
        if variables.is_empty() {
            return match operation {
                Operation::Nop => Transformed::yes(Operation::Nop),
                Operation::Union { inputs } if inputs.is_empty() => {
                    Transformed::yes(Operation::empty())
                }
                operation => wrap(operation, expression),
            };
        }

        match operation {
            Operation::Extend {
                inner,
                variable,
                expression: extend_expression,
            } => {
                if variables.contains(&variable) {
                    return wrap(
                        Operation::extend(*inner, variable, extend_expression),
                        expression,
                    );
                }
                let inner = self.push_down(expression, variables, *inner).data;
                Transformed::yes(Operation::extend(inner, variable, extend_expression))
            }
            Operation::Filter {
                inner,
                expression: inner_expression,
            } => {
                let pushed = self.push_down(expression, variables, *inner);
                if pushed.transformed {
                    return Transformed::yes(Operation::filter(pushed.data, inner_expression));
                }

                // Nothing moved. Keep the original order of the stacked filters.
                match pushed.data {
                    Operation::Filter {
                        inner,
                        expression: pushed_expression,
                    } if pushed_expression == *expression => {
                        wrap(Operation::filter(*inner, inner_expression), expression)
                    }
                    inner => Transformed::no(Operation::filter(inner, inner_expression)),
                }
            }
            Operation::Join { inputs } if inputs.is_empty() => {
                wrap(Operation::Join { inputs }, expression)
            }
            Operation::Join { inputs } => self.push_down_join(expression, variables, inputs),
            Operation::Union { inputs } => self.push_down_union(expression, variables, inputs),
            Operation::Project {
                inner,
                variables: projected,
            } => {
                if intersects(&projected, variables) {
                    let inner = self.push_down(expression, variables, *inner).data;
                    return Transformed::yes(Operation::project(inner, projected));
                }
                debug!(actor = FILTER_PUSHDOWN, %expression, "Removed filter on projected variables");
                Transformed::yes(Operation::project(*inner, projected))
            }
            Operation::Values {
                variables: values_variables,
                bindings,
            } => {
                let values = Operation::values(values_variables, bindings);
                if intersects(&values.in_scope_variables(), variables) {
                    return wrap(values, expression);
                }
                debug!(actor = FILTER_PUSHDOWN, %expression, "Removed filter on values without its variables");
                Transformed::yes(values)
            }
            Operation::LeftJoin {
                left,
                right,
                expression: left_join_expression,
            } => {
                if self.config.push_into_left_joins
                    && !intersects(&right.in_scope_variables(), variables)
                {
                    let left = self.push_down(expression, variables, *left).data;
                    return Transformed::yes(Operation::left_join(
                        left,
                        *right,
                        left_join_expression,
                    ));
                }
                wrap(
                    Operation::left_join(*left, *right, left_join_expression),
                    expression,
                )
            }
            leaf @ (Operation::Pattern { .. } | Operation::Path { .. }) => {
                self.push_down_into_leaf(expression, leaf)
            }
            Operation::Nop => Transformed::yes(Operation::Nop),
            operation => wrap(operation, expression),
        }
    }

    fn push_down_join(
        self,
        expression: &Expression,
        variables: &[Variable],
        inputs: Vec<Operation>,
    ) -> Transformed<Operation> {
        let OverlapPartition {
            full,
            partial,
            none,
        } = classify_overlap(inputs, variables);

        let mut groups = Vec::new();
        let mut changed = false;
        if full.is_empty() {
            if !partial.is_empty() {
                groups.push(Operation::filter(
                    Operation::join(partial),
                    expression.clone(),
                ));
            }
        } else {
            changed = true;
            let full = full
                .into_iter()
                .map(|input| self.push_down(expression, variables, input).data)
                .collect();
            groups.push(Operation::join(full));
            // The fully overlapping inputs already enforce the filter on every solution.
            groups.extend(partial);
        }
        groups.extend(none);

        changed |= groups.len() > 1;
        if changed {
            debug!(actor = FILTER_PUSHDOWN, %expression, "Pushed filter into join inputs");
        }
        Transformed::new_transformed(Operation::join(groups), changed)
    }

    fn push_down_union(
        self,
        expression: &Expression,
        variables: &[Variable],
        inputs: Vec<Operation>,
    ) -> Transformed<Operation> {
        if inputs.is_empty() {
            return Transformed::yes(Operation::empty());
        }

        let OverlapPartition {
            full,
            partial,
            none,
        } = classify_overlap(inputs, variables);

        let mut groups = Vec::new();
        let mut changed = false;
        if !full.is_empty() {
            changed = true;
            let full = full
                .into_iter()
                .map(|input| self.push_down(expression, variables, input).data)
                .collect();
            groups.push(Operation::union(full));
        }
        if !partial.is_empty() {
            groups.push(Operation::filter(
                Operation::union(partial),
                expression.clone(),
            ));
        }
        groups.extend(none);

        changed |= groups.len() > 1;
        if changed {
            debug!(actor = FILTER_PUSHDOWN, %expression, "Pushed filter into union inputs");
        }
        Transformed::new_transformed(Operation::union(groups), changed)
    }

    fn push_down_into_leaf(self, expression: &Expression, leaf: Operation) -> Transformed<Operation> {
        if !self.config.push_equality_into_patterns {
            return wrap(leaf, expression);
        }

        let Some((variable, term)) = pushable_equality(expression) else {
            return wrap(leaf, expression);
        };
        if !leaf.in_scope_variables().contains(variable) {
            return wrap(leaf, expression);
        }

        match substitute_into_leaf(&leaf, variable, term) {
            Some(substituted) => {
                debug!(actor = FILTER_PUSHDOWN, %expression, "Pushed equality into pattern");
                Transformed::yes(Operation::join(vec![
                    substituted,
                    Operation::values(vec![variable.clone()], vec![vec![Some(term.clone())]]),
                ]))
            }
            None => wrap(leaf, expression),
        }
    }
}

fn wrap(operation: Operation, expression: &Expression) -> Transformed<Operation> {
    Transformed::no(Operation::filter(operation, expression.clone()))
}
