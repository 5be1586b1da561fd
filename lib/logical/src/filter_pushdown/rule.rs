use crate::algebra::Operation;
use crate::filter_pushdown::conjunction::{merge_conjunctive_filters, split_conjunctive_filters};
use crate::filter_pushdown::heuristic::{should_attempt_push_down, PushdownCapabilities};
use crate::filter_pushdown::relocation::FilterRelocation;
use crate::filter_pushdown::FILTER_PUSHDOWN;
use crate::optimizer::AlgebraOptimizerRule;
use crate::variables::referenced_variables;
use crate::DFResult;
use async_trait::async_trait;
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_federation_common::{FilterPushdownConfig, QueryContext};
use tracing::debug;

/// An optimizer rule that moves filters as close to the data sources as possible.
///
/// Each pass visits all filters of the operation from top to bottom. For every filter that is
/// worth pushing down, the filter is relocated according to the operation below it. Passes are
/// repeated while a filter moves, at most [FilterPushdownConfig::max_iterations] times.
#[derive(Debug, Default)]
pub struct FilterPushdownRule;

impl FilterPushdownRule {
    /// Creates a new [FilterPushdownRule].
    pub fn new() -> Self {
        Self
    }

    /// Runs a single pass over `operation`.
    fn push_down_pass(
        config: &FilterPushdownConfig,
        capabilities: &PushdownCapabilities,
        operation: Operation,
    ) -> DFResult<Transformed<Operation>> {
        let relocation = FilterRelocation::new(config);
        operation.transform_down(|operation| {
            let Operation::Filter { inner, expression } = operation else {
                return Ok(Transformed::no(operation));
            };

            if !should_attempt_push_down(config, &expression, &inner.sources(), capabilities) {
                return Ok(Transformed::no(Operation::Filter { inner, expression }));
            }

            let variables = referenced_variables(&expression)?;
            Ok(relocation.push_down(&expression, &variables, *inner))
        })
    }
}

#[async_trait]
impl AlgebraOptimizerRule for FilterPushdownRule {
    fn name(&self) -> &str {
        FILTER_PUSHDOWN
    }

    async fn rewrite(
        &self,
        operation: Operation,
        context: &QueryContext,
    ) -> DFResult<Transformed<Operation>> {
        let config = context.filter_pushdown();

        let mut operation = if config.split_conjunctive {
            split_conjunctive_filters(operation)?
        } else {
            Transformed::no(operation)
        };

        let capabilities = PushdownCapabilities::resolve(&operation.data, context).await;

        let mut iterations = 0;
        let mut repeat = true;
        while repeat && iterations < config.max_iterations {
            let result = Self::push_down_pass(config, &capabilities, operation.data)?;
            repeat = result.transformed;
            operation = Transformed::new_transformed(
                result.data,
                operation.transformed || result.transformed,
            );
            iterations += 1;
        }
        if iterations > 1 {
            debug!(actor = FILTER_PUSHDOWN, iterations, "Pushed down filters in multiple passes");
        }

        if config.merge_conjunctive {
            let transformed = operation.transformed;
            operation = merge_conjunctive_filters(operation.data)?;
            operation.transformed |= transformed;
        }

        Ok(operation)
    }
}
