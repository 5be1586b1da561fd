use crate::algebra::Operation;
use crate::filter_pushdown::FilterPushdownRule;
use crate::DFResult;
use async_trait::async_trait;
use datafusion::common::tree_node::Transformed;
use rdf_federation_common::QueryContext;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, Instrument};

/// A rewrite of the query algebra.
#[async_trait]
pub trait AlgebraOptimizerRule: Debug + Send + Sync {
    /// Returns the name of the rule.
    fn name(&self) -> &str;

    /// Rewrites `operation`. The rewritten operation must produce the same solutions.
    async fn rewrite(
        &self,
        operation: Operation,
        context: &QueryContext,
    ) -> DFResult<Transformed<Operation>>;
}

/// Applies a list of [AlgebraOptimizerRule]s, in order, to an operation.
#[derive(Debug, Clone)]
pub struct QueryOptimizer {
    rules: Vec<Arc<dyn AlgebraOptimizerRule>>,
}

impl Default for QueryOptimizer {
    fn default() -> Self {
        Self::new(vec![Arc::new(FilterPushdownRule::new())])
    }
}

impl QueryOptimizer {
    /// Creates a new [QueryOptimizer].
    pub fn new(rules: Vec<Arc<dyn AlgebraOptimizerRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Arc<dyn AlgebraOptimizerRule>] {
        &self.rules
    }

    /// Optimizes `operation` by applying all rules.
    ///
    /// The context is handed back unchanged so that it can be passed on to the next stage.
    pub async fn optimize(
        &self,
        operation: Operation,
        context: QueryContext,
    ) -> DFResult<(Operation, QueryContext)> {
        let mut operation = operation;
        for rule in &self.rules {
            let result = rule
                .rewrite(operation, &context)
                .instrument(context.span().clone())
                .await?;
            debug!(
                actor = rule.name(),
                transformed = result.transformed,
                "Applied optimizer rule"
            );
            operation = result.data;
        }
        Ok((operation, context))
    }
}
