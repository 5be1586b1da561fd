use crate::{ExtensionFunctionRegistry, FilterPushdownConfig, JoinCostWeights};
use std::sync::Arc;
use tracing::Span;

/// Holds the configuration of a single query.
///
/// The context is passed explicitly through the optimizer and the join mediator. Every
/// component reads the part of the configuration it needs.
#[derive(Clone, Debug)]
pub struct QueryContext {
    filter_pushdown: FilterPushdownConfig,
    join_cost_weights: JoinCostWeights,
    /// The engine's extension functions. Filters referencing extension functions are never pushed
    /// down if no registry is present.
    extension_functions: Option<Arc<dyn ExtensionFunctionRegistry>>,
    /// The span in which the query is processed.
    span: Span,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self {
            filter_pushdown: FilterPushdownConfig::default(),
            join_cost_weights: JoinCostWeights::default(),
            extension_functions: None,
            span: Span::none(),
        }
    }
}

impl QueryContext {
    pub fn filter_pushdown(&self) -> &FilterPushdownConfig {
        &self.filter_pushdown
    }

    pub fn join_cost_weights(&self) -> &JoinCostWeights {
        &self.join_cost_weights
    }

    pub fn extension_functions(&self) -> Option<&Arc<dyn ExtensionFunctionRegistry>> {
        self.extension_functions.as_ref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    #[must_use]
    pub fn with_filter_pushdown(mut self, filter_pushdown: FilterPushdownConfig) -> Self {
        self.filter_pushdown = filter_pushdown;
        self
    }

    #[must_use]
    pub fn with_join_cost_weights(mut self, join_cost_weights: JoinCostWeights) -> Self {
        self.join_cost_weights = join_cost_weights;
        self
    }

    #[must_use]
    pub fn with_extension_functions(
        mut self,
        extension_functions: Arc<dyn ExtensionFunctionRegistry>,
    ) -> Self {
        self.extension_functions = Some(extension_functions);
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
