use crate::DFResult;
use rdf_federation_common::error::JoinError;
use rdf_federation_common::QueryContext;
use rdf_federation_logical::algebra::Operation;
use rdf_federation_logical::QueryOptimizer;
use rdf_federation_physical::join::{JoinAction, JoinMediator, JoinOutput};
use tracing::{debug, Instrument};

/// Represents an instance of a federated query engine.
///
/// An engine consists of:
/// - A [QueryOptimizer] that rewrites the algebra of a query. By default, it pushes filters
///   towards the sources.
/// - A [JoinMediator] that selects and runs a join strategy for the bindings streams of the
///   sources. By default, it knows the strict and the undef-tolerant hash join.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    optimizer: QueryOptimizer,
    mediator: JoinMediator,
}

impl QueryEngine {
    /// Creates a new [QueryEngine] from its components.
    pub fn new(optimizer: QueryOptimizer, mediator: JoinMediator) -> Self {
        Self {
            optimizer,
            mediator,
        }
    }

    pub fn optimizer(&self) -> &QueryOptimizer {
        &self.optimizer
    }

    pub fn mediator(&self) -> &JoinMediator {
        &self.mediator
    }

    /// Optimizes `operation` with all rules of the optimizer.
    pub async fn optimize(
        &self,
        operation: Operation,
        context: QueryContext,
    ) -> DFResult<(Operation, QueryContext)> {
        debug!(%operation, "Optimizing operation");
        self.optimizer.optimize(operation, context).await
    }

    /// Joins the entries of `action` with the cheapest applicable join actor.
    pub async fn join(
        &self,
        action: JoinAction,
        context: &QueryContext,
    ) -> Result<JoinOutput, JoinError> {
        let span = context.span().clone();
        self.mediator.mediate(action, context).instrument(span).await
    }
}
