use crate::join::{HashJoinActor, JoinAction, JoinActionMetadata, JoinActor, JoinOutput};
use rdf_federation_common::error::JoinError;
use rdf_federation_common::QueryContext;
use std::sync::Arc;
use tracing::debug;

/// Selects the cheapest [JoinActor] for a [JoinAction] and runs it.
///
/// The cost of an actor is derived from its join coefficients and the
/// [JoinCostWeights](rdf_federation_common::JoinCostWeights) of the query context. If several
/// actors have the same cost, the first registered one wins.
#[derive(Debug, Clone)]
pub struct JoinMediator {
    actors: Vec<Arc<dyn JoinActor>>,
}

impl JoinMediator {
    /// Creates a new [JoinMediator] over `actors`.
    pub fn new(actors: Vec<Arc<dyn JoinActor>>) -> Self {
        Self { actors }
    }

    pub fn actors(&self) -> &[Arc<dyn JoinActor>] {
        &self.actors
    }

    /// Selects the actor for the action described by `action` without running it.
    pub async fn select(
        &self,
        action: &JoinActionMetadata,
        context: &QueryContext,
    ) -> Result<&Arc<dyn JoinActor>, JoinError> {
        let weights = context.join_cost_weights();
        let mut reasons = Vec::new();
        let mut best: Option<(&Arc<dyn JoinActor>, f64)> = None;

        for actor in &self.actors {
            match actor.test(action, context).await {
                Ok(coefficients) => {
                    let cost = coefficients.cost(weights);
                    debug!(actor = actor.name(), cost, ?coefficients, "Join actor accepted action");
                    if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                        best = Some((actor, cost));
                    }
                }
                Err(JoinError::Precheck(reason)) => {
                    debug!(actor = actor.name(), %reason, "Join actor rejected action");
                    reasons.push(reason);
                }
                Err(error) => return Err(error),
            }
        }

        best.map(|(actor, _)| actor)
            .ok_or(JoinError::NoApplicableActor(reasons))
    }

    /// Joins the entries of `action` with the cheapest applicable actor.
    pub async fn mediate(
        &self,
        action: JoinAction,
        context: &QueryContext,
    ) -> Result<JoinOutput, JoinError> {
        let actor = self.select(&action.metadata(), context).await?;
        actor.run(action, context).await
    }
}

impl Default for JoinMediator {
    fn default() -> Self {
        Self::new(vec![
            Arc::new(HashJoinActor::strict()),
            Arc::new(HashJoinActor::undef_tolerant()),
        ])
    }
}
