use crate::join::{JoinAction, JoinActionMetadata, JoinCoefficients, JoinOutput};
use async_trait::async_trait;
use rdf_federation_common::error::JoinError;
use rdf_federation_common::QueryContext;
use std::fmt::Debug;

/// A strategy for executing joins.
#[async_trait]
pub trait JoinActor: Debug + Send + Sync {
    /// Returns the name of the actor.
    fn name(&self) -> &str;

    /// Checks whether the actor can execute an action and estimates the cost of doing so.
    async fn test(
        &self,
        action: &JoinActionMetadata,
        context: &QueryContext,
    ) -> Result<JoinCoefficients, JoinError>;

    /// Executes `action`.
    async fn run(&self, action: JoinAction, context: &QueryContext)
        -> Result<JoinOutput, JoinError>;
}
