use datafusion::error::DataFusionError;

/// An error returned when the variables of an expression cannot be determined statically.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UnsupportedExpressionError {
    /// Aggregates are only valid in a grouping context and are never pushed into filters.
    #[error("Can not determine the variables of an aggregate expression")]
    Aggregate,
    /// The wildcard (`*`) does not reference a fixed set of variables.
    #[error("Can not determine the variables of a wildcard expression")]
    Wildcard,
}

impl From<UnsupportedExpressionError> for DataFusionError {
    #[inline]
    fn from(error: UnsupportedExpressionError) -> Self {
        Self::External(Box::new(error))
    }
}

/// The reason why a join actor rejected a join action.
///
/// Returned before any input stream is polled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum JoinPrecheckError {
    #[error("Actor {actor} can only join {expected} entries, got {actual}")]
    EntryCount {
        actor: String,
        expected: usize,
        actual: usize,
    },
    #[error("Actor {actor} can not join streams containing undefs")]
    Undefs { actor: String },
    #[error("Actor {actor} can only join entries with at least one common variable")]
    NoSharedVariables { actor: String },
    #[error("Actor {actor} can only handle logical join type 'inner', got '{join_type}'")]
    UnsupportedJoinType { actor: String, join_type: String },
}

/// An error related to selecting and running a join.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JoinError {
    #[error(transparent)]
    Precheck(#[from] JoinPrecheckError),
    /// The metadata of an input stream could not be resolved.
    #[error("Could not obtain the metadata of a join entry: {0}")]
    Metadata(#[source] DataFusionError),
    /// No registered actor accepted the join action. Contains the reason of every actor.
    #[error("No join actor can handle the join action: {}", join_reasons(.0))]
    NoApplicableActor(Vec<JoinPrecheckError>),
}

fn join_reasons(reasons: &[JoinPrecheckError]) -> String {
    if reasons.is_empty() {
        return String::from("no actors registered");
    }

    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<JoinError> for DataFusionError {
    #[inline]
    fn from(error: JoinError) -> Self {
        match error {
            JoinError::Metadata(error) => error,
            error => Self::External(Box::new(error)),
        }
    }
}
