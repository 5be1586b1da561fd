use crate::Variable;
use std::fmt::{Display, Formatter};

/// Indicates whether a [Cardinality] is known precisely or only estimated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardinalityKind {
    /// The stream produces exactly this many bindings.
    Exact,
    /// The value is an estimate (possibly an upper bound).
    Estimate,
}

/// The (estimated) number of bindings in a stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cardinality {
    kind: CardinalityKind,
    value: f64,
}

impl Cardinality {
    /// Creates an exact [Cardinality].
    pub fn exact(value: f64) -> Self {
        Self {
            kind: CardinalityKind::Exact,
            value,
        }
    }

    /// Creates an estimated [Cardinality].
    pub fn estimate(value: f64) -> Self {
        Self {
            kind: CardinalityKind::Estimate,
            value,
        }
    }

    /// Returns whether the cardinality is exact or an estimate.
    pub fn kind(&self) -> CardinalityKind {
        self.kind
    }

    /// Returns the numeric value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CardinalityKind::Exact => write!(f, "{}", self.value),
            CardinalityKind::Estimate => write!(f, "~{}", self.value),
        }
    }
}

/// A variable of a bindings stream's schema.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetadataVariable {
    /// The variable.
    pub variable: Variable,
    /// Whether some bindings of the stream may leave `variable` unbound.
    pub can_be_undef: bool,
}

impl MetadataVariable {
    /// Creates a new [MetadataVariable].
    pub fn new(variable: Variable, can_be_undef: bool) -> Self {
        Self {
            variable,
            can_be_undef,
        }
    }
}

/// Describes a stream of bindings: its schema and its cardinality.
///
/// Optionally, the metadata also holds the timing information of the source that produces the
/// stream. It is used for estimating the cost of join strategies.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingsMetadata {
    cardinality: Cardinality,
    variables: Vec<MetadataVariable>,
    /// The time (in milliseconds) a single request to the source takes.
    request_time: Option<f64>,
    /// The number of bindings the source returns per request.
    page_size: Option<usize>,
}

impl BindingsMetadata {
    /// Creates a new [BindingsMetadata].
    pub fn new(cardinality: Cardinality, variables: Vec<MetadataVariable>) -> Self {
        Self {
            cardinality,
            variables,
            request_time: None,
            page_size: None,
        }
    }

    /// Sets the time a single request to the source takes.
    #[must_use]
    pub fn with_request_time(mut self, request_time: f64) -> Self {
        self.request_time = Some(request_time);
        self
    }

    /// Sets the number of bindings the source returns per request.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn variables(&self) -> &[MetadataVariable] {
        &self.variables
    }

    pub fn request_time(&self) -> Option<f64> {
        self.request_time
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    /// Returns whether any variable of the schema may be unbound.
    pub fn contains_undefs(&self) -> bool {
        self.variables.iter().any(|v| v.can_be_undef)
    }

    /// Returns whether `variable` is part of the schema.
    pub fn has_variable(&self, variable: &Variable) -> bool {
        self.variables.iter().any(|v| &v.variable == variable)
    }

    /// The time spent before the first binding arrives.
    ///
    /// Paged sources pay their request time per page, so it is attributed to the items instead.
    pub fn request_initial_time(&self) -> f64 {
        match self.page_size {
            Some(_) => 0.0,
            None => self.request_time.unwrap_or(0.0),
        }
    }

    /// The time spent per binding.
    #[allow(clippy::cast_precision_loss, reason = "Page sizes are small")]
    pub fn request_item_time(&self) -> f64 {
        match self.page_size {
            Some(page_size) if page_size > 0 => {
                self.request_time.unwrap_or(0.0) / page_size as f64
            }
            _ => 0.0,
        }
    }

    /// Returns the variables that occur in the schemas of all `metadatas`, in the order of the
    /// first schema.
    pub fn overlapping_variables(metadatas: &[BindingsMetadata]) -> Vec<Variable> {
        let Some((first, rest)) = metadatas.split_first() else {
            return Vec::new();
        };

        first
            .variables
            .iter()
            .map(|v| &v.variable)
            .filter(|variable| rest.iter().all(|m| m.has_variable(variable)))
            .cloned()
            .collect()
    }

    /// Computes the schema of the join of the given streams.
    ///
    /// The schema is the union of all schemas. A variable may be unbound in the result if it may
    /// be unbound in any of the inputs that contain it.
    pub fn join_variables(metadatas: &[BindingsMetadata]) -> Vec<MetadataVariable> {
        let mut result: Vec<MetadataVariable> = Vec::new();
        for variable in metadatas.iter().flat_map(|m| m.variables.iter()) {
            match result.iter_mut().find(|v| v.variable == variable.variable) {
                Some(existing) => existing.can_be_undef |= variable.can_be_undef,
                None => result.push(variable.clone()),
            }
        }
        result
    }
}
