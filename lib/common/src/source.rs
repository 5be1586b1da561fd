use crate::{DFResult, QueryContext, SelectorShape};
use async_trait::async_trait;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A data source that answers parts of a federated query.
///
/// Only the capabilities of a source are relevant for optimizing a query. Retrieving data from
/// the source happens outside of this crate.
#[async_trait]
pub trait QuerySource: Debug + Send + Sync {
    /// Returns the name of the source. Two sources with the same name are considered equal.
    fn name(&self) -> &str;

    /// Returns the shape of the requests that this source can answer.
    async fn selector_shape(&self, context: &QueryContext) -> DFResult<SelectorShape>;
}

/// Associates a leaf of the query algebra with the source that must answer it.
#[derive(Clone, Debug)]
pub struct SourceAnnotation(Arc<dyn QuerySource>);

impl SourceAnnotation {
    /// Creates a new [SourceAnnotation].
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self(source)
    }

    /// Returns the name of the annotated source.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Returns the annotated source.
    pub fn source(&self) -> &Arc<dyn QuerySource> {
        &self.0
    }
}

impl PartialEq for SourceAnnotation {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for SourceAnnotation {}

impl Hash for SourceAnnotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl Display for SourceAnnotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.name())
    }
}

/// A [QuerySource] with a fixed [SelectorShape].
#[derive(Debug, Clone)]
pub struct StaticQuerySource {
    name: String,
    shape: SelectorShape,
}

impl StaticQuerySource {
    /// Creates a new [StaticQuerySource].
    pub fn new(name: impl Into<String>, shape: SelectorShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Returns a [SourceAnnotation] that refers to this source.
    pub fn into_annotation(self) -> SourceAnnotation {
        SourceAnnotation::new(Arc::new(self))
    }
}

#[async_trait]
impl QuerySource for StaticQuerySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn selector_shape(&self, _context: &QueryContext) -> DFResult<SelectorShape> {
        Ok(self.shape.clone())
    }
}
