use crate::DFResult;
use datafusion::error::DataFusionError;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use rdf_federation_model::BindingsMetadata;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type SharedMetadataFuture =
    Shared<BoxFuture<'static, Result<BindingsMetadata, Arc<DataFusionError>>>>;

/// Lazily resolves the [BindingsMetadata] of a stream.
///
/// The metadata is computed at most once. All clones of an accessor share the result, including
/// an error.
#[derive(Clone)]
pub struct MetadataAccessor {
    future: SharedMetadataFuture,
}

impl MetadataAccessor {
    /// Creates a new [MetadataAccessor] that resolves the metadata by running `future`.
    pub fn new(future: impl Future<Output = DFResult<BindingsMetadata>> + Send + 'static) -> Self {
        Self {
            future: future.map(|result| result.map_err(Arc::new)).boxed().shared(),
        }
    }

    /// Creates a new [MetadataAccessor] for already known `metadata`.
    pub fn ready(metadata: BindingsMetadata) -> Self {
        Self::new(async move { Ok(metadata) })
    }

    /// Returns the metadata.
    ///
    /// Errors are shared between all callers and are therefore wrapped in
    /// [DataFusionError::Shared].
    pub async fn get(&self) -> DFResult<BindingsMetadata> {
        self.future.clone().await.map_err(DataFusionError::Shared)
    }
}

impl Debug for MetadataAccessor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataAccessor")
            .field("resolved", &self.future.peek().is_some())
            .finish()
    }
}
