use crate::DFResult;
use futures::Stream;
use rdf_federation_model::Binding;
use std::pin::Pin;

/// A stream of [Binding]s that can be sent between threads.
///
/// An error terminates the stream.
pub type BindingsStream = Pin<Box<dyn Stream<Item = DFResult<Binding>> + Send>>;
