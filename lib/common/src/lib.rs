extern crate core;

mod config;
mod context;
pub mod error;
mod functions;
mod metadata;
mod shape;
mod source;
mod stream;

pub use config::{FilterPushdownConfig, JoinCostWeights};
pub use context::QueryContext;
pub use functions::{ExtensionFunction, ExtensionFunctionRegistry, ExtensionFunctionTable};
pub use metadata::MetadataAccessor;
pub use shape::{OperationKind, SelectorShape, ShapeOperation};
pub use source::{QuerySource, SourceAnnotation, StaticQuerySource};
pub use stream::BindingsStream;

pub type DFResult<T> = datafusion::error::Result<T>;
