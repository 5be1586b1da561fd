//! The entry point of RDF Federation.
//!
//! A [QueryEngine] optimizes query algebra before it is sent to the sources and joins the
//! bindings streams returned by the sources.

extern crate core;

mod engine;

pub use engine::QueryEngine;

type DFResult<T> = datafusion::error::Result<T>;
