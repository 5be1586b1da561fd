#![doc(test(attr(deny(warnings))))]

//! Contains the physical join operators of RDF Federation and the actors that select them.

extern crate core;

pub mod cache;
pub mod index;
pub mod join;
