//! Indexes that group bindings by the terms bound to a fixed list of variables.

mod strict;
mod undef;

pub use strict::BindingsIndexDef;
pub use undef::BindingsIndexUndef;

use rdf_federation_model::{Binding, Variable};

/// The key component of a variable that is not bound.
///
/// Never clashes with a bound term as all term serializations are non-empty.
pub(crate) const UNDEF_KEY: &str = "";

/// Maps bindings to values based on the terms bound to the key variables.
pub trait BindingsIndex<V>: Send {
    /// Stores `value` under the key of `binding`. Replaces a value with the same key.
    fn put(&mut self, binding: &Binding, value: V);

    /// Returns all values whose key matches the key of `binding`.
    fn get(&self, binding: &Binding) -> Vec<&V>;

    /// Returns the first value whose key matches the key of `binding`.
    ///
    /// If `match_undefs_as_wildcard` is false, unbound variables only match unbound variables.
    fn get_first(&self, binding: &Binding, match_undefs_as_wildcard: bool) -> Option<&V>;

    /// Returns the value with exactly the key of `binding`.
    fn get_exact_mut(&mut self, binding: &Binding) -> Option<&mut V>;
}

/// Creates a [BindingsIndex] over `variables`.
///
/// If `undef_tolerant` is set, unbound variables match any term when looking up values.
pub fn create_bindings_index<V: Send + 'static>(
    variables: Vec<Variable>,
    undef_tolerant: bool,
) -> Box<dyn BindingsIndex<V>> {
    if undef_tolerant {
        Box::new(BindingsIndexUndef::new(variables))
    } else {
        Box::new(BindingsIndexDef::new(variables))
    }
}

/// Computes the key of `binding` for `variables`.
pub(crate) fn binding_key(variables: &[Variable], binding: &Binding) -> Vec<String> {
    variables
        .iter()
        .map(|variable| {
            binding
                .get(variable.as_ref())
                .map_or_else(|| String::from(UNDEF_KEY), ToString::to_string)
        })
        .collect()
}
