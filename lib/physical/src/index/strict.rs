use crate::index::{binding_key, BindingsIndex};
use rdf_federation_model::{Binding, Variable};
use rustc_hash::FxHashMap;

/// A [BindingsIndex] that requires all key components to be equal.
///
/// Unbound variables are only equal to unbound variables.
#[derive(Debug, Clone)]
pub struct BindingsIndexDef<V> {
    variables: Vec<Variable>,
    values: FxHashMap<Vec<String>, V>,
}

impl<V> BindingsIndexDef<V> {
    /// Creates an empty [BindingsIndexDef] keyed over `variables`.
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            values: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Send> BindingsIndex<V> for BindingsIndexDef<V> {
    fn put(&mut self, binding: &Binding, value: V) {
        self.values
            .insert(binding_key(&self.variables, binding), value);
    }

    fn get(&self, binding: &Binding) -> Vec<&V> {
        self.get_first(binding, false).into_iter().collect()
    }

    fn get_first(&self, binding: &Binding, _match_undefs_as_wildcard: bool) -> Option<&V> {
        self.values.get(&binding_key(&self.variables, binding))
    }

    fn get_exact_mut(&mut self, binding: &Binding) -> Option<&mut V> {
        self.values.get_mut(&binding_key(&self.variables, binding))
    }
}
