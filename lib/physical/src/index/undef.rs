use crate::index::{binding_key, BindingsIndex, UNDEF_KEY};
use rdf_federation_model::{Binding, Variable};
use rustc_hash::FxHashMap;

/// A [BindingsIndex] in which unbound variables act as wildcards.
///
/// Values are stored in a trie with one level per key variable. An unbound variable matches every
/// term, both in stored bindings and in the bindings used for looking up values.
#[derive(Debug, Clone)]
pub struct BindingsIndexUndef<V> {
    variables: Vec<Variable>,
    root: TrieNode<V>,
}

#[derive(Debug, Clone)]
struct TrieNode<V> {
    children: FxHashMap<String, TrieNode<V>>,
    /// Only set on the nodes at the depth of the key length.
    value: Option<V>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            children: FxHashMap::default(),
            value: None,
        }
    }
}

impl<V> BindingsIndexUndef<V> {
    /// Creates an empty [BindingsIndexUndef] keyed over `variables`.
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            root: TrieNode::default(),
        }
    }
}

impl<V> TrieNode<V> {
    fn collect<'a>(&'a self, key: &[String], result: &mut Vec<&'a V>) {
        let Some((head, tail)) = key.split_first() else {
            result.extend(self.value.as_ref());
            return;
        };

        if head == UNDEF_KEY {
            for child in self.children.values() {
                child.collect(tail, result);
            }
            return;
        }

        if let Some(child) = self.children.get(head) {
            child.collect(tail, result);
        }
        if let Some(child) = self.children.get(UNDEF_KEY) {
            child.collect(tail, result);
        }
    }

    fn find_first(&self, key: &[String]) -> Option<&V> {
        let Some((head, tail)) = key.split_first() else {
            return self.value.as_ref();
        };

        if head == UNDEF_KEY {
            return self.children.values().find_map(|child| child.find_first(tail));
        }

        self.children
            .get(head)
            .and_then(|child| child.find_first(tail))
            .or_else(|| {
                self.children
                    .get(UNDEF_KEY)
                    .and_then(|child| child.find_first(tail))
            })
    }

    fn find_exact(&self, key: &[String]) -> Option<&V> {
        match key.split_first() {
            None => self.value.as_ref(),
            Some((head, tail)) => self.children.get(head)?.find_exact(tail),
        }
    }

    fn find_exact_mut(&mut self, key: &[String]) -> Option<&mut V> {
        match key.split_first() {
            None => self.value.as_mut(),
            Some((head, tail)) => self.children.get_mut(head)?.find_exact_mut(tail),
        }
    }
}

impl<V: Send> BindingsIndex<V> for BindingsIndexUndef<V> {
    fn put(&mut self, binding: &Binding, value: V) {
        let key = binding_key(&self.variables, binding);
        let node = key.into_iter().fold(&mut self.root, |node, component| {
            node.children.entry(component).or_default()
        });
        node.value = Some(value);
    }

    fn get(&self, binding: &Binding) -> Vec<&V> {
        let mut result = Vec::new();
        self.root
            .collect(&binding_key(&self.variables, binding), &mut result);
        result
    }

    fn get_first(&self, binding: &Binding, match_undefs_as_wildcard: bool) -> Option<&V> {
        let key = binding_key(&self.variables, binding);
        if match_undefs_as_wildcard {
            self.root.find_first(&key)
        } else {
            self.root.find_exact(&key)
        }
    }

    fn get_exact_mut(&mut self, binding: &Binding) -> Option<&mut V> {
        self.root
            .find_exact_mut(&binding_key(&self.variables, binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::{binding, variables};

    #[test]
    fn test_unbound_lookup_matches_all() {
        let mut index = BindingsIndexUndef::new(variables(&["a", "b"]));
        index.put(&binding(&[("a", "1"), ("b", "2")]), 1);
        index.put(&binding(&[("a", "3"), ("b", "2")]), 2);
        index.put(&binding(&[("a", "3"), ("b", "4")]), 3);

        let mut values = index.get(&binding(&[("b", "2")]));
        values.sort();
        assert_eq!(values, vec![&1, &2]);
    }

    #[test]
    fn test_unbound_entry_matches_every_lookup() {
        let mut index = BindingsIndexUndef::new(variables(&["a", "b"]));
        index.put(&binding(&[("b", "2")]), 1);
        index.put(&binding(&[("a", "1"), ("b", "2")]), 2);

        let mut values = index.get(&binding(&[("a", "1"), ("b", "2")]));
        values.sort();
        assert_eq!(values, vec![&1, &2]);
        assert_eq!(index.get(&binding(&[("a", "5"), ("b", "2")])), vec![&1]);
        assert!(index.get(&binding(&[("a", "1"), ("b", "3")])).is_empty());
    }

    #[test]
    fn test_all_unbound_entry_matches_everything() {
        let mut index = BindingsIndexUndef::new(variables(&["a", "b"]));
        index.put(&binding(&[]), 1);

        assert_eq!(index.get(&binding(&[("a", "1"), ("b", "2")])), vec![&1]);
        assert_eq!(index.get(&binding(&[])), vec![&1]);
    }

    #[test]
    fn test_get_first() {
        let mut index = BindingsIndexUndef::new(variables(&["a"]));
        index.put(&binding(&[]), 1);

        assert_eq!(index.get_first(&binding(&[("a", "1")]), true), Some(&1));
        assert_eq!(index.get_first(&binding(&[("a", "1")]), false), None);
        assert_eq!(index.get_first(&binding(&[]), false), Some(&1));
    }

    #[test]
    fn test_empty_key() {
        let mut index = BindingsIndexUndef::new(Vec::new());
        index.put(&binding(&[("a", "1")]), 1);

        assert_eq!(index.get(&binding(&[("b", "2")])), vec![&1]);
        assert_eq!(index.get_exact_mut(&binding(&[])), Some(&mut 1));
    }
}
