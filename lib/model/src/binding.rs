use crate::{Term, Variable, VariableRef};
use std::fmt::{Display, Formatter};

/// A single solution of a query: a partial mapping from [Variable]s to [Term]s.
///
/// Variables that are not contained in the binding are *unbound*. Unbound is an open-world
/// absence and not a special value. A binding never maps a variable to more than one term.
///
/// Bindings are immutable values. Operations that "modify" a binding return a new one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    /// The entries of the binding, sorted by variable name.
    entries: Vec<(Variable, Term)>,
}

impl Binding {
    /// Creates an empty [Binding].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the term bound to `variable`, if any.
    pub fn get(&self, variable: VariableRef<'_>) -> Option<&Term> {
        self.position(variable.as_str())
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Returns whether `variable` is bound.
    pub fn contains(&self, variable: VariableRef<'_>) -> bool {
        self.position(variable.as_str()).is_ok()
    }

    /// Returns a new binding that additionally maps `variable` to `term`. An existing value
    /// for `variable` is replaced.
    #[must_use]
    pub fn with(&self, variable: Variable, term: Term) -> Self {
        let mut entries = self.entries.clone();
        match self.position(variable.as_str()) {
            Ok(idx) => entries[idx].1 = term,
            Err(idx) => entries.insert(idx, (variable, term)),
        }
        Self { entries }
    }

    /// Returns a new binding without `variable`.
    #[must_use]
    pub fn without(&self, variable: VariableRef<'_>) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(v, _)| v.as_str() != variable.as_str())
            .cloned()
            .collect();
        Self { entries }
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all bound variables and their terms, ordered by variable name.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.entries.iter().map(|(v, t)| (v, t))
    }

    /// Iterates over all bound variables.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.entries.iter().map(|(v, _)| v)
    }

    /// Returns whether the two bindings agree on every variable that both of them bind.
    ///
    /// A variable that is unbound in one of the bindings never causes a conflict.
    pub fn is_compatible(&self, other: &Binding) -> bool {
        self.entries.iter().all(|(variable, term)| {
            other
                .get(variable.as_ref())
                .map_or(true, |other_term| other_term == term)
        })
    }

    /// Merges two bindings.
    ///
    /// The result contains the union of both mappings. Returns [None] if a variable is bound to
    /// different terms in `self` and `other`.
    pub fn merge(&self, other: &Binding) -> Option<Binding> {
        let mut entries = Vec::with_capacity(self.entries.len() + other.entries.len());
        let mut lhs = self.entries.iter().peekable();
        let mut rhs = other.entries.iter().peekable();

        loop {
            match (lhs.peek(), rhs.peek()) {
                (Some((lv, lt)), Some((rv, rt))) => match lv.as_str().cmp(rv.as_str()) {
                    std::cmp::Ordering::Less => {
                        entries.push((lv.clone(), lt.clone()));
                        lhs.next();
                    }
                    std::cmp::Ordering::Greater => {
                        entries.push((rv.clone(), rt.clone()));
                        rhs.next();
                    }
                    std::cmp::Ordering::Equal => {
                        if lt != rt {
                            return None;
                        }
                        entries.push((lv.clone(), lt.clone()));
                        lhs.next();
                        rhs.next();
                    }
                },
                (Some(_), None) => {
                    entries.extend(lhs.cloned());
                    break;
                }
                (None, Some(_)) => {
                    entries.extend(rhs.cloned());
                    break;
                }
                (None, None) => break,
            }
        }

        Some(Self { entries })
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(variable, _)| variable.as_str().cmp(name))
    }
}

impl FromIterator<(Variable, Term)> for Binding {
    fn from_iter<T: IntoIterator<Item = (Variable, Term)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Binding::new(), |binding, (variable, term)| {
                binding.with(variable, term)
            })
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (idx, (variable, term)) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{variable} -> {term}")?;
        }
        f.write_str("}")
    }
}
