use crate::DFResult;
use async_trait::async_trait;
use rdf_federation_model::{NamedNode, Term};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type ExtensionFunctionImpl = dyn Fn(&[Term]) -> Option<Term> + Send + Sync;

/// A user-provided function that is referenced in a query by its IRI.
#[derive(Clone)]
pub struct ExtensionFunction {
    name: NamedNode,
    implementation: Arc<ExtensionFunctionImpl>,
}

impl ExtensionFunction {
    /// Creates a new [ExtensionFunction].
    pub fn new(
        name: NamedNode,
        implementation: impl Fn(&[Term]) -> Option<Term> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            implementation: Arc::new(implementation),
        }
    }

    pub fn name(&self) -> &NamedNode {
        &self.name
    }

    /// Evaluates the function. Returns [None] if the function raises an evaluation error.
    pub fn invoke(&self, args: &[Term]) -> Option<Term> {
        (self.implementation)(args)
    }
}

impl Debug for ExtensionFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolves the extension functions known to the engine.
#[async_trait]
pub trait ExtensionFunctionRegistry: Debug + Send + Sync {
    /// Returns the function with the given `name`, if the engine knows it.
    async fn resolve(&self, name: &NamedNode) -> DFResult<Option<ExtensionFunction>>;
}

/// An in-memory [ExtensionFunctionRegistry].
#[derive(Debug, Default, Clone)]
pub struct ExtensionFunctionTable {
    functions: HashMap<NamedNode, ExtensionFunction>,
}

impl ExtensionFunctionTable {
    /// Creates an empty [ExtensionFunctionTable].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function`. Replaces a function with the same name.
    pub fn register(&mut self, function: ExtensionFunction) {
        self.functions.insert(function.name().clone(), function);
    }

    #[must_use]
    pub fn with_function(mut self, function: ExtensionFunction) -> Self {
        self.register(function);
        self
    }
}

#[async_trait]
impl ExtensionFunctionRegistry for ExtensionFunctionTable {
    async fn resolve(&self, name: &NamedNode) -> DFResult<Option<ExtensionFunction>> {
        Ok(self.functions.get(name).cloned())
    }
}
