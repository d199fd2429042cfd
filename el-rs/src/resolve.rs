//! Name resolution.
//!
//! The parser hands every free identifier to a [`Resolver`] exactly once and
//! stores what comes back in the tree.  Evaluation then talks only to the
//! returned [`Variable`]; the resolver is never consulted again.
//!
//! [`Bindings`] is a ready-made resolver over a shared variable map.  Values
//! can be changed between evaluations and every tree parsed against the
//! bindings observes the change.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::EvalError;
use crate::function::{FunctionCache, FunctionProvider};
use crate::value::Value;

/// A resolved identifier.
pub trait Variable: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self) -> Result<Value, EvalError>;

    fn set(&self, _value: Value) -> Result<(), EvalError> {
        Err(EvalError::Assign {
            target: self.name().to_owned(),
        })
    }
}

/// Shared handle to a resolved identifier, as stored in the tree.
#[derive(Clone)]
pub struct VariableRef(Arc<dyn Variable>);

impl VariableRef {
    pub fn new(var: impl Variable + 'static) -> Self {
        VariableRef(Arc::new(var))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn get(&self) -> Result<Value, EvalError> {
        self.0.get()
    }

    pub fn set(&self, value: Value) -> Result<(), EvalError> {
        self.0.set(value)
    }
}

impl fmt::Debug for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableRef({})", self.name())
    }
}

/// Binding of a function namespace to a provider.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub uri: String,
    pub provider: String,
    pub functions: Arc<FunctionCache>,
}

/// Maps free identifiers (and, for function calls, prefixes and namespace
/// URIs) to their meaning.
pub trait Resolver {
    fn resolve(&self, name: &str) -> Option<VariableRef>;

    /// Namespace URI bound to a function prefix.  The empty prefix is the
    /// default namespace used by unqualified calls.
    fn resolve_prefix(&self, _prefix: &str) -> Option<String> {
        None
    }

    fn resolve_namespace(&self, _uri: &str) -> Option<Namespace> {
        None
    }
}

// ── Bindings ──────────────────────────────────────────────────────────────────

type Store = Arc<RwLock<HashMap<String, Value>>>;

struct Bound {
    name: String,
    store: Store,
}

impl Variable for Bound {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self) -> Result<Value, EvalError> {
        let vars = self.store.read().unwrap_or_else(PoisonError::into_inner);
        Ok(vars.get(&self.name).cloned().unwrap_or_default())
    }

    fn set(&self, value: Value) -> Result<(), EvalError> {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.name.clone(), value);
        Ok(())
    }
}

/// A resolver over a mutable variable map, with optional function
/// namespaces.
///
/// Only names present when parsing resolve; a name later removed reads as
/// `null`.
#[derive(Clone, Default)]
pub struct Bindings {
    vars: Store,
    prefixes: HashMap<String, String>,
    namespaces: HashMap<String, String>,
    functions: Arc<FunctionCache>,
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vars = self.vars.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Bindings")
            .field("vars", &*vars)
            .field("prefixes", &self.prefixes)
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Bind `prefix` (use `""` for unqualified calls) to a namespace `uri`
    /// served by `provider`.
    pub fn with_namespace(
        mut self,
        prefix: &str,
        uri: &str,
        provider: impl FunctionProvider + 'static,
    ) -> Self {
        let id = uri.to_owned();
        self.functions.register(&id, provider);
        self.prefixes.insert(prefix.to_owned(), uri.to_owned());
        self.namespaces.insert(uri.to_owned(), id);
        self
    }

    pub fn functions(&self) -> &Arc<FunctionCache> {
        &self.functions
    }
}

impl Resolver for Bindings {
    fn resolve(&self, name: &str) -> Option<VariableRef> {
        let known = self
            .vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name);
        known.then(|| {
            VariableRef::new(Bound {
                name: name.to_owned(),
                store: Arc::clone(&self.vars),
            })
        })
    }

    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self.prefixes.get(prefix).cloned()
    }

    fn resolve_namespace(&self, uri: &str) -> Option<Namespace> {
        let provider = self.namespaces.get(uri)?;
        self.functions.has_provider(provider).then(|| Namespace {
            uri: uri.to_owned(),
            provider: provider.clone(),
            functions: Arc::clone(&self.functions),
        })
    }
}

/// Resolver that knows no names; useful for constant expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl Resolver for NoVariables {
    fn resolve(&self, _name: &str) -> Option<VariableRef> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::StaticProvider;

    #[test]
    fn bindings_resolve_known_names_only() {
        let b = Bindings::new().with("x", 1i64);
        assert!(b.resolve("x").is_some());
        assert!(b.resolve("y").is_none());
    }

    #[test]
    fn resolved_variable_sees_later_changes() {
        let b = Bindings::new().with("x", 1i64);
        let x = b.resolve("x").unwrap();
        b.set("x", 5i64);
        assert_eq!(x.get(), Ok(Value::Int(5)));
        x.set(Value::from("s")).unwrap();
        assert_eq!(b.get("x"), Some(Value::from("s")));
        b.remove("x");
        assert_eq!(x.get(), Ok(Value::Null));
    }

    #[test]
    fn namespaces() {
        let b = Bindings::new().with_namespace("m", "urn:math", StaticProvider::new());
        assert_eq!(b.resolve_prefix("m").as_deref(), Some("urn:math"));
        assert!(b.resolve_prefix("q").is_none());
        let ns = b.resolve_namespace("urn:math").unwrap();
        assert_eq!(ns.provider, "urn:math");
        assert!(b.resolve_namespace("urn:other").is_none());
    }
}
