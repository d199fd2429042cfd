//! Function providers and the resolved-function cache.
//!
//! A provider is looked up by id; it maps function names to
//! implementations.  Resolution happens lazily on first call and is
//! memoized per `(provider, name)` in a [`FunctionCache`].  The cache is
//! shared by every tree parsed against the same namespaces, so it is
//! guarded by an `RwLock` and may be used from several threads at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::EvalError;
use crate::value::Value;

/// A callable implementation.
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// Something that can hand out functions by name.
pub trait FunctionProvider: Send + Sync {
    fn function(&self, name: &str) -> Option<Function>;
}

/// A provider backed by a fixed table.
#[derive(Default, Clone)]
pub struct StaticProvider {
    functions: HashMap<String, Function>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_owned(), Arc::new(f));
        self
    }
}

impl FunctionProvider for StaticProvider {
    fn function(&self, name: &str) -> Option<Function> {
        self.functions.get(name).cloned()
    }
}

/// Registered providers plus the memo of resolved implementations.
#[derive(Default)]
pub struct FunctionCache {
    providers: RwLock<HashMap<String, Arc<dyn FunctionProvider>>>,
    resolved: RwLock<HashMap<(String, String), Function>>,
}

impl fmt::Debug for FunctionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = providers.keys().collect();
        ids.sort();
        f.debug_struct("FunctionCache").field("providers", &ids).finish()
    }
}

impl FunctionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a provider.  Replacing drops any memoized
    /// functions that came from the old provider.
    pub fn register(&self, id: &str, provider: impl FunctionProvider + 'static) {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_owned(), Arc::new(provider));
        self.resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(p, _), _| p != id);
    }

    pub fn has_provider(&self, id: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Find the implementation of `name` in provider `id`, resolving it on
    /// first use.
    pub fn lookup(&self, id: &str, name: &str) -> Result<Function, EvalError> {
        let key = (id.to_owned(), name.to_owned());
        if let Some(f) = self
            .resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(f));
        }

        tracing::trace!(provider = id, function = name, "resolving function");
        let provider = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| EvalError::Function {
                name: name.to_owned(),
                message: format!("no provider '{id}'"),
            })?;
        let f = provider.function(name).ok_or_else(|| EvalError::Function {
            name: name.to_owned(),
            message: format!("not defined by provider '{id}'"),
        })?;
        self.resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&f));
        Ok(f)
    }

    /// Resolve and call.
    pub fn invoke(&self, id: &str, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let f = self.lookup(id, name)?;
        f(args)
    }

    /// Number of memoized implementations.
    pub fn resolved_len(&self) -> usize {
        self.resolved.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double() -> StaticProvider {
        StaticProvider::new().with("double", |args| {
            let n = args.first().cloned().unwrap_or_default().as_long()?;
            Ok(Value::Int(n * 2))
        })
    }

    #[test]
    fn invoke_resolves_and_memoizes() {
        let cache = FunctionCache::new();
        cache.register("math", double());
        assert_eq!(cache.resolved_len(), 0);
        assert_eq!(cache.invoke("math", "double", &[Value::Int(4)]), Ok(Value::Int(8)));
        assert_eq!(cache.invoke("math", "double", &[Value::Int(5)]), Ok(Value::Int(10)));
        assert_eq!(cache.resolved_len(), 1);
    }

    #[test]
    fn unknown_function_or_provider() {
        let cache = FunctionCache::new();
        cache.register("math", double());
        assert!(matches!(
            cache.invoke("math", "triple", &[]),
            Err(EvalError::Function { .. })
        ));
        assert!(matches!(
            cache.invoke("nope", "double", &[]),
            Err(EvalError::Function { .. })
        ));
    }

    #[test]
    fn reregister_drops_memo() {
        let cache = FunctionCache::new();
        cache.register("math", double());
        cache.invoke("math", "double", &[Value::Int(1)]).unwrap();
        cache.register("math", StaticProvider::new().with("double", |_| Ok(Value::Int(0))));
        assert_eq!(cache.resolved_len(), 0);
        assert_eq!(cache.invoke("math", "double", &[Value::Int(1)]), Ok(Value::Int(0)));
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(FunctionCache::new());
        cache.register("math", double());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.invoke("math", "double", &[Value::Int(i)]))
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), Ok(Value::Int(2 * i as i64)));
        }
        assert_eq!(cache.resolved_len(), 1);
    }
}
