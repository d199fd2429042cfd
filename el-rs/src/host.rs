//! Host-owned aggregates.
//!
//! The evaluator never looks inside host objects.  Everything it needs goes
//! through [`HostObject`], which a host implements once per type:
//!
//! | Shape     | Capability                         | Used by                |
//! |-----------|------------------------------------|------------------------|
//! | map       | [`HostObject::as_map`]             | `.`/`[]`, `length`, `sum`, `empty` |
//! | sequence  | [`HostObject::as_sequence`]        | `.`/`[]`, `length`, `sum`, `empty` |
//! | bean      | [`HostObject::property`] / [`HostObject::set_property`] | `.`/`[]` |
//!
//! Bean accessors are looked up by convention: reading `x.name` tries
//! `getName` and then `isName`; writing tries `setName`.
//!
//! [`HostMap`] and [`HostList`] are ready-made map and sequence hosts with
//! interior mutability, suitable for bindings and tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::value::Value;

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Map-like access, keyed by the string form of the index.
pub trait MapAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);

    /// All values, in the map's iteration order.
    fn values(&self) -> Vec<Value>;
}

/// Sequence-like access by zero-based position.
pub trait SequenceAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<Value>;

    /// Replace the element at `index`.  Returns `false` when out of range.
    fn set(&self, index: usize, value: Value) -> bool;

    fn values(&self) -> Vec<Value>;
}

/// An externally-owned aggregate reachable from expressions.
///
/// Every method has a default that declines, so a host implements only the
/// shapes it supports.
pub trait HostObject: fmt::Debug + Send + Sync {
    fn as_map(&self) -> Option<&dyn MapAccess> {
        None
    }

    fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
        None
    }

    /// Zero-argument accessor such as `getName` or `isActive`.
    fn property(&self, _accessor: &str) -> Option<Value> {
        None
    }

    /// Single-argument mutator such as `setName`.  `None` means no such
    /// mutator exists.
    fn set_property(&self, _mutator: &str, _value: Value) -> Option<Result<(), crate::EvalError>> {
        None
    }

    /// Natural ordering against another value, if the type has one.
    fn compare_to(&self, _other: &Value) -> Option<Ordering> {
        None
    }

    /// Canonical textual form.  `None` makes string coercion fail.
    fn to_text(&self) -> Option<String> {
        None
    }
}

/// Shared handle to a host object.
///
/// Two handles are equal when they point at the same object.
#[derive(Clone)]
pub struct HostRef(Arc<dyn HostObject>);

impl HostRef {
    pub fn new(obj: impl HostObject + 'static) -> Self {
        HostRef(Arc::new(obj))
    }

    pub fn from_arc(obj: Arc<dyn HostObject>) -> Self {
        HostRef(obj)
    }

    pub fn object(&self) -> &dyn HostObject {
        self.0.as_ref()
    }

    pub fn ptr_eq(&self, other: &HostRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared object, consistent with [`HostRef::ptr_eq`].
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Element count for map and sequence hosts.
    pub fn len(&self) -> Option<usize> {
        if let Some(m) = self.0.as_map() {
            Some(m.len())
        } else {
            self.0.as_sequence().map(|s| s.len())
        }
    }

    /// Element values for map and sequence hosts.
    pub fn elements(&self) -> Option<Vec<Value>> {
        if let Some(m) = self.0.as_map() {
            Some(m.values())
        } else {
            self.0.as_sequence().map(|s| s.values())
        }
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Accessor names tried, in order, when reading bean property `key`.
pub fn getter_names(key: &str) -> [String; 2] {
    let cap = capitalize(key);
    [format!("get{cap}"), format!("is{cap}")]
}

/// Mutator name used when writing bean property `key`.
pub fn setter_name(key: &str) -> String {
    format!("set{}", capitalize(key))
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Ready-made hosts ──────────────────────────────────────────────────────────

/// A string-keyed map host preserving insertion order.
#[derive(Debug, Default)]
pub struct HostMap {
    entries: RwLock<Vec<(String, Value)>>,
}

impl HostMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        MapAccess::set(&self, key, value.into());
        self
    }

    /// Wrap into a [`Value`].
    pub fn into_value(self) -> Value {
        Value::Host(HostRef::new(self))
    }
}

impl MapAccess for HostMap {
    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn set(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key.to_owned(), value)),
        }
    }

    fn values(&self) -> Vec<Value> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().map(|(_, v)| v.clone()).collect()
    }
}

impl HostObject for HostMap {
    fn as_map(&self) -> Option<&dyn MapAccess> {
        Some(self)
    }
}

/// A growable sequence host.
#[derive(Debug, Default)]
pub struct HostList {
    items: RwLock<Vec<Value>>,
}

impl HostList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        HostList {
            items: RwLock::new(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value.into());
    }

    pub fn into_value(self) -> Value {
        Value::Host(HostRef::new(self))
    }
}

impl SequenceAccess for HostList {
    fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    fn set(&self, index: usize, value: Value) -> bool {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn values(&self) -> Vec<Value> {
        self.items.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl HostObject for HostList {
    fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
        Some(self)
    }
}

/// Convenience for hosts that want a `HashMap`-backed bean without writing
/// a type: accessor names map straight to stored values.
#[derive(Debug, Default)]
pub struct HostBean {
    props: RwLock<HashMap<String, Value>>,
}

impl HostBean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a readable property under its accessor name (`getName`).
    pub fn with(self, accessor: &str, value: impl Into<Value>) -> Self {
        self.props
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(accessor.to_owned(), value.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::Host(HostRef::new(self))
    }
}

impl HostObject for HostBean {
    fn property(&self, accessor: &str) -> Option<Value> {
        self.props
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(accessor)
            .cloned()
    }

    fn set_property(&self, mutator: &str, value: Value) -> Option<Result<(), crate::EvalError>> {
        let prop = mutator.strip_prefix("set")?;
        let getter = format!("get{prop}");
        let mut props = self.props.write().unwrap_or_else(PoisonError::into_inner);
        // Only properties that can already be read are writable.
        let slot = props.get_mut(&getter)?;
        *slot = value;
        Some(Ok(()))
    }
}
