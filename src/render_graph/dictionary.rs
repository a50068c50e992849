//! Keyed scratch state shared between passes
//!
//! By convention a [`Dictionary`] is valid for a single `execute()` call:
//! the caller supplies it and clears it between frames. Passes use it to
//! hand opaque values downstream without widening the reflection contract.

use std::any::Any;
use std::collections::HashMap;

/// String-keyed map of opaque typed values
#[derive(Default)]
pub struct Dictionary {
    values: HashMap<String, Box<dyn Any>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Returns `None` if the key is missing or holds a different type
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Get a copy of the value, falling back to `default`
    pub fn get_or<T: Any + Clone>(&self, key: &str, default: T) -> T {
        self.get(key).cloned().unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns whether the key was present
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
