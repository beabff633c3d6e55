//! Visited registry
//!
//! Maps a source handle's [`Identity`] to the clone produced for it. Each
//! entry also keeps the source handle alive so its address cannot be reused
//! by another allocation while the session lasts.

use crate::value::{Identity, Value};
use std::collections::HashMap;

#[derive(Debug)]
struct VisitedEntry {
    _source: Value,
    clone: Value,
}

/// Session-scoped identity map used for cycle breaking and aliasing
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    entries: HashMap<Identity, VisitedEntry>,
}

impl VisitedRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Clone already produced for `identity`
    #[inline]
    #[must_use]
    pub fn get(&self, identity: &Identity) -> Option<&Value> {
        self.entries.get(identity).map(|entry| &entry.clone)
    }

    /// Record the clone for `identity`
    ///
    /// Returns the clone previously recorded for it, if any.
    pub fn insert(&mut self, identity: Identity, source: Value, clone: Value) -> Option<Value> {
        self.entries
            .insert(
                identity,
                VisitedEntry {
                    _source: source,
                    clone,
                },
            )
            .map(|entry| entry.clone)
    }

    /// Whether a clone exists for `identity`
    #[inline]
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Number of recorded identities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identity has been recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Pointer;

    #[test]
    fn insert_and_get() {
        let mut visited = VisitedRegistry::new();
        let source = Pointer::new(Value::Int(1));
        let clone = Pointer::new(Value::Int(1));

        assert!(visited.is_empty());
        visited.insert(source.identity(), source.clone().into(), clone.clone().into());

        assert!(visited.contains(&source.identity()));
        assert_eq!(visited.get(&source.identity()), Some(&Value::from(clone)));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn keeps_source_alive() {
        let mut visited = VisitedRegistry::new();
        let source = Pointer::new(Value::Int(1));
        let identity = source.identity();
        visited.insert(identity, source.into(), Value::Nil);

        // a fresh allocation cannot take the retained address
        let other = Pointer::new(Value::Int(2));
        assert_ne!(other.identity(), identity);
    }
}
