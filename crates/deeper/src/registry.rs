//! Extension registry
//!
//! Provides [`ExtensionRegistry`] for cloners that override structural cloning
//! of one exact [`TypeKey`]. Registration happens before cloning; sessions only
//! read the registry.

use crate::error::CloneResult;
use crate::session::CloneSession;
use crate::value::{ObjectType, TypeKey, Value};
use std::collections::HashMap;
use std::fmt;

/// Externally registered clone function for one concrete type
///
/// Like [`Cloneable`](crate::Cloneable), results are not entered into the
/// visited registry unless the cloner does so through the session.
pub trait ExtensionCloner {
    /// Clone `value`, recursing through `session` for sub-objects
    ///
    /// # Errors
    /// Any error aborts the enclosing top-level clone
    fn clone_value(&self, value: &Value, session: &mut CloneSession<'_>) -> CloneResult<Value>;
}

impl<F> ExtensionCloner for F
where
    F: Fn(&Value, &mut CloneSession<'_>) -> CloneResult<Value>,
{
    fn clone_value(&self, value: &Value, session: &mut CloneSession<'_>) -> CloneResult<Value> {
        self(value, session)
    }
}

/// Registry of extension cloners keyed by exact type
#[derive(Default)]
pub struct ExtensionRegistry {
    cloners: HashMap<TypeKey, Box<dyn ExtensionCloner>>,
}

impl ExtensionRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            cloners: HashMap::new(),
        }
    }

    /// Register a cloner, replacing any previous one for `key`
    ///
    /// Returns `true` if a cloner was replaced.
    pub fn register<C>(&mut self, key: TypeKey, cloner: C) -> bool
    where
        C: ExtensionCloner + 'static,
    {
        tracing::debug!(?key, "registering extension cloner");
        self.cloners.insert(key, Box::new(cloner)).is_some()
    }

    /// Register a closure as cloner
    pub fn register_fn<F>(&mut self, key: TypeKey, cloner: F) -> bool
    where
        F: Fn(&Value, &mut CloneSession<'_>) -> CloneResult<Value> + 'static,
    {
        self.register(key, cloner)
    }

    /// Register a closure as cloner for object type `T`
    pub fn register_object<T, F>(&mut self, cloner: F) -> bool
    where
        T: ObjectType,
        F: Fn(&Value, &mut CloneSession<'_>) -> CloneResult<Value> + 'static,
    {
        self.register(TypeKey::object::<T>(), cloner)
    }

    /// Cloner for an exact type
    #[inline]
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<&dyn ExtensionCloner> {
        self.cloners.get(key).map(|cloner| cloner.as_ref())
    }

    /// Whether a cloner is registered for `key`
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.cloners.contains_key(key)
    }

    /// Remove the cloner for `key`
    #[inline]
    pub fn remove(&mut self, key: &TypeKey) -> bool {
        self.cloners.remove(key).is_some()
    }

    /// Registered type keys
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.cloners.keys()
    }

    /// Get number of registered cloners
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cloners.len()
    }

    /// Whether no cloner is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cloners.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.cloners.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FieldDef, RecordType};

    fn identity_cloner(value: &Value, _session: &mut CloneSession<'_>) -> CloneResult<Value> {
        Ok(value.clone())
    }

    #[test]
    fn registry_new_empty() {
        let registry = ExtensionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_register_and_replace() {
        let point = RecordType::new("Point", vec![FieldDef::writable("x")]);
        let other = RecordType::new("Other", vec![FieldDef::writable("x")]);

        let mut registry = ExtensionRegistry::new();
        assert!(!registry.register(TypeKey::record(&point), identity_cloner));
        assert!(registry.register_fn(TypeKey::record(&point), |v, _| Ok(v.clone())));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&TypeKey::record(&point)));
        assert!(registry.get(&TypeKey::record(&other)).is_none());
    }

    #[test]
    fn registry_record_key_includes_layout() {
        let point = RecordType::new("Point", vec![FieldDef::writable("x")]);
        let point3 = RecordType::new(
            "Point",
            vec![FieldDef::writable("x"), FieldDef::writable("y"), FieldDef::writable("z")],
        );

        let mut registry = ExtensionRegistry::new();
        registry.register(TypeKey::record(&point), identity_cloner);

        let same_layout = RecordType::new("Point", vec![FieldDef::writable("x")]);
        assert!(registry.contains(&TypeKey::record(&same_layout)));
        assert!(!registry.contains(&TypeKey::record(&point3)));
    }

    #[test]
    fn registry_remove() {
        let mut registry = ExtensionRegistry::new();
        registry.register(TypeKey::Int, identity_cloner);
        assert!(registry.remove(&TypeKey::Int));
        assert!(!registry.remove(&TypeKey::Int));
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_keys() {
        let mut registry = ExtensionRegistry::new();
        registry.register(TypeKey::Int, identity_cloner);
        registry.register(TypeKey::dyn_container("Shape"), identity_cloner);
        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&&TypeKey::Int));
    }
}
