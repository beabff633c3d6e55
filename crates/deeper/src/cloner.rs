//! Clone engine entry point
//!
//! [`Cloner`] owns the extension registry, configuration and optional
//! observer. Every top-level call opens a fresh [`CloneSession`], so no
//! visited state leaks from one call into the next.

use crate::config::ClonerConfig;
use crate::error::{CloneError, CloneResult};
use crate::observer::CloneObserver;
use crate::registry::{ExtensionCloner, ExtensionRegistry};
use crate::session::CloneSession;
use crate::typed::CloneTarget;
use crate::value::{ObjectType, TypeKey, Value};
use std::fmt;
use std::sync::Arc;

/// Deep-clone engine
#[derive(Default)]
pub struct Cloner {
    extensions: ExtensionRegistry,
    config: ClonerConfig,
    observer: Option<Arc<dyn CloneObserver>>,
}

impl Cloner {
    /// Create engine with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create engine with `config`
    #[inline]
    #[must_use]
    pub fn with_config(config: ClonerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Report composite clones to `observer`
    #[inline]
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CloneObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClonerConfig {
        &self.config
    }

    /// Registered extension cloners
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Register an extension cloner for an exact type
    pub fn register<C>(&mut self, key: TypeKey, cloner: C) -> bool
    where
        C: ExtensionCloner + 'static,
    {
        self.extensions.register(key, cloner)
    }

    /// Register a closure as extension cloner for an exact type
    pub fn register_fn<F>(&mut self, key: TypeKey, cloner: F) -> bool
    where
        F: Fn(&Value, &mut CloneSession<'_>) -> CloneResult<Value> + 'static,
    {
        self.extensions.register_fn(key, cloner)
    }

    /// Register a closure as extension cloner for object type `T`
    pub fn register_object<T, F>(&mut self, cloner: F) -> bool
    where
        T: ObjectType,
        F: Fn(&Value, &mut CloneSession<'_>) -> CloneResult<Value> + 'static,
    {
        self.extensions.register_object::<T, F>(cloner)
    }

    /// Open a session for driving the engine by hand
    #[must_use]
    pub fn session(&self) -> CloneSession<'_> {
        let session = CloneSession::new(&self.extensions, &self.config);
        match self.observer.as_deref() {
            Some(observer) => session.with_observer(observer),
            None => session,
        }
    }

    /// Deep clone `value` in a fresh session
    ///
    /// Absent input clones to absent without error.
    ///
    /// # Errors
    /// The first failure raised anywhere in the traversal, even when an
    /// extension or self-cloning object swallowed it
    pub fn clone_value(&self, value: &Value) -> CloneResult<Value> {
        tracing::debug!(type_name = value.type_name(), shape = %value.shape(), "deep clone started");

        let mut session = self.session();
        let result = session.clone_value(value);
        let result = match session.failure() {
            Some(err) => Err(err.clone()),
            None => result,
        };

        tracing::debug!(
            visited = session.visited_len(),
            ok = result.is_ok(),
            "deep clone finished"
        );
        result
    }

    /// Deep clone `src` and view the result as `T`
    ///
    /// # Errors
    /// - [`CloneError::TypeMismatch`] if the clone has another type
    /// - any error from [`Cloner::clone_value`]
    pub fn clone_typed<T: CloneTarget>(&self, src: &T) -> CloneResult<T> {
        if let Some(absent) = T::absent() {
            if src.is_absent() {
                return Ok(absent);
            }
        }

        let cloned = self.clone_value(&src.to_value())?;
        T::from_value(cloned).map_err(|other| CloneError::type_mismatch(T::TYPE_NAME, other.type_name()))
    }
}

impl fmt::Debug for Cloner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cloner")
            .field("extensions", &self.extensions)
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Pointer, Record};

    #[test]
    fn clone_int() {
        let cloner = Cloner::new();
        assert_eq!(cloner.clone_value(&Value::Int(42)), Ok(Value::Int(42)));
    }

    #[test]
    fn sessions_are_fresh_per_call() {
        let cloner = Cloner::new();
        let shared = Value::reference(Value::Int(1));

        let first = cloner.clone_value(&shared).unwrap();
        let second = cloner.clone_value(&shared).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn typed_absent_pointer() {
        let cloner = Cloner::new();
        let cloned = cloner.clone_typed::<Option<Pointer>>(&None).unwrap();
        assert!(cloned.is_none());
    }

    #[test]
    fn typed_mismatch_from_extension() {
        let mut cloner = Cloner::new();
        cloner.register_fn(TypeKey::Int, |_, _| Ok(Value::str("not an int")));

        let err = cloner.clone_typed(&5_i64).unwrap_err();
        assert_eq!(err, CloneError::type_mismatch("int", "str"));
    }

    #[test]
    fn typed_record_skips_absence_check() {
        let ty = crate::value::RecordType::new("Empty", vec![]);
        let cloner = Cloner::new();
        let cloned = cloner.clone_typed(&Record::zeroed(ty)).unwrap();
        assert_eq!(cloned.type_name(), "Empty");
    }

    #[test]
    fn debug_lists_registrations() {
        let mut cloner = Cloner::new();
        cloner.register_fn(TypeKey::Int, |v, _| Ok(v.clone()));
        let debug = format!("{cloner:?}");
        assert!(debug.contains("Int"));
    }
}
