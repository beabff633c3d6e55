//! Clone session and dispatcher
//!
//! A [`CloneSession`] is the state of one top-level clone: the visited
//! registry, the current depth and the first failure, if any. Its
//! [`clone_value`](CloneSession::clone_value) method is the dispatcher every
//! composite cloner, extension and self-cloning object recurses through.
//!
//! # Dispatch order
//! 1. Objects exposing [`Cloneable`](crate::Cloneable) clone themselves
//! 2. An extension registered for the exact [`TypeKey`] is invoked
//! 3. Composite shapes go to their structural cloner
//! 4. Callables and channels fail with [`CloneError::UnclonableKind`]
//! 5. Scalars and opaque objects are copied directly

use crate::config::ClonerConfig;
use crate::error::{CloneError, CloneResult};
use crate::observer::CloneObserver;
use crate::registry::ExtensionRegistry;
use crate::value::{Identity, Shape, Value};
use crate::visited::VisitedRegistry;

/// State of a single top-level clone
///
/// Sessions hold `Rc` handles and are therefore confined to one thread. After
/// any failure the session is poisoned and refuses further work.
pub struct CloneSession<'a> {
    extensions: &'a ExtensionRegistry,
    config: &'a ClonerConfig,
    observer: Option<&'a dyn CloneObserver>,
    pub(crate) visited: VisitedRegistry,
    depth: usize,
    failure: Option<CloneError>,
}

impl<'a> CloneSession<'a> {
    /// Create session over a read-only extension registry
    #[must_use]
    pub fn new(extensions: &'a ExtensionRegistry, config: &'a ClonerConfig) -> Self {
        Self {
            extensions,
            config,
            observer: None,
            visited: VisitedRegistry::new(),
            depth: 0,
            failure: None,
        }
    }

    /// Attach a diagnostics observer
    #[inline]
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn CloneObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Deep clone `value`
    ///
    /// # Errors
    /// - [`CloneError::Poisoned`] if the session already failed
    /// - [`CloneError::DepthExceeded`] past the configured depth
    /// - any error raised while cloning a nested value
    pub fn clone_value(&mut self, value: &Value) -> CloneResult<Value> {
        if self.failure.is_some() {
            return Err(CloneError::Poisoned);
        }
        if let Some(limit) = self.config.max_depth {
            if self.depth >= limit {
                return Err(self.poison(CloneError::DepthExceeded { limit }));
            }
        }

        self.depth += 1;
        let result = self.dispatch(value);
        self.depth -= 1;

        result.map_err(|err| self.poison(err))
    }

    fn dispatch(&mut self, value: &Value) -> CloneResult<Value> {
        if let Value::Object(object) = value {
            if let Some(cloneable) = object.as_cloneable() {
                tracing::trace!(type_name = object.type_name(), "delegating to self-cloning object");
                return cloneable.clone_with(self);
            }
        }

        let extensions = self.extensions;
        if !extensions.is_empty() {
            if let Some(cloner) = extensions.get(&value.type_key()) {
                tracing::trace!(type_name = value.type_name(), "delegating to extension cloner");
                return cloner.clone_value(value, self);
            }
        }

        match value {
            Value::Nil
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Uint(_)
            | Value::Float(_)
            | Value::Char(_)
            | Value::Str(_) => Ok(value.clone()),
            Value::Ref(ptr) => self.clone_pointer(ptr.as_ref()),
            Value::Seq(seq) => self.clone_sequence(seq.as_ref()),
            Value::Array(items) => self.clone_array(items),
            Value::Map(map) => self.clone_mapping(map.as_ref()),
            Value::Record(record) => self.clone_record(record),
            Value::Dyn(container) => self.clone_dyn(container),
            Value::Object(object) => {
                if self.config.share_opaque {
                    Ok(value.clone())
                } else {
                    Err(CloneError::unclonable("opaque", object.type_name()))
                }
            }
            Value::Func(func) => Err(CloneError::unclonable("func", func.name())),
            Value::Chan(chan) => Err(CloneError::unclonable("chan", chan.elem())),
        }
    }

    fn poison(&mut self, err: CloneError) -> CloneError {
        if self.failure.is_none() {
            tracing::warn!(error = %err, depth = self.depth, "clone session poisoned");
            self.failure = Some(err.clone());
        }
        err
    }

    /// Clone already produced for a source identity in this session
    #[inline]
    #[must_use]
    pub fn lookup(&self, identity: &Identity) -> Option<Value> {
        self.visited.get(identity).cloned()
    }

    /// Record `clone` as the clone of `source`
    ///
    /// For extension and self-cloning code that wants aliasing and cycle
    /// safety. Register the clone shell before recursing into its contents.
    /// Sources without an identity are ignored.
    pub fn remember(&mut self, source: &Value, clone: &Value) {
        if let Some(identity) = source.identity() {
            self.visited.insert(identity, source.clone(), clone.clone());
        }
    }

    pub(crate) fn observe(&self, shape: Shape, type_name: &str) {
        if let Some(observer) = self.observer {
            observer.record(shape, type_name);
        }
    }

    /// Configuration this session runs with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClonerConfig {
        self.config
    }

    /// Number of identities recorded so far
    #[inline]
    #[must_use]
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Current recursion depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether an earlier failure poisoned this session
    #[inline]
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.failure.is_some()
    }

    /// First failure recorded by this session
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<&CloneError> {
        self.failure.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Channel, Func, Pointer};

    #[test]
    fn scalars_copy() {
        let registry = ExtensionRegistry::new();
        let config = ClonerConfig::new();
        let mut session = CloneSession::new(&registry, &config);

        assert_eq!(session.clone_value(&Value::Int(42)).unwrap(), Value::Int(42));
        assert_eq!(session.clone_value(&Value::str("hi")).unwrap(), Value::str("hi"));
        assert_eq!(session.clone_value(&Value::Nil).unwrap(), Value::Nil);
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn failure_poisons_session() {
        let registry = ExtensionRegistry::new();
        let config = ClonerConfig::new();
        let mut session = CloneSession::new(&registry, &config);

        let err = session.clone_value(&Value::Chan(Channel::new("int"))).unwrap_err();
        assert!(matches!(err, CloneError::UnclonableKind { kind: "chan", .. }));
        assert!(session.is_poisoned());
        assert_eq!(session.failure(), Some(&err));

        let again = session.clone_value(&Value::Int(1)).unwrap_err();
        assert_eq!(again, CloneError::Poisoned);
    }

    #[test]
    fn func_rejected() {
        let registry = ExtensionRegistry::new();
        let config = ClonerConfig::new();
        let mut session = CloneSession::new(&registry, &config);

        let err = session
            .clone_value(&Value::Func(Func::new("handler", |_| Value::Nil)))
            .unwrap_err();
        assert_eq!(err, CloneError::unclonable("func", "handler"));
    }

    #[test]
    fn depth_limit() {
        let registry = ExtensionRegistry::new();
        let config = ClonerConfig::new().with_max_depth(Some(3));
        let mut session = CloneSession::new(&registry, &config);

        let nested = Value::reference(Value::reference(Value::reference(Value::Int(1))));
        let err = session.clone_value(&nested).unwrap_err();
        assert_eq!(err, CloneError::DepthExceeded { limit: 3 });
    }

    #[test]
    fn remember_and_lookup() {
        let registry = ExtensionRegistry::new();
        let config = ClonerConfig::new();
        let mut session = CloneSession::new(&registry, &config);

        let source = Value::from(Pointer::new(Value::Int(1)));
        let clone = Value::from(Pointer::new(Value::Int(1)));
        session.remember(&source, &clone);
        session.remember(&Value::Int(3), &Value::Int(3));

        assert_eq!(session.visited_len(), 1);
        let identity = source.identity().unwrap();
        assert_eq!(session.lookup(&identity), Some(clone));
    }
}
