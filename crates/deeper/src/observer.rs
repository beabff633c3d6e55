//! Diagnostics hook
//!
//! The engine reports every completed composite clone to an optional
//! [`CloneObserver`] injected at construction. Observers are pure sinks and
//! never affect the result.

use crate::value::Shape;

/// Receives a notification per composite value cloned
pub trait CloneObserver: Send + Sync {
    /// `type_name` is the record or container name for [`Shape::Record`] and
    /// [`Shape::Polymorphic`], the shape tag otherwise.
    fn record(&self, shape: Shape, type_name: &str);
}
