//! Self-cloning protocol
//!
//! A type implementing [`Cloneable`] owns its own cloning entirely. It gets
//! the live [`CloneSession`] so it can recurse into its sub-objects through
//! the engine.
//!
//! Values cloned by a [`Cloneable`] are not entered into the visited registry
//! automatically. A type that needs aliasing or cycle safety across its own
//! boundary uses [`CloneSession::lookup`] and [`CloneSession::remember`].

use crate::error::CloneResult;
use crate::session::CloneSession;
use crate::value::Value;

/// Capability of a type to clone itself
pub trait Cloneable {
    /// Produce this value's clone
    ///
    /// # Errors
    /// Any error aborts the enclosing top-level clone
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Value>;
}
