//! deeper: deep-clone engine for dynamic value graphs
//!
//! Produces fully independent copies of arbitrary [`Value`] graphs while
//! preserving aliasing and terminating on cycles.
//!
//! # Core Concepts
//!
//! - [`Value`]: closed set of shapes (references, sequences, arrays, mappings,
//!   records, polymorphic containers, scalars, objects, callables, channels)
//! - [`Cloner`]: engine holding the extension registry and configuration
//! - [`CloneSession`]: per-call state; its `clone_value` is the dispatcher
//! - [`Cloneable`]: self-cloning capability for object types
//! - [`ExtensionRegistry`]: cloners overriding structural cloning per type
//! - [`CloneObserver`]: optional diagnostics sink
//!
//! # Guarantees
//!
//! - Two locations holding the same pointer, sequence or mapping in the source
//!   hold the same clone in the result.
//! - Reference cycles terminate and reappear with the same topology.
//! - Absent handles clone to absent.
//! - Aliasing is only tracked by the structural cloners. Extension and
//!   self-cloning code opts in through [`CloneSession::lookup`] and
//!   [`CloneSession::remember`].
//!
//! Cyclic graphs built from `Rc` handles are never freed on their own; break
//! a cycle (for example by setting a pointer to [`Value::Nil`]) when done.
//!
//! # Example
//!
//! ```rust
//! use deeper::{Cloner, Pointer, Value};
//!
//! let shared = Pointer::new(Value::Int(300));
//! let source = Value::seq(vec![shared.clone().into(), Value::Int(400), shared.into()]);
//!
//! let cloner = Cloner::new();
//! let cloned = cloner.clone_value(&source).unwrap();
//!
//! let items = cloned.as_sequence().unwrap().borrow().unwrap().clone();
//! assert_eq!(items[0], items[2]);
//! assert!(cloned.deep_eq(&source));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cloner;
mod composite;
mod config;
mod error;
mod observer;
mod protocol;
mod registry;
mod session;
mod typed;
mod visited;

pub mod value;

// Re-exports
pub use cloner::Cloner;
pub use config::{ClonerConfig, DEFAULT_MAX_DEPTH};
pub use error::{CloneError, CloneResult};
pub use observer::CloneObserver;
pub use protocol::Cloneable;
pub use registry::{ExtensionCloner, ExtensionRegistry};
pub use session::CloneSession;
pub use typed::CloneTarget;
pub use value::{
    Channel, Dyn, FieldAccess, FieldDef, Func, Identity, Mapping, Object, ObjectType, Pointer,
    Record, RecordKey, RecordType, RefKind, Sequence, Shape, TypeKey, Value, ValueError,
};
pub use visited::VisitedRegistry;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and cloning value graphs
    pub use crate::{
        CloneError, CloneResult, CloneSession, Cloneable, Cloner, ClonerConfig, Dyn, FieldDef,
        Mapping, Object, ObjectType, Pointer, Record, RecordType, Sequence, TypeKey, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
