//! Typed clone targets
//!
//! [`CloneTarget`] lets [`Cloner::clone_typed`](crate::Cloner::clone_typed)
//! convert a static Rust type into a [`Value`], clone it, and view the result
//! back as the same type.
//!
//! Only nullable targets (handles wrapped in `Option`, and [`Value`] itself)
//! short-circuit on absent input. Non-nullable targets never check for absence.

use crate::value::{Dyn, Mapping, Pointer, Record, Sequence, Value};
use std::rc::Rc;

/// A static type that can round-trip through the clone engine
pub trait CloneTarget: Sized {
    /// Name reported in [`CloneError::TypeMismatch`](crate::CloneError::TypeMismatch)
    const TYPE_NAME: &'static str;

    /// Value handed to the engine
    fn to_value(&self) -> Value;

    /// View a clone as this type, handing the value back on mismatch
    ///
    /// # Errors
    /// Returns the value unchanged if it has another shape
    fn from_value(value: Value) -> Result<Self, Value>;

    /// Absent value for nullable types, `None` for types that cannot be absent
    fn absent() -> Option<Self> {
        None
    }

    /// Only consulted when [`CloneTarget::absent`] returns `Some`
    fn is_absent(&self) -> bool {
        false
    }
}

macro_rules! scalar_target {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl CloneTarget for $ty {
            const TYPE_NAME: &'static str = $name;

            fn to_value(&self) -> Value {
                Value::$variant(*self)
            }

            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

scalar_target!(bool, Bool, "bool");
scalar_target!(i64, Int, "int");
scalar_target!(u64, Uint, "uint");
scalar_target!(f64, Float, "float");
scalar_target!(char, Char, "char");

impl CloneTarget for String {
    const TYPE_NAME: &'static str = "str";

    fn to_value(&self) -> Value {
        Value::Str(Rc::from(self.as_str()))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(other),
        }
    }
}

impl CloneTarget for Record {
    const TYPE_NAME: &'static str = "record";

    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Record(record) => Ok(record),
            other => Err(other),
        }
    }
}

impl CloneTarget for Dyn {
    const TYPE_NAME: &'static str = "dyn";

    fn to_value(&self) -> Value {
        Value::Dyn(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Dyn(container) => Ok(container),
            other => Err(other),
        }
    }
}

macro_rules! handle_target {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl CloneTarget for Option<$ty> {
            const TYPE_NAME: &'static str = $name;

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(handle) => Ok(handle),
                    other => Err(other),
                }
            }

            fn absent() -> Option<Self> {
                Some(None)
            }

            fn is_absent(&self) -> bool {
                self.is_none()
            }
        }
    };
}

handle_target!(Pointer, Ref, "ref");
handle_target!(Sequence, Seq, "seq");
handle_target!(Mapping, Map, "map");

impl CloneTarget for Value {
    const TYPE_NAME: &'static str = "value";

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }

    fn absent() -> Option<Self> {
        Some(Value::Nil)
    }

    fn is_absent(&self) -> bool {
        self.is_nil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip_through_value() {
        assert_eq!(i64::from_value(7_i64.to_value()), Ok(7));
        assert_eq!(String::from_value(Value::str("x")), Ok("x".to_string()));
        assert_eq!(i64::from_value(Value::str("x")), Err(Value::str("x")));
    }

    #[test]
    fn only_nullable_targets_have_absent() {
        assert!(i64::absent().is_none());
        assert!(Record::absent().is_none());
        assert!(matches!(<Option<Pointer>>::absent(), Some(None)));
        assert_eq!(Value::absent(), Some(Value::Nil));
    }
}
