//! Clone tally for the deeper engine
//!
//! [`CloneStats`] is a [`CloneObserver`] that counts cloned composites per
//! tag. Tags are the shape name (`reference`, `sequence`, `array`, `mapping`)
//! or, for records and polymorphic containers, the shape followed by the type
//! name (`record Point`, `dyn Shape`).
//!
//! One instance can be shared across engines and threads through an `Arc`;
//! writes are serialized by a lock.
//!
//! # Example
//!
//! ```rust
//! use deeper::{Cloner, Value};
//! use deeper_stats::CloneStats;
//! use std::sync::Arc;
//!
//! let stats = Arc::new(CloneStats::new());
//! let cloner = Cloner::new().with_observer(stats.clone());
//!
//! cloner.clone_value(&Value::reference(Value::Int(1))).unwrap();
//! assert_eq!(stats.count("reference"), 1);
//! assert_eq!(stats.format(), "reference: 1\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use deeper::{CloneObserver, Shape};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lock-protected tally of cloned composites
#[derive(Debug, Default)]
pub struct CloneStats {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl CloneStats {
    /// Create empty tally
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag under which a clone of `shape` / `type_name` is counted
    #[must_use]
    pub fn tag(shape: Shape, type_name: &str) -> String {
        match shape {
            Shape::Record | Shape::Polymorphic => format!("{shape} {type_name}"),
            _ => shape.as_str().to_string(),
        }
    }

    /// Count for one tag
    #[must_use]
    pub fn count(&self, tag: &str) -> u64 {
        self.counts.lock().get(tag).copied().unwrap_or(0)
    }

    /// Count across all tags
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.lock().values().sum()
    }

    /// Point-in-time copy of the tally
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            counts: self.counts.lock().clone(),
        }
    }

    /// Human-readable tally, one `tag: count` line per tag in tag order
    #[must_use]
    pub fn format(&self) -> String {
        self.snapshot().to_string()
    }
}

impl CloneObserver for CloneStats {
    fn record(&self, shape: Shape, type_name: &str) {
        *self
            .counts
            .lock()
            .entry(Self::tag(shape, type_name))
            .or_insert(0) += 1;
    }
}

/// Serializable copy of a [`CloneStats`] tally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Count per tag
    pub counts: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    /// JSON rendering of the tally
    ///
    /// # Errors
    /// Returns the serializer error, which only occurs on allocation failure
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, count) in &self.counts {
            writeln!(f, "{tag}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deeper::{Cloner, Dyn, FieldDef, Record, RecordType, Value};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn tags() {
        assert_eq!(CloneStats::tag(Shape::Mapping, "mapping"), "mapping");
        assert_eq!(CloneStats::tag(Shape::Record, "Point"), "record Point");
        assert_eq!(CloneStats::tag(Shape::Polymorphic, "Shape"), "dyn Shape");
    }

    #[test]
    fn tallies_composites_only() {
        let stats = Arc::new(CloneStats::new());
        let cloner = Cloner::new().with_observer(stats.clone());

        let ty = RecordType::new("Point", vec![FieldDef::writable("x")]);
        let point = Record::new(ty, vec![Value::Int(1)]).unwrap();
        let source = Value::seq(vec![
            Value::Record(point.clone()),
            Value::Record(point),
            Value::Dyn(Dyn::new("Shape", Value::Int(2))),
            Value::Int(3),
        ]);
        cloner.clone_value(&source).unwrap();

        assert_eq!(stats.count("record Point"), 2);
        assert_eq!(stats.count("dyn Shape"), 1);
        assert_eq!(stats.count("sequence"), 1);
        assert_eq!(stats.total(), 4);
        assert_eq!(
            stats.format(),
            "dyn Shape: 1\nrecord Point: 2\nsequence: 1\n"
        );
    }

    #[test]
    fn shared_across_threads() {
        let stats = Arc::new(CloneStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record(Shape::Array, "array");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.count("array"), 400);
    }

    #[test]
    fn snapshot_json() {
        let stats = CloneStats::new();
        stats.record(Shape::Reference, "reference");

        let json = stats.snapshot().to_json().unwrap();
        assert_eq!(json, r#"{"counts":{"reference":1}}"#);
    }

    #[test]
    fn empty_format() {
        assert_eq!(CloneStats::new().format(), "");
    }
}
