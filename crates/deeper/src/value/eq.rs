//! Cycle-aware structural equality

use super::handle::Identity;
use super::Value;
use std::collections::HashSet;

/// Coinductive comparison: a pair of handles already under comparison is
/// assumed equal, which terminates on cyclic graphs.
#[derive(Debug, Default)]
pub(super) struct DeepEq {
    assumed: HashSet<(Identity, Identity)>,
}

impl DeepEq {
    fn assume(&mut self, a: Identity, b: Identity) -> bool {
        self.assumed.insert((a, b))
    }

    pub(super) fn eq(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Ref(Some(x)), Value::Ref(Some(y))) => {
                if !self.assume(x.identity(), y.identity()) {
                    return true;
                }
                match (x.get(), y.get()) {
                    (Ok(x), Ok(y)) => self.eq(&x, &y),
                    _ => false,
                }
            }
            (Value::Seq(Some(x)), Value::Seq(Some(y))) => {
                if !self.assume(x.identity(), y.identity()) {
                    return true;
                }
                match (x.borrow(), y.borrow()) {
                    (Ok(x), Ok(y)) => self.eq_slices(&x, &y),
                    _ => false,
                }
            }
            (Value::Map(Some(x)), Value::Map(Some(y))) => {
                if !self.assume(x.identity(), y.identity()) {
                    return true;
                }
                let (Ok(x), Ok(y)) = (x.borrow(), y.borrow()) else {
                    return false;
                };
                if x.len() != y.len() {
                    return false;
                }
                x.iter().all(|(key, value)| match y.get(key) {
                    Some(other) => self.eq(value, other),
                    // reference-typed keys differ in identity across a clone
                    None => y
                        .iter()
                        .any(|(k, v)| self.try_entry((key, value), (k, v))),
                })
            }
            (Value::Array(x), Value::Array(y)) => self.eq_slices(x, y),
            (Value::Record(x), Value::Record(y)) => {
                x.record_type().key() == y.record_type().key()
                    && x.iter()
                        .zip(y.iter())
                        .all(|((_, a), (_, b))| self.eq(a, b))
            }
            (Value::Dyn(x), Value::Dyn(y)) => {
                x.container() == y.container()
                    && match (x.inner(), y.inner()) {
                        (None, None) => true,
                        (Some(a), Some(b)) => self.eq(a, b),
                        _ => false,
                    }
            }
            (Value::Object(x), Value::Object(y)) => x.object_eq(y),
            _ => a == b,
        }
    }

    /// Compare two map entries, dropping assumptions made by a failed attempt
    fn try_entry(&mut self, a: (&Value, &Value), b: (&Value, &Value)) -> bool {
        let saved = self.assumed.clone();
        let equal = self.eq(a.0, b.0) && self.eq(a.1, b.1);
        if !equal {
            self.assumed = saved;
        }
        equal
    }

    fn eq_slices(&mut self, a: &[Value], b: &[Value]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.eq(x, y))
    }
}
