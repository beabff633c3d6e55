//! Structural cloners, one per composite shape
//!
//! Reference-typed shapes (pointer, sequence, mapping) register their clone
//! shell in the visited registry *before* recursing into their contents. A
//! later encounter of the same identity, including one reached through a
//! cycle, gets the shell back instead of recursing again.

use crate::error::CloneResult;
use crate::session::CloneSession;
use crate::value::{Dyn, Mapping, Pointer, Record, Sequence, Shape, Value};

impl CloneSession<'_> {
    pub(crate) fn clone_pointer(&mut self, src: Option<&Pointer>) -> CloneResult<Value> {
        let Some(src) = src else {
            return Ok(Value::Ref(None));
        };
        let identity = src.identity();
        if let Some(existing) = self.visited.get(&identity) {
            tracing::trace!(%identity, "reusing clone");
            return Ok(existing.clone());
        }

        let shell = Pointer::new(Value::Nil);
        self.visited
            .insert(identity, Value::from(src.clone()), Value::from(shell.clone()));

        let referent = src.get()?;
        let cloned = self.clone_value(&referent)?;
        drop(referent);
        shell.set(cloned)?;

        self.observe(Shape::Reference, Shape::Reference.as_str());
        Ok(Value::from(shell))
    }

    pub(crate) fn clone_sequence(&mut self, src: Option<&Sequence>) -> CloneResult<Value> {
        let Some(src) = src else {
            return Ok(Value::Seq(None));
        };
        let identity = src.identity();
        if let Some(existing) = self.visited.get(&identity) {
            tracing::trace!(%identity, "reusing clone");
            return Ok(existing.clone());
        }

        let items = src.borrow()?;
        let capacity = if self.config().preserve_capacity {
            items.capacity()
        } else {
            items.len()
        };
        let shell = Sequence::with_capacity(capacity);
        self.visited
            .insert(identity, Value::from(src.clone()), Value::from(shell.clone()));

        for item in items.iter() {
            let cloned = self.clone_value(item)?;
            shell.push(cloned)?;
        }
        drop(items);

        self.observe(Shape::Sequence, Shape::Sequence.as_str());
        Ok(Value::from(shell))
    }

    pub(crate) fn clone_array(&mut self, src: &[Value]) -> CloneResult<Value> {
        let mut items = Vec::with_capacity(src.len());
        for item in src {
            items.push(self.clone_value(item)?);
        }

        self.observe(Shape::Array, Shape::Array.as_str());
        Ok(Value::Array(items.into_boxed_slice()))
    }

    pub(crate) fn clone_mapping(&mut self, src: Option<&Mapping>) -> CloneResult<Value> {
        let Some(src) = src else {
            return Ok(Value::Map(None));
        };
        let identity = src.identity();
        if let Some(existing) = self.visited.get(&identity) {
            tracing::trace!(%identity, "reusing clone");
            return Ok(existing.clone());
        }

        let entries = src.borrow()?;
        let shell = Mapping::with_capacity(entries.len());
        self.visited
            .insert(identity, Value::from(src.clone()), Value::from(shell.clone()));

        for (key, value) in entries.iter() {
            let cloned_key = self.clone_value(key)?;
            let cloned_value = self.clone_value(value)?;
            shell.insert(cloned_key, cloned_value)?;
        }
        drop(entries);

        self.observe(Shape::Mapping, Shape::Mapping.as_str());
        Ok(Value::from(shell))
    }

    /// Writable fields are cloned; read-only fields keep their zero value,
    /// which [`FieldDef::with_zero`](crate::FieldDef::with_zero) guarantees
    /// holds no shared storage.
    pub(crate) fn clone_record(&mut self, src: &Record) -> CloneResult<Value> {
        let mut clone = Record::zeroed(src.record_type().clone());
        for (index, (field, value)) in src.iter().enumerate() {
            if !field.is_writable() {
                tracing::debug!(
                    record = src.type_name(),
                    field = field.name(),
                    "leaving read-only field at zero value"
                );
                continue;
            }
            let cloned = self.clone_value(value)?;
            clone.set_field(index, cloned)?;
        }

        self.observe(Shape::Record, src.type_name());
        Ok(Value::Record(clone))
    }

    pub(crate) fn clone_dyn(&mut self, src: &Dyn) -> CloneResult<Value> {
        let Some(inner) = src.inner() else {
            return Ok(Value::Dyn(src.clone()));
        };
        let cloned = self.clone_value(inner)?;

        self.observe(Shape::Polymorphic, src.container());
        Ok(Value::Dyn(src.rewrap(cloned)))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClonerConfig;
    use crate::registry::ExtensionRegistry;
    use crate::session::CloneSession;
    use crate::value::{Dyn, FieldDef, Pointer, Record, RecordType, Sequence, Value};

    fn with_session<R>(f: impl FnOnce(&mut CloneSession<'_>) -> R) -> R {
        let registry = ExtensionRegistry::new();
        let config = ClonerConfig::new();
        let mut session = CloneSession::new(&registry, &config);
        f(&mut session)
    }

    #[test]
    fn pointer_gets_new_storage() {
        let src = Pointer::new(Value::Int(42));
        let cloned = with_session(|s| s.clone_pointer(Some(&src))).unwrap();
        let cloned = cloned.as_pointer().unwrap().clone();

        assert!(!cloned.ptr_eq(&src));
        assert_eq!(*cloned.get().unwrap(), Value::Int(42));
    }

    #[test]
    fn pointer_registered_before_recursing() {
        let src = Pointer::new(Value::Nil);
        src.set(Value::from(src.clone())).unwrap();

        let cloned = with_session(|s| s.clone_pointer(Some(&src))).unwrap();
        let cloned = cloned.as_pointer().unwrap().clone();
        let inner = cloned.get().unwrap().as_pointer().unwrap().clone();
        assert!(inner.ptr_eq(&cloned));

        src.set(Value::Nil).unwrap();
        cloned.set(Value::Nil).unwrap();
    }

    #[test]
    fn sequence_keeps_capacity() {
        let mut items = Vec::with_capacity(32);
        items.push(Value::Int(1));
        let src = Sequence::new(items);

        let cloned = with_session(|s| s.clone_sequence(Some(&src))).unwrap();
        let cloned = cloned.as_sequence().unwrap().clone();
        assert_eq!(cloned.len(), 1);
        assert!(cloned.capacity() >= 32);
    }

    #[test]
    fn absent_handles_stay_absent() {
        assert_eq!(with_session(|s| s.clone_pointer(None)).unwrap(), Value::Ref(None));
        assert_eq!(with_session(|s| s.clone_sequence(None)).unwrap(), Value::Seq(None));
        assert_eq!(with_session(|s| s.clone_mapping(None)).unwrap(), Value::Map(None));
    }

    #[test]
    fn read_only_fields_stay_zero() {
        let ty = RecordType::new(
            "Account",
            vec![
                FieldDef::writable("owner"),
                FieldDef::read_only("secret").with_zero(Value::Int(0)).unwrap(),
            ],
        );
        let src = Record::new(ty, vec![Value::str("ada"), Value::Int(1234)]).unwrap();

        let cloned = with_session(|s| s.clone_record(&src)).unwrap();
        let cloned = cloned.as_record().unwrap();
        assert_eq!(cloned.get("owner"), Some(&Value::str("ada")));
        assert_eq!(cloned.get("secret"), Some(&Value::Int(0)));
    }

    #[test]
    fn writable_nil_field_stays_nil() {
        let ty = RecordType::new(
            "Link",
            vec![FieldDef::writable("next").with_zero(Value::Ref(None)).unwrap()],
        );
        let src = Record::new(ty, vec![Value::Nil]).unwrap();

        let cloned = with_session(|s| s.clone_record(&src)).unwrap();
        assert_eq!(cloned.as_record().unwrap().get("next"), Some(&Value::Nil));
    }

    #[test]
    fn dyn_rewrapped_with_same_container() {
        let src = Dyn::new("Shape", Value::reference(Value::Int(3)));
        let cloned = with_session(|s| s.clone_dyn(&src)).unwrap();
        let cloned = cloned.as_dyn().unwrap();

        assert_eq!(cloned.container(), "Shape");
        assert!(cloned.inner().unwrap().deep_eq(src.inner().unwrap()));
        assert_ne!(cloned.inner(), src.inner());
    }
}
