use crate::integrity::Extensibility;
use crate::property::AttributeDescriptor;
use crate::{Heap, ObjectError, RecordId};
use core::iter::FusedIterator;
use std::rc::Rc;

impl Heap {
  /// Declares or redefines an own attribute.
  ///
  /// - Adding a new name requires the record to be [`Extensible`](Extensibility::Extensible).
  /// - Replacing a non-configurable descriptor is only allowed when the replacement is identical,
  ///   or differs solely by turning `writable` off on a stored descriptor.
  ///
  /// A redefined name keeps its original position in [`Heap::own_keys`].
  pub fn define(
    &mut self,
    record: RecordId,
    name: &str,
    desc: AttributeDescriptor,
  ) -> Result<(), ObjectError> {
    let rec = self.record_mut(record)?;
    match rec.attributes.get_mut(name) {
      Some(current) => {
        if !current.configurable && !current.permits_locked_redefinition(&desc) {
          return Err(ObjectError::NotConfigurable { name: name.into() });
        }
        *current = desc;
      }
      None => {
        if rec.extensibility != Extensibility::Extensible {
          return Err(ObjectError::NotExtensible { name: name.into() });
        }
        rec.attributes.insert(Rc::from(name), desc);
      }
    }
    Ok(())
  }

  /// Defines several attributes in order, stopping at the first failure.
  ///
  /// Attributes defined before the failure stay defined.
  pub fn define_many<'n>(
    &mut self,
    record: RecordId,
    attributes: impl IntoIterator<Item = (&'n str, AttributeDescriptor)>,
  ) -> Result<(), ObjectError> {
    for (name, desc) in attributes {
      self.define(record, name, desc)?;
    }
    Ok(())
  }

  /// Removes an own attribute.
  ///
  /// Returns `Ok(false)` if the record has no such attribute.
  pub fn remove(&mut self, record: RecordId, name: &str) -> Result<bool, ObjectError> {
    let rec = self.record_mut(record)?;
    let Some(current) = rec.attributes.get(name) else {
      return Ok(false);
    };
    if !current.configurable {
      return Err(ObjectError::NotConfigurable { name: name.into() });
    }
    if rec.extensibility != Extensibility::Extensible {
      return Err(ObjectError::Sealed { name: name.into() });
    }
    // `shift_remove` keeps the remaining names in declaration order.
    rec.attributes.shift_remove(name);
    Ok(true)
  }

  /// Whether `record` itself owns `name`. The delegation chain is not consulted.
  pub fn has_own(&self, record: RecordId, name: &str) -> Result<bool, ObjectError> {
    Ok(self.record(record)?.attributes.contains_key(name))
  }

  /// Returns a copy of the own descriptor for `name`, if present.
  pub fn get_own(
    &self,
    record: RecordId,
    name: &str,
  ) -> Result<Option<AttributeDescriptor>, ObjectError> {
    Ok(self.record(record)?.attributes.get(name).cloned())
  }

  /// Lazily iterates the record's own attribute names in declaration order.
  ///
  /// With `enumerable_only`, non-enumerable attributes are skipped. The iterator borrows the heap,
  /// is finite, and can be cloned to restart from the current position.
  pub fn own_keys(&self, record: RecordId, enumerable_only: bool) -> Result<OwnKeys<'_>, ObjectError> {
    Ok(OwnKeys {
      entries: self.record(record)?.attributes.iter(),
      enumerable_only,
    })
  }
}

/// Iterator returned by [`Heap::own_keys`].
#[derive(Clone)]
pub struct OwnKeys<'a> {
  entries: indexmap::map::Iter<'a, Rc<str>, AttributeDescriptor>,
  enumerable_only: bool,
}

impl<'a> Iterator for OwnKeys<'a> {
  type Item = &'a str;

  fn next(&mut self) -> Option<Self::Item> {
    for (name, desc) in self.entries.by_ref() {
      if !self.enumerable_only || desc.enumerable {
        return Some(&**name);
      }
    }
    None
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let (_, upper) = self.entries.size_hint();
    if self.enumerable_only {
      (0, upper)
    } else {
      self.entries.size_hint()
    }
  }
}

impl FusedIterator for OwnKeys<'_> {}
