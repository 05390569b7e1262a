use crate::integrity::Extensibility;
use crate::property::{AttributeDescriptor, AttributeKind};
use crate::{CycleReason, CyclicDelegation, Heap, Lookup, ObjectError, RecordId, Value};
use ahash::AHashSet;
use tracing::trace;

/// How a write against a read-only stored attribute is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SetMode {
  /// Fail with [`ObjectError::NotWritable`].
  #[default]
  Strict,
  /// Ignore the write; [`Heap::set`] returns `Ok(false)`.
  Lenient,
}

impl Heap {
  /// Resolves `name` starting at `record`.
  ///
  /// The first record on the delegation chain that owns `name` answers: a stored attribute yields
  /// its value, a computed attribute runs its getter with `record` (not the owner) as host
  /// context. Returns [`Lookup::Absent`] if no record on the chain owns `name`.
  pub fn get(&mut self, record: RecordId, name: &str) -> Result<Lookup, ObjectError> {
    let Some((_, desc)) = self.find_owner(record, name)? else {
      return Ok(Lookup::Absent);
    };
    match desc.kind {
      AttributeKind::Stored { value, .. } => Ok(Lookup::Present(value)),
      AttributeKind::Computed { get: Some(get), .. } => Ok(Lookup::Present(get.call(self, record)?)),
      AttributeKind::Computed { get: None, .. } => {
        Err(ObjectError::NotReadable { name: name.into() })
      }
    }
  }

  /// Whether `name` is owned by `record` or any record on its delegation chain.
  pub fn has(&self, record: RecordId, name: &str) -> Result<bool, ObjectError> {
    Ok(self.find_owner(record, name)?.is_some())
  }

  /// Assigns `value` to `name` on `record` using the heap's default [`SetMode`].
  ///
  /// See [`Heap::set_with_mode`].
  pub fn set(
    &mut self,
    record: RecordId,
    name: &str,
    value: impl Into<Value>,
  ) -> Result<bool, ObjectError> {
    let mode = self.options().set_mode;
    self.set_with_mode(record, name, value, mode)
  }

  /// Assigns `value` to `name` on `record`.
  ///
  /// - If the owning record (searched along the chain) holds a computed attribute, its setter is
  ///   invoked with `record` as host context; without a setter this fails with
  ///   [`ObjectError::NotWritable`] regardless of `mode`.
  /// - If the owner holds a read-only stored attribute, the write fails (strict) or is ignored
  ///   (lenient, returning `Ok(false)`).
  /// - Otherwise the value is written on `record` itself, never on a delegate. A new attribute gets
  ///   [`HeapOptions::assignment_flags`](crate::HeapOptions) and requires `record` to be
  ///   extensible.
  pub fn set_with_mode(
    &mut self,
    record: RecordId,
    name: &str,
    value: impl Into<Value>,
    mode: SetMode,
  ) -> Result<bool, ObjectError> {
    let value = value.into();
    match self.find_owner(record, name)? {
      Some((_, desc)) if desc.is_computed() => {
        let AttributeKind::Computed { set: Some(set), .. } = desc.kind else {
          return Err(ObjectError::NotWritable { name: name.into() });
        };
        set.call(self, record, value)?;
        Ok(true)
      }
      Some((_, desc)) if !desc.is_writable() => match mode {
        SetMode::Strict => Err(ObjectError::NotWritable { name: name.into() }),
        SetMode::Lenient => {
          trace!(record = record.index(), name, "ignored write to read-only attribute");
          Ok(false)
        }
      },
      _ => self.write_own(record, name, value),
    }
  }

  /// The records visited when resolving from `record`, starting with `record` itself.
  pub fn delegation_chain(&self, record: RecordId) -> Result<Vec<RecordId>, ObjectError> {
    let mut chain = Vec::new();
    self.walk_chain(record, |_, id| {
      chain.push(id);
      false
    })?;
    Ok(chain)
  }

  /// Finds the first record on the chain that owns `name`, returning it with a copy of its
  /// descriptor.
  pub(crate) fn find_owner(
    &self,
    record: RecordId,
    name: &str,
  ) -> Result<Option<(RecordId, AttributeDescriptor)>, ObjectError> {
    let mut found = None;
    self.walk_chain(record, |heap, id| match heap.record(id) {
      Ok(rec) => match rec.attributes.get(name) {
        Some(desc) => {
          found = Some((id, desc.clone()));
          true
        }
        None => false,
      },
      Err(_) => false,
    })?;
    if let Some((owner, _)) = &found {
      trace!(
        record = record.index(),
        owner = owner.index(),
        name,
        "resolved attribute"
      );
    }
    Ok(found)
  }

  /// Visits `start` and its delegates in order until `visit` returns `true` or the chain ends.
  ///
  /// Revisiting a record, or following more than `max_delegation_depth` links, aborts with
  /// [`ObjectError::CyclicDelegation`].
  fn walk_chain(
    &self,
    start: RecordId,
    mut visit: impl FnMut(&Heap, RecordId) -> bool,
  ) -> Result<(), ObjectError> {
    let max_depth = self.options().max_delegation_depth;
    let mut visited: AHashSet<RecordId> = AHashSet::new();
    let mut current = start;
    let mut depth = 0usize;
    loop {
      if !visited.insert(current) {
        return Err(ObjectError::CyclicDelegation(CyclicDelegation {
          depth,
          reason: CycleReason::Revisited,
        }));
      }
      // Validates `start`; delegates are validated by `upgrade`.
      let rec = self.record(current)?;
      if visit(self, current) {
        return Ok(());
      }
      let Some(next) = rec.delegate.and_then(|weak| weak.upgrade(self)) else {
        return Ok(());
      };
      depth += 1;
      if depth > max_depth {
        return Err(ObjectError::CyclicDelegation(CyclicDelegation {
          depth: max_depth,
          reason: CycleReason::DepthExceeded,
        }));
      }
      current = next;
    }
  }

  fn write_own(&mut self, record: RecordId, name: &str, value: Value) -> Result<bool, ObjectError> {
    let flags = self.options().assignment_flags;
    let rec = self.record_mut(record)?;
    if let Some(desc) = rec.attributes.get_mut(name) {
      // Only reached when `record` itself owns a writable stored attribute.
      if let AttributeKind::Stored { value: slot, .. } = &mut desc.kind {
        *slot = value;
      }
      return Ok(true);
    }
    if rec.extensibility != Extensibility::Extensible {
      return Err(ObjectError::NotExtensible { name: name.into() });
    }
    rec
      .attributes
      .insert(name.into(), AttributeDescriptor::stored(value).with_flags(flags));
    Ok(true)
  }
}
