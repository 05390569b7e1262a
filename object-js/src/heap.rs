use crate::integrity::Extensibility;
use crate::property::{AttributeDescriptor, AttributeFlags};
use crate::resolve::SetMode;
use crate::{ObjectError, RecordId, WeakRecordId};
use indexmap::IndexMap;
use std::rc::Rc;

/// Default upper bound for delegation chain traversals.
///
/// Cycles are not prevented when a delegate link is set, so every traversal is bounded; a chain
/// longer than this is reported as [`ObjectError::CyclicDelegation`].
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 10_000;

/// Insertion-ordered attribute table of a single record.
pub(crate) type AttributeMap = IndexMap<Rc<str>, AttributeDescriptor, ahash::RandomState>;

/// Construction-time heap options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapOptions {
  /// Maximum number of delegate links followed by a single lookup.
  pub max_delegation_depth: usize,
  /// How [`Heap::set`] reacts to a write against a read-only stored attribute.
  pub set_mode: SetMode,
  /// Flags given to attributes that [`Heap::set`] creates on the receiver.
  ///
  /// Defaults to the shorthand flags ([`AttributeFlags::LOCKED`]); hosts that want assignment to
  /// create ordinary mutable attributes opt in with [`AttributeFlags::OPEN`].
  pub assignment_flags: AttributeFlags,
}

impl Default for HeapOptions {
  fn default() -> Self {
    Self {
      max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
      set_mode: SetMode::Strict,
      assignment_flags: AttributeFlags::LOCKED,
    }
  }
}

/// An arena of object records.
///
/// Records are stored in a `Vec` of slots. Handles store the slot `index` and a per-slot
/// `generation`, which makes handles stable across `Vec` reallocations and allows detection of
/// stale handles when slots are reused.
pub struct Heap {
  options: HeapOptions,

  slots: Vec<Slot>,
  free_list: Vec<u32>,
  live_records: usize,

  /// The ambient record shared by every host routine that runs outside a construction.
  global: RecordId,

  /// Records currently being initialised by [`Heap::instantiate`], innermost last.
  pub(crate) construction_stack: Vec<RecordId>,
}

impl Heap {
  /// Creates a new heap with the provided options.
  pub fn new(options: HeapOptions) -> Self {
    let mut heap = Self {
      options,
      slots: Vec::new(),
      free_list: Vec::new(),
      live_records: 0,
      global: RecordId::new(0, 0),
      construction_stack: Vec::new(),
    };
    heap.global = heap.alloc_record();
    heap
  }

  #[inline]
  pub fn options(&self) -> &HeapOptions {
    &self.options
  }

  /// The ambient, shared record.
  ///
  /// Constructor routines invoked through [`Constructor::safe_invoke`](crate::Constructor) never
  /// write to it.
  #[inline]
  pub fn global(&self) -> RecordId {
    self.global
  }

  /// Number of live records, including the global record.
  #[inline]
  pub fn record_count(&self) -> usize {
    self.live_records
  }

  /// Allocates an empty, extensible record with no delegate.
  pub fn alloc_record(&mut self) -> RecordId {
    self.alloc_slot(ObjectRecord::new(None))
  }

  /// Allocates an empty, extensible record delegating to `delegate`.
  pub fn alloc_record_with_delegate(
    &mut self,
    delegate: Option<RecordId>,
  ) -> Result<RecordId, ObjectError> {
    if let Some(delegate) = delegate {
      self.record(delegate)?;
    }
    let delegate = delegate.map(WeakRecordId::from);
    Ok(self.alloc_slot(ObjectRecord::new(delegate)))
  }

  /// Releases a record and its attribute table.
  ///
  /// Records delegating to it keep a dangling weak link, which resolves as the end of their chain.
  /// The [global](Heap::global) record lives as long as the heap and cannot be released.
  pub fn release(&mut self, record: RecordId) -> Result<(), ObjectError> {
    let idx = self.validate(record).ok_or(ObjectError::InvalidHandle)?;
    if record == self.global {
      return Err(ObjectError::GlobalRecord);
    }
    let slot = &mut self.slots[idx];
    slot.value = None;
    slot.generation = slot.generation.wrapping_add(1);
    self.free_list.push(idx as u32);
    self.live_records -= 1;
    Ok(())
  }

  /// Returns whether `record` points at a live record.
  pub fn is_valid_record(&self, record: RecordId) -> bool {
    self.validate(record).is_some()
  }

  /// Gets a record's delegate.
  ///
  /// A delegate that has since been released reads as `None`.
  pub fn delegate(&self, record: RecordId) -> Result<Option<RecordId>, ObjectError> {
    Ok(
      self
        .record(record)?
        .delegate
        .and_then(|weak| weak.upgrade(self)),
    )
  }

  /// Replaces a record's delegate.
  ///
  /// No cycle check is performed; cyclic chains are caught when they are traversed. Use
  /// [`Heap::try_set_delegate`] to reject cycles up front.
  pub fn set_delegate(
    &mut self,
    record: RecordId,
    delegate: Option<RecordId>,
  ) -> Result<(), ObjectError> {
    if let Some(delegate) = delegate {
      self.record(delegate)?;
    }
    self.record_mut(record)?.delegate = delegate.map(WeakRecordId::from);
    Ok(())
  }

  /// Replaces a record's delegate, rejecting links that would close a cycle.
  pub fn try_set_delegate(
    &mut self,
    record: RecordId,
    delegate: Option<RecordId>,
  ) -> Result<(), ObjectError> {
    self.record(record)?;
    if let Some(delegate) = delegate {
      let chain = self.delegation_chain(delegate)?;
      if chain.contains(&record) {
        return Err(ObjectError::CyclicDelegation(crate::CyclicDelegation {
          depth: chain.len(),
          reason: crate::CycleReason::Revisited,
        }));
      }
    }
    self.set_delegate(record, delegate)
  }

  pub(crate) fn record(&self, record: RecordId) -> Result<&ObjectRecord, ObjectError> {
    let idx = self.validate(record).ok_or(ObjectError::InvalidHandle)?;
    self.slots[idx].value.as_ref().ok_or(ObjectError::InvalidHandle)
  }

  pub(crate) fn record_mut(&mut self, record: RecordId) -> Result<&mut ObjectRecord, ObjectError> {
    let idx = self.validate(record).ok_or(ObjectError::InvalidHandle)?;
    self.slots[idx].value.as_mut().ok_or(ObjectError::InvalidHandle)
  }

  fn validate(&self, id: RecordId) -> Option<usize> {
    let idx = id.index() as usize;
    let slot = self.slots.get(idx)?;
    if slot.generation != id.generation() {
      return None;
    }
    if slot.value.is_none() {
      return None;
    }
    Some(idx)
  }

  fn alloc_slot(&mut self, record: ObjectRecord) -> RecordId {
    let idx = match self.free_list.pop() {
      Some(idx) => idx as usize,
      None => {
        let idx = self.slots.len();
        self.slots.push(Slot::new());
        idx
      }
    };

    let slot = &mut self.slots[idx];
    debug_assert!(slot.value.is_none(), "free list returned an occupied slot");
    slot.value = Some(record);
    self.live_records += 1;

    RecordId::new(idx as u32, slot.generation)
  }
}

impl Default for Heap {
  fn default() -> Self {
    Self::new(HeapOptions::default())
  }
}

#[derive(Debug)]
struct Slot {
  generation: u32,
  value: Option<ObjectRecord>,
}

impl Slot {
  fn new() -> Self {
    Self {
      generation: 0,
      value: None,
    }
  }
}

#[derive(Debug)]
pub(crate) struct ObjectRecord {
  pub(crate) delegate: Option<WeakRecordId>,
  pub(crate) extensibility: Extensibility,
  pub(crate) attributes: AttributeMap,
}

impl ObjectRecord {
  fn new(delegate: Option<WeakRecordId>) -> Self {
    Self {
      delegate,
      extensibility: Extensibility::Extensible,
      attributes: AttributeMap::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn released_slots_are_reused_with_a_new_generation() -> Result<(), ObjectError> {
    let mut heap = Heap::default();
    let a = heap.alloc_record();
    heap.release(a)?;
    assert!(!heap.is_valid_record(a));

    let b = heap.alloc_record();
    assert_eq!(a.index(), b.index());
    assert_ne!(a.generation(), b.generation());
    assert!(matches!(heap.release(a), Err(ObjectError::InvalidHandle)));
    Ok(())
  }

  #[test]
  fn global_record_exists_from_the_start() {
    let heap = Heap::default();
    assert!(heap.is_valid_record(heap.global()));
    assert_eq!(heap.record_count(), 1);
  }

  #[test]
  fn global_record_cannot_be_released() {
    let mut heap = Heap::default();
    let global = heap.global();
    assert!(matches!(heap.release(global), Err(ObjectError::GlobalRecord)));
    assert!(heap.is_valid_record(heap.global()));
    assert_eq!(heap.global(), global);
    assert_eq!(heap.record_count(), 1);
  }
}
