use core::fmt;

use crate::Heap;

/// A handle to an object record owned by a [`Heap`](crate::Heap).
///
/// `index` picks the heap slot; `generation` is the slot's release count at allocation time. A
/// handle whose generation no longer matches its slot is stale and yields
/// [`ObjectError::InvalidHandle`](crate::ObjectError::InvalidHandle).
///
/// Holding a `RecordId` does not keep the record alive: the heap owns every record until
/// [`Heap::release`](crate::Heap::release) is called.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
  index: u32,
  generation: u32,
}

impl RecordId {
  #[inline]
  pub(crate) fn new(index: u32, generation: u32) -> Self {
    Self { index, generation }
  }

  #[inline]
  pub fn index(self) -> u32 {
    self.index
  }

  #[inline]
  pub fn generation(self) -> u32 {
    self.generation
  }

  /// Downgrades this handle into the non-owning form used for delegation links.
  #[inline]
  pub fn downgrade(self) -> WeakRecordId {
    WeakRecordId(self)
  }
}

impl fmt::Debug for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "RecordId({}@{})", self.index, self.generation)
  }
}

/// A delegation link.
///
/// A delegate that has been released simply stops resolving: [`WeakRecordId::upgrade`] returns
/// `None` and the chain terminates at that link.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WeakRecordId(RecordId);

impl WeakRecordId {
  /// Returns the record only if it is still live in `heap`.
  #[inline]
  pub fn upgrade(self, heap: &Heap) -> Option<RecordId> {
    heap.is_valid_record(self.0).then_some(self.0)
  }
}

impl From<RecordId> for WeakRecordId {
  #[inline]
  fn from(record: RecordId) -> Self {
    record.downgrade()
  }
}
