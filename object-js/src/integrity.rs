use crate::{Heap, ObjectError, RecordId};
use serde::Serialize;
use tracing::debug;

/// Extensibility lock of a record.
///
/// The states are ordered and a record only ever moves forward:
/// `Extensible < Sealed < Frozen`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extensibility {
  /// Attributes may be added and removed.
  #[default]
  Extensible,
  /// No attributes may be added or removed. Writable stored attributes and setters still work.
  Sealed,
  /// No attributes may be added or removed and stored values are read-only. Computed attributes
  /// keep their getters and setters.
  Frozen,
}

impl Heap {
  pub fn extensibility(&self, record: RecordId) -> Result<Extensibility, ObjectError> {
    Ok(self.record(record)?.extensibility)
  }

  pub fn is_extensible(&self, record: RecordId) -> Result<bool, ObjectError> {
    Ok(self.extensibility(record)? == Extensibility::Extensible)
  }

  /// Forbids adding (and removing) attributes without touching existing descriptors.
  ///
  /// Idempotent. A frozen record stays frozen.
  pub fn prevent_extensions(&mut self, record: RecordId) -> Result<(), ObjectError> {
    self.tighten(record, Extensibility::Sealed)
  }

  /// Moves the record to at least [`Extensibility::Sealed`] and makes every own attribute
  /// non-configurable.
  ///
  /// Delegates are not affected.
  pub fn seal(&mut self, record: RecordId) -> Result<(), ObjectError> {
    self.tighten(record, Extensibility::Sealed)?;
    for desc in self.record_mut(record)?.attributes.values_mut() {
      desc.lock(false);
    }
    Ok(())
  }

  /// Moves the record to [`Extensibility::Frozen`], making every own attribute non-configurable
  /// and every own stored attribute read-only.
  ///
  /// Getters and setters of computed attributes stay callable. Delegates are not affected.
  pub fn freeze(&mut self, record: RecordId) -> Result<(), ObjectError> {
    self.tighten(record, Extensibility::Frozen)?;
    for desc in self.record_mut(record)?.attributes.values_mut() {
      desc.lock(true);
    }
    Ok(())
  }

  /// `true` if the record is not extensible and all own attributes are non-configurable.
  pub fn is_sealed(&self, record: RecordId) -> Result<bool, ObjectError> {
    let rec = self.record(record)?;
    Ok(
      rec.extensibility >= Extensibility::Sealed
        && rec.attributes.values().all(|desc| !desc.configurable),
    )
  }

  /// `true` if the record is sealed and no own stored attribute is writable.
  pub fn is_frozen(&self, record: RecordId) -> Result<bool, ObjectError> {
    let rec = self.record(record)?;
    Ok(
      rec.extensibility >= Extensibility::Sealed
        && rec
          .attributes
          .values()
          .all(|desc| !desc.configurable && !desc.is_writable()),
    )
  }

  fn tighten(&mut self, record: RecordId, to: Extensibility) -> Result<(), ObjectError> {
    let rec = self.record_mut(record)?;
    let from = rec.extensibility;
    if from < to {
      rec.extensibility = to;
      debug!(record = record.index(), ?from, ?to, "extensibility tightened");
    }
    Ok(())
  }
}
