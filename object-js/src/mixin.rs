use crate::property::AttributeDescriptor;
use crate::{Heap, ObjectError, RecordId};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, debug_span};

/// Outcome of a mixin.
///
/// Per-attribute failures do not abort the copy; inspect [`MixinReport::failures`] (or call
/// [`MixinReport::into_result`]) to find out which attributes did not make it.
#[derive(Debug, Clone)]
pub struct MixinReport {
  pub receiver: RecordId,
  /// Names successfully defined on the receiver, in copy order.
  pub copied: Vec<Rc<str>>,
  pub failures: Vec<MixinFailure>,
}

/// One attribute that could not be copied.
#[derive(Debug, Clone)]
pub struct MixinFailure {
  pub supplier: RecordId,
  pub name: Rc<str>,
  pub error: ObjectError,
}

impl MixinReport {
  fn new(receiver: RecordId) -> Self {
    Self {
      receiver,
      copied: Vec::new(),
      failures: Vec::new(),
    }
  }

  /// `true` if every attribute was copied.
  pub fn is_complete(&self) -> bool {
    self.failures.is_empty()
  }

  /// Returns the receiver when every attribute was copied, otherwise the aggregated failure.
  pub fn into_result(self) -> Result<RecordId, MixinError> {
    if self.is_complete() {
      Ok(self.receiver)
    } else {
      Err(MixinError {
        receiver: self.receiver,
        copied: self.copied,
        failures: self.failures,
      })
    }
  }
}

/// Aggregated failure of a partially applied mixin.
#[derive(Debug, Clone)]
pub struct MixinError {
  pub receiver: RecordId,
  pub copied: Vec<Rc<str>>,
  pub failures: Vec<MixinFailure>,
}

impl fmt::Display for MixinError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "mixin copied {} attribute(s) but failed on {}:",
      self.copied.len(),
      self.failures.len()
    )?;
    for failure in &self.failures {
      write!(f, "\n  {}: {}", failure.name, failure.error)?;
    }
    Ok(())
  }
}

impl std::error::Error for MixinError {}

impl Heap {
  /// Copies every own enumerable attribute of `supplier` onto `receiver`.
  ///
  /// Whole descriptors are copied, so a computed attribute stays computed and its getter/setter
  /// run with whichever record they are resolved from. The receiver's delegate link is left
  /// alone, which means anything the supplier only inherits is not reachable from the receiver.
  ///
  /// Failures for individual names are collected into the report. Only an invalid handle aborts,
  /// and it does so before any attribute is copied.
  pub fn mixin(
    &mut self,
    receiver: RecordId,
    supplier: RecordId,
  ) -> Result<MixinReport, ObjectError> {
    self.mixin_all(receiver, &[supplier])
  }

  /// Applies several suppliers in order; later suppliers overwrite earlier ones where the
  /// receiver allows it.
  ///
  /// Every handle is validated first: if any of them is stale the call fails with
  /// [`ObjectError::InvalidHandle`] and the receiver is untouched.
  pub fn mixin_all(
    &mut self,
    receiver: RecordId,
    suppliers: &[RecordId],
  ) -> Result<MixinReport, ObjectError> {
    let span = debug_span!(
      "object_js.mixin",
      receiver = receiver.index(),
      suppliers = suppliers.len(),
      copied = tracing::field::Empty,
      failed = tracing::field::Empty,
    );
    let _guard = span.enter();

    // Handles are checked before anything is copied, so `InvalidHandle` leaves the receiver as
    // it was.
    self.record(receiver)?;
    for &supplier in suppliers {
      self.record(supplier)?;
    }
    let mut report = MixinReport::new(receiver);
    for &supplier in suppliers {
      self.mixin_one(&mut report, supplier)?;
    }

    span.record("copied", report.copied.len());
    span.record("failed", report.failures.len());
    Ok(report)
  }

  fn mixin_one(&mut self, report: &mut MixinReport, supplier: RecordId) -> Result<(), ObjectError> {
    // Snapshot first: the receiver and supplier may be the same record.
    let entries: Vec<(Rc<str>, AttributeDescriptor)> = self
      .record(supplier)?
      .attributes
      .iter()
      .filter(|(_, desc)| desc.enumerable)
      .map(|(name, desc)| (name.clone(), desc.clone()))
      .collect();

    for (name, desc) in entries {
      match self.define(report.receiver, &name, desc) {
        Ok(()) => report.copied.push(name),
        Err(ObjectError::InvalidHandle) => return Err(ObjectError::InvalidHandle),
        Err(error) => {
          debug!(supplier = supplier.index(), %name, %error, "mixin skipped attribute");
          report.failures.push(MixinFailure {
            supplier,
            name,
            error,
          });
        }
      }
    }
    Ok(())
  }
}
