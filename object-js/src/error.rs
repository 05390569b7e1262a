use crate::value::Value;
use std::fmt::Display;
use std::rc::Rc;

/// Errors produced by record, descriptor and delegation operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ObjectError {
  /// A record handle was used after the record was released (or the handle is otherwise
  /// malformed).
  #[error("invalid handle")]
  InvalidHandle,

  /// Attempted to release the heap's global record.
  #[error("the global record cannot be released")]
  GlobalRecord,

  /// A descriptor is malformed (mixes stored and computed fields, or defines neither).
  #[error("invalid descriptor: {0}")]
  Definition(&'static str),

  /// Attempted to add an attribute to a record that is no longer extensible.
  #[error("cannot add attribute `{name}`: record is not extensible")]
  NotExtensible { name: Rc<str> },

  /// Attempted to redefine or remove a non-configurable attribute.
  #[error("attribute `{name}` is not configurable")]
  NotConfigurable { name: Rc<str> },

  /// Attempted to remove an attribute from a sealed or frozen record.
  #[error("cannot remove attribute `{name}`: record is sealed")]
  Sealed { name: Rc<str> },

  /// Attempted to assign to a read-only stored attribute, or a computed attribute without a
  /// setter.
  #[error("attribute `{name}` is not writable")]
  NotWritable { name: Rc<str> },

  /// Attempted to read a computed attribute that has no getter.
  #[error("attribute `{name}` is not readable")]
  NotReadable { name: Rc<str> },

  /// A delegation chain traversal revisited a record or exceeded the configured depth bound.
  #[error("{0}")]
  CyclicDelegation(CyclicDelegation),

  /// A value raised by a host getter, setter or constructor body.
  #[error("uncaught exception")]
  Throw(Value),
}

impl ObjectError {
  /// The attribute name this error refers to, if any.
  pub fn attribute(&self) -> Option<&str> {
    match self {
      ObjectError::NotExtensible { name }
      | ObjectError::NotConfigurable { name }
      | ObjectError::Sealed { name }
      | ObjectError::NotWritable { name }
      | ObjectError::NotReadable { name } => Some(name),
      _ => None,
    }
  }
}

/// Details of a rejected delegation chain traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicDelegation {
  /// Number of links followed before the traversal was aborted.
  pub depth: usize,
  pub reason: CycleReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleReason {
  /// A record appeared twice on the chain.
  Revisited,
  /// The chain is longer than `HeapOptions::max_delegation_depth`.
  DepthExceeded,
}

impl Display for CyclicDelegation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.reason {
      CycleReason::Revisited => write!(
        f,
        "cyclic delegation chain: record revisited after {} links",
        self.depth
      ),
      CycleReason::DepthExceeded => write!(
        f,
        "cyclic delegation chain: exceeded depth bound of {} links",
        self.depth
      ),
    }
  }
}
