use crate::integrity::Extensibility;
use crate::property::AttributeKind;
use crate::{Heap, ObjectError, RecordId, Value};
use serde::Serialize;

/// A serializable view of one record, for diagnostics.
///
/// Taking a snapshot never runs getters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSnapshot {
  pub index: u32,
  pub extensibility: Extensibility,
  pub delegate: Option<u32>,
  pub attributes: Vec<AttributeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSnapshot {
  pub name: String,
  pub enumerable: bool,
  pub configurable: bool,
  #[serde(flatten)]
  pub kind: KindSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindSnapshot {
  Stored { value: ValueSnapshot, writable: bool },
  Computed { getter: bool, setter: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ValueSnapshot {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(String),
  /// Slot index of the referenced record.
  Record(u32),
}

impl From<&Value> for ValueSnapshot {
  fn from(value: &Value) -> Self {
    match value {
      Value::Undefined => ValueSnapshot::Undefined,
      Value::Null => ValueSnapshot::Null,
      Value::Bool(b) => ValueSnapshot::Bool(*b),
      Value::Number(n) => ValueSnapshot::Number(*n),
      Value::String(s) => ValueSnapshot::String(s.to_string()),
      Value::Record(r) => ValueSnapshot::Record(r.index()),
    }
  }
}

impl Heap {
  /// Captures the own state of `record`. Delegates are referenced by index, not expanded.
  pub fn snapshot(&self, record: RecordId) -> Result<RecordSnapshot, ObjectError> {
    let rec = self.record(record)?;
    let attributes = rec
      .attributes
      .iter()
      .map(|(name, desc)| AttributeSnapshot {
        name: name.to_string(),
        enumerable: desc.enumerable,
        configurable: desc.configurable,
        kind: match &desc.kind {
          AttributeKind::Stored { value, writable } => KindSnapshot::Stored {
            value: value.into(),
            writable: *writable,
          },
          AttributeKind::Computed { get, set } => KindSnapshot::Computed {
            getter: get.is_some(),
            setter: set.is_some(),
          },
        },
      })
      .collect();
    Ok(RecordSnapshot {
      index: record.index(),
      extensibility: rec.extensibility,
      delegate: self.delegate(record)?.map(RecordId::index),
      attributes,
    })
  }
}
