use std::rc::Rc;

use crate::RecordId;

/// An attribute value.
///
/// Strings are reference counted so that copying a stored descriptor (e.g. during a mixin) never
/// duplicates string data. Records are referenced by handle.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Undefined,
  Null,
  Bool(bool),
  /// An IEEE-754 double.
  Number(f64),
  String(Rc<str>),
  Record(RecordId),
}

impl Value {
  /// `SameValue(x, y)`.
  ///
  /// This differs from `==` for numbers:
  /// - `NaN` is the same as `NaN`
  /// - `+0` and `-0` are distinct
  pub fn same_value(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) => true,
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => {
        if a.is_nan() && b.is_nan() {
          return true;
        }
        if *a == 0.0 && *b == 0.0 {
          // Distinguish +0 and -0.
          return a.to_bits() == b.to_bits();
        }
        a == b
      }
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Record(a), Value::Record(b)) => a == b,
      _ => false,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_record(&self) -> Option<RecordId> {
    match self {
      Value::Record(r) => Some(*r),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Self::Number(value as f64)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::String(Rc::from(value))
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::String(Rc::from(value))
  }
}

impl From<RecordId> for Value {
  fn from(value: RecordId) -> Self {
    Self::Record(value)
  }
}

/// The result of resolving an attribute through a delegation chain.
///
/// `Absent` means no record on the chain owns the name. It is distinct from an attribute that is
/// present and holds [`Value::Undefined`] or [`Value::Null`].
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
  Present(Value),
  Absent,
}

impl Lookup {
  #[inline]
  pub fn is_absent(&self) -> bool {
    matches!(self, Lookup::Absent)
  }

  #[inline]
  pub fn is_present(&self) -> bool {
    !self.is_absent()
  }

  pub fn value(&self) -> Option<&Value> {
    match self {
      Lookup::Present(v) => Some(v),
      Lookup::Absent => None,
    }
  }

  pub fn into_value(self) -> Option<Value> {
    match self {
      Lookup::Present(v) => Some(v),
      Lookup::Absent => None,
    }
  }
}
