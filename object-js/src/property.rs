use crate::{Heap, ObjectError, RecordId, Value};
use std::fmt;
use std::rc::Rc;

/// Host closure backing a computed attribute's getter.
///
/// The second argument is the host context: the record the lookup *started* at, not the record
/// that owns the descriptor.
pub type GetterFn = dyn Fn(&mut Heap, RecordId) -> Result<Value, ObjectError>;

/// Host closure backing a computed attribute's setter.
pub type SetterFn = dyn Fn(&mut Heap, RecordId, Value) -> Result<(), ObjectError>;

/// A shared getter closure.
///
/// Cloning a `Getter` shares the closure, so descriptors copied between records keep the same
/// identity. Equality is pointer identity.
#[derive(Clone)]
pub struct Getter(Rc<GetterFn>);

impl Getter {
  pub fn new(f: impl Fn(&mut Heap, RecordId) -> Result<Value, ObjectError> + 'static) -> Self {
    Self(Rc::new(f))
  }

  /// Invokes the getter with `this` bound as host context.
  #[inline]
  pub fn call(&self, heap: &mut Heap, this: RecordId) -> Result<Value, ObjectError> {
    (self.0)(heap, this)
  }
}

impl PartialEq for Getter {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Getter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Getter({:p})", Rc::as_ptr(&self.0) as *const ())
  }
}

/// A shared setter closure. See [`Getter`] for identity semantics.
#[derive(Clone)]
pub struct Setter(Rc<SetterFn>);

impl Setter {
  pub fn new(
    f: impl Fn(&mut Heap, RecordId, Value) -> Result<(), ObjectError> + 'static,
  ) -> Self {
    Self(Rc::new(f))
  }

  /// Invokes the setter with `this` bound as host context.
  #[inline]
  pub fn call(&self, heap: &mut Heap, this: RecordId, value: Value) -> Result<(), ObjectError> {
    (self.0)(heap, this, value)
  }
}

impl PartialEq for Setter {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Setter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Setter({:p})", Rc::as_ptr(&self.0) as *const ())
  }
}

/// The three per-attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFlags {
  /// Ignored for computed attributes.
  pub writable: bool,
  pub enumerable: bool,
  pub configurable: bool,
}

impl AttributeFlags {
  /// The shorthand defaults: everything off.
  pub const LOCKED: AttributeFlags = AttributeFlags {
    writable: false,
    enumerable: false,
    configurable: false,
  };

  /// Everything on, matching a plain assignment in most dynamic languages.
  pub const OPEN: AttributeFlags = AttributeFlags {
    writable: true,
    enumerable: true,
    configurable: true,
  };
}

impl Default for AttributeFlags {
  fn default() -> Self {
    Self::LOCKED
  }
}

/// A concrete attribute descriptor.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
  pub enumerable: bool,
  pub configurable: bool,
  pub kind: AttributeKind,
}

/// The kind of attribute described by an [`AttributeDescriptor`].
#[derive(Debug, Clone)]
pub enum AttributeKind {
  Stored { value: Value, writable: bool },
  /// At least one of `get`/`set` is present; the constructors enforce this.
  Computed {
    get: Option<Getter>,
    set: Option<Setter>,
  },
}

impl AttributeDescriptor {
  /// Shorthand stored descriptor: not writable, not enumerable, not configurable.
  pub fn stored(value: impl Into<Value>) -> Self {
    Self {
      enumerable: false,
      configurable: false,
      kind: AttributeKind::Stored {
        value: value.into(),
        writable: false,
      },
    }
  }

  /// Computed descriptor with the shorthand (locked) flags.
  ///
  /// Fails with [`ObjectError::Definition`] if neither a getter nor a setter is given.
  pub fn computed(get: Option<Getter>, set: Option<Setter>) -> Result<Self, ObjectError> {
    if get.is_none() && set.is_none() {
      return Err(ObjectError::Definition(
        "computed descriptor requires a getter or a setter",
      ));
    }
    Ok(Self {
      enumerable: false,
      configurable: false,
      kind: AttributeKind::Computed { get, set },
    })
  }

  /// Read-only computed descriptor.
  pub fn getter(get: Getter) -> Self {
    Self {
      enumerable: false,
      configurable: false,
      kind: AttributeKind::Computed {
        get: Some(get),
        set: None,
      },
    }
  }

  /// Write-only computed descriptor.
  pub fn setter(set: Setter) -> Self {
    Self {
      enumerable: false,
      configurable: false,
      kind: AttributeKind::Computed {
        get: None,
        set: Some(set),
      },
    }
  }

  /// Computed descriptor with both halves.
  pub fn accessor(get: Getter, set: Setter) -> Self {
    Self {
      enumerable: false,
      configurable: false,
      kind: AttributeKind::Computed {
        get: Some(get),
        set: Some(set),
      },
    }
  }

  /// Sets `writable`. Has no effect on computed descriptors.
  pub fn writable(mut self, writable: bool) -> Self {
    if let AttributeKind::Stored { writable: w, .. } = &mut self.kind {
      *w = writable;
    }
    self
  }

  pub fn enumerable(mut self, enumerable: bool) -> Self {
    self.enumerable = enumerable;
    self
  }

  pub fn configurable(mut self, configurable: bool) -> Self {
    self.configurable = configurable;
    self
  }

  pub fn with_flags(self, flags: AttributeFlags) -> Self {
    self
      .writable(flags.writable)
      .enumerable(flags.enumerable)
      .configurable(flags.configurable)
  }

  pub fn flags(&self) -> AttributeFlags {
    AttributeFlags {
      writable: self.is_writable(),
      enumerable: self.enumerable,
      configurable: self.configurable,
    }
  }

  #[inline]
  pub fn is_stored(&self) -> bool {
    matches!(self.kind, AttributeKind::Stored { .. })
  }

  #[inline]
  pub fn is_computed(&self) -> bool {
    matches!(self.kind, AttributeKind::Computed { .. })
  }

  /// `true` only for writable stored descriptors.
  pub fn is_writable(&self) -> bool {
    matches!(self.kind, AttributeKind::Stored { writable: true, .. })
  }

  /// The stored value, if this is a stored descriptor.
  pub fn value(&self) -> Option<&Value> {
    match &self.kind {
      AttributeKind::Stored { value, .. } => Some(value),
      AttributeKind::Computed { .. } => None,
    }
  }

  /// Field-by-field equality (values by `SameValue`, closures by identity).
  pub fn same_as(&self, other: &AttributeDescriptor) -> bool {
    self.enumerable == other.enumerable
      && self.configurable == other.configurable
      && match (&self.kind, &other.kind) {
        (
          AttributeKind::Stored { value: a, writable: aw },
          AttributeKind::Stored { value: b, writable: bw },
        ) => aw == bw && a.same_value(b),
        (
          AttributeKind::Computed { get: ag, set: as_ },
          AttributeKind::Computed { get: bg, set: bs },
        ) => ag == bg && as_ == bs,
        _ => false,
      }
  }

  /// Whether replacing `self` (a non-configurable descriptor) with `next` is allowed.
  ///
  /// The only permitted difference is `writable: true -> false` on a stored descriptor.
  pub(crate) fn permits_locked_redefinition(&self, next: &AttributeDescriptor) -> bool {
    if next.configurable || next.enumerable != self.enumerable {
      return false;
    }
    match (&self.kind, &next.kind) {
      (
        AttributeKind::Stored { value, writable },
        AttributeKind::Stored {
          value: next_value,
          writable: next_writable,
        },
      ) => value.same_value(next_value) && (writable == next_writable || *writable && !next_writable),
      (
        AttributeKind::Computed { get, set },
        AttributeKind::Computed {
          get: next_get,
          set: next_set,
        },
      ) => get == next_get && set == next_set,
      _ => false,
    }
  }

  /// Applies a lock: clears `configurable`, and `writable` too when `freeze` is set.
  pub(crate) fn lock(&mut self, freeze: bool) {
    self.configurable = false;
    if freeze {
      if let AttributeKind::Stored { writable, .. } = &mut self.kind {
        *writable = false;
      }
    }
  }
}

impl From<Value> for AttributeDescriptor {
  fn from(value: Value) -> Self {
    Self::stored(value)
  }
}

/// A partial descriptor, as produced by a host that builds descriptors field by field.
///
/// Missing flags take the shorthand defaults (`false`) when converted into an
/// [`AttributeDescriptor`].
#[derive(Debug, Default, Clone)]
pub struct DescriptorPatch {
  pub value: Option<Value>,
  pub writable: Option<bool>,
  pub get: Option<Getter>,
  pub set: Option<Setter>,
  pub enumerable: Option<bool>,
  pub configurable: Option<bool>,
}

impl DescriptorPatch {
  /// Validates the field combination.
  ///
  /// A descriptor cannot be both stored and computed, must be at least one of them, and a stored
  /// descriptor needs a value.
  pub fn validate(&self) -> Result<(), ObjectError> {
    let has_stored = self.value.is_some() || self.writable.is_some();
    let has_computed = self.get.is_some() || self.set.is_some();
    if has_stored && has_computed {
      return Err(ObjectError::Definition(
        "cannot mix stored and computed fields",
      ));
    }
    if !has_stored && !has_computed {
      return Err(ObjectError::Definition(
        "descriptor defines neither a value nor a getter/setter",
      ));
    }
    if has_stored && self.value.is_none() {
      return Err(ObjectError::Definition("stored descriptor requires a value"));
    }
    Ok(())
  }
}

impl TryFrom<DescriptorPatch> for AttributeDescriptor {
  type Error = ObjectError;

  fn try_from(patch: DescriptorPatch) -> Result<Self, Self::Error> {
    patch.validate()?;
    let enumerable = patch.enumerable.unwrap_or(false);
    let configurable = patch.configurable.unwrap_or(false);
    let kind = match patch.value {
      Some(value) => AttributeKind::Stored {
        value,
        writable: patch.writable.unwrap_or(false),
      },
      None => AttributeKind::Computed {
        get: patch.get,
        set: patch.set,
      },
    };
    Ok(Self {
      enumerable,
      configurable,
      kind,
    })
  }
}
