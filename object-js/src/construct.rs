use crate::{Heap, ObjectError, RecordId, Value, WeakRecordId};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, debug_span};

/// Host closure implementing a constructor body.
///
/// Receives the fresh record as host context. Returning [`Value::Record`] replaces the fresh
/// record as the construction result; any other value is ignored.
pub type ConstructorFn = dyn Fn(&mut Heap, RecordId, &[Value]) -> Result<Value, ObjectError>;

/// A constructor routine guarded against running on ambient state.
#[derive(Clone)]
pub struct Constructor {
  name: Rc<str>,
  prototype: Option<WeakRecordId>,
  body: Rc<ConstructorFn>,
}

impl Constructor {
  pub fn new(
    name: &str,
    body: impl Fn(&mut Heap, RecordId, &[Value]) -> Result<Value, ObjectError> + 'static,
  ) -> Self {
    Self {
      name: Rc::from(name),
      prototype: None,
      body: Rc::new(body),
    }
  }

  /// Records created by this constructor delegate to `prototype`.
  pub fn with_prototype(mut self, prototype: RecordId) -> Self {
    self.prototype = Some(prototype.downgrade());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The prototype record, if one was set and is still alive.
  pub fn prototype(&self, heap: &Heap) -> Option<RecordId> {
    self.prototype.and_then(|weak| weak.upgrade(heap))
  }

  /// Runs the constructor body against `maybe_context` only if that record is currently being
  /// constructed by [`Heap::instantiate`].
  ///
  /// Any other context (none, [`Heap::global`], or an unrelated record) is treated as ambient and
  /// the call is re-routed through [`Heap::instantiate`], so the body always writes to a fresh
  /// record.
  pub fn safe_invoke(
    &self,
    heap: &mut Heap,
    maybe_context: Option<RecordId>,
    args: &[Value],
  ) -> Result<RecordId, ObjectError> {
    match maybe_context {
      Some(context) if heap.is_constructing(context) => {
        let returned = (self.body)(heap, context, args)?;
        heap.construction_result(context, returned)
      }
      _ => {
        debug!(
          constructor = %self.name,
          context = ?maybe_context.map(RecordId::index),
          "constructor invoked outside construction; instantiating"
        );
        heap.instantiate(self, args)
      }
    }
  }
}

impl fmt::Debug for Constructor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Constructor")
      .field("name", &self.name)
      .field("prototype", &self.prototype)
      .finish_non_exhaustive()
  }
}

impl Heap {
  /// Allocates a fresh record, runs `ctor` with it as host context, and returns it.
  ///
  /// If the body returns a [`Value::Record`], that record is returned instead. The fresh record is
  /// released whenever it is not the result: when the body fails, and when the body substitutes
  /// another record. Anything still pointing at it afterwards holds a stale handle.
  pub fn instantiate(&mut self, ctor: &Constructor, args: &[Value]) -> Result<RecordId, ObjectError> {
    let span = debug_span!(
      "object_js.instantiate",
      constructor = %ctor.name,
      record = tracing::field::Empty,
      overridden = tracing::field::Empty,
    );
    let _guard = span.enter();

    let fresh = self.alloc_record_with_delegate(ctor.prototype(self))?;
    self.construction_stack.push(fresh);
    let returned = (ctor.body)(self, fresh, args);
    let popped = self.construction_stack.pop();
    debug_assert_eq!(popped, Some(fresh), "unbalanced construction stack");

    let record = match returned.and_then(|value| self.construction_result(fresh, value)) {
      Ok(record) => record,
      Err(err) => {
        self.discard_fresh(fresh);
        return Err(err);
      }
    };
    if record != fresh {
      self.discard_fresh(fresh);
    }
    span.record("record", record.index());
    span.record("overridden", record != fresh);
    Ok(record)
  }

  fn discard_fresh(&mut self, fresh: RecordId) {
    // The body may already have released it.
    if self.is_valid_record(fresh) {
      let released = self.release(fresh);
      debug_assert!(released.is_ok(), "fresh record could not be released");
      debug!(record = fresh.index(), "released unused construction record");
    }
  }

  /// Whether `record` is currently being initialised by [`Heap::instantiate`].
  pub fn is_constructing(&self, record: RecordId) -> bool {
    self.construction_stack.contains(&record)
  }

  fn construction_result(&self, fresh: RecordId, returned: Value) -> Result<RecordId, ObjectError> {
    match returned {
      Value::Record(record) if self.is_valid_record(record) => Ok(record),
      Value::Record(_) => Err(ObjectError::InvalidHandle),
      _ if self.is_valid_record(fresh) => Ok(fresh),
      _ => Err(ObjectError::InvalidHandle),
    }
  }
}
