use object_js::{
  AttributeDescriptor, AttributeFlags, Getter, Heap, ObjectError, RecordId, Setter, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

fn open_stored(value: impl Into<Value>) -> AttributeDescriptor {
  AttributeDescriptor::stored(value).with_flags(AttributeFlags::OPEN)
}

fn describe_getter() -> Getter {
  Getter::new(|heap, this| {
    let name = heap
      .get(this, "name")?
      .into_value()
      .unwrap_or(Value::Undefined);
    Ok(match name {
      Value::String(s) => Value::from(format!("I am {s}")),
      _ => Value::from("I am nobody"),
    })
  })
}

#[test]
fn mixed_in_getter_runs_against_the_receiver() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let supplier = heap.alloc_record();
  heap.define(supplier, "name", open_stored("supplier"))?;
  heap.define(
    supplier,
    "describe",
    AttributeDescriptor::getter(describe_getter()).enumerable(true),
  )?;

  let receiver = heap.alloc_record();
  heap.define(receiver, "name", open_stored("receiver"))?;

  let report = heap.mixin(receiver, supplier)?;
  assert!(report.is_complete());
  assert_eq!(report.into_result().ok(), Some(receiver));

  // The descriptor itself was copied, not the value the getter produced on the supplier.
  let copied = heap.get_own(receiver, "describe")?.unwrap();
  assert!(copied.is_computed());
  assert!(copied.same_as(&heap.get_own(supplier, "describe")?.unwrap()));

  // `name` was copied too (it is enumerable), so set it back after the mixin.
  heap.set(receiver, "name", "receiver")?;
  assert_eq!(
    heap.get(receiver, "describe")?.into_value(),
    Some(Value::from("I am receiver"))
  );
  assert_eq!(
    heap.get(supplier, "describe")?.into_value(),
    Some(Value::from("I am supplier"))
  );
  Ok(())
}

#[test]
fn mixed_in_setter_writes_to_the_receiver() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let targets: Rc<RefCell<Vec<RecordId>>> = Rc::default();
  let seen = targets.clone();
  let supplier = heap.alloc_record();
  heap.define(
    supplier,
    "label",
    AttributeDescriptor::setter(Setter::new(move |heap, this, value| {
      seen.borrow_mut().push(this);
      heap.define(this, "_label", open_stored(value))
    }))
    .enumerable(true),
  )?;
  let receiver = heap.alloc_record();
  assert!(heap.mixin(receiver, supplier)?.is_complete());

  heap.set(receiver, "label", "x")?;
  assert_eq!(*targets.borrow(), vec![receiver]);
  assert!(heap.has_own(receiver, "_label")?);
  assert!(!heap.has_own(supplier, "_label")?);
  Ok(())
}

#[test]
fn mixin_skips_non_enumerable_attributes_and_keeps_flags() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let supplier = heap.alloc_record();
  heap.define(supplier, "hidden", AttributeDescriptor::stored(1))?;
  heap.define(
    supplier,
    "shown",
    AttributeDescriptor::stored(2).enumerable(true),
  )?;
  let receiver = heap.alloc_record();

  let report = heap.mixin(receiver, supplier)?;
  assert_eq!(
    report.copied.iter().map(|n| &**n).collect::<Vec<_>>(),
    ["shown"]
  );
  assert!(!heap.has_own(receiver, "hidden")?);

  let desc = heap.get_own(receiver, "shown")?.unwrap();
  assert!(!desc.is_writable());
  assert!(!desc.configurable);
  assert!(desc.enumerable);
  Ok(())
}

#[test]
fn mixin_does_not_grant_access_to_the_suppliers_delegates() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let supplier_proto = heap.alloc_record();
  heap.define(supplier_proto, "inherited", open_stored("from proto"))?;
  let supplier = heap.alloc_record_with_delegate(Some(supplier_proto))?;
  heap.define(supplier, "own", open_stored("from supplier"))?;
  assert!(heap.has(supplier, "inherited")?);

  let receiver_proto = heap.alloc_record();
  let receiver = heap.alloc_record_with_delegate(Some(receiver_proto))?;
  let report = heap.mixin(receiver, supplier)?;
  assert!(report.is_complete());

  assert_eq!(heap.delegate(receiver)?, Some(receiver_proto));
  assert_eq!(
    heap.get(receiver, "own")?.into_value(),
    Some(Value::from("from supplier"))
  );
  assert!(heap.get(receiver, "inherited")?.is_absent());
  Ok(())
}

#[test]
fn mixin_into_sealed_receiver_reports_every_failure_and_continues() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let supplier = heap.alloc_record();
  heap.define(supplier, "a", open_stored("new a"))?;
  heap.define(supplier, "b", open_stored("new b"))?;
  heap.define(supplier, "c", open_stored("new c"))?;
  heap.define(supplier, "d", open_stored("new d"))?;

  let receiver = heap.alloc_record();
  heap.define(receiver, "b", open_stored("old b"))?;
  heap.define(receiver, "d", AttributeDescriptor::stored("old d"))?;
  heap.prevent_extensions(receiver)?;

  let report = heap.mixin(receiver, supplier)?;
  assert_eq!(report.receiver, receiver);
  assert_eq!(report.copied.iter().map(|n| &**n).collect::<Vec<_>>(), ["b"]);

  let failures: Vec<(&str, &ObjectError)> = report
    .failures
    .iter()
    .map(|f| (&*f.name, &f.error))
    .collect();
  assert_eq!(failures.len(), 3);
  assert!(matches!(failures[0], ("a", ObjectError::NotExtensible { .. })));
  assert!(matches!(failures[1], ("c", ObjectError::NotExtensible { .. })));
  assert!(matches!(failures[2], ("d", ObjectError::NotConfigurable { .. })));
  assert!(report.failures.iter().all(|f| f.supplier == supplier));

  assert_eq!(heap.get(receiver, "b")?.into_value(), Some(Value::from("new b")));
  assert_eq!(heap.get(receiver, "d")?.into_value(), Some(Value::from("old d")));
  assert!(!heap.has_own(receiver, "a")?);

  let err = report.into_result().unwrap_err();
  assert_eq!(err.failures.len(), 3);
  let message = err.to_string();
  assert!(message.contains("failed on 3"), "{message}");
  assert!(message.contains("`a`"), "{message}");
  Ok(())
}

#[test]
fn mixin_all_applies_suppliers_in_order() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let first = heap.alloc_record();
  heap.define(first, "x", open_stored(1))?;
  heap.define(first, "y", open_stored(1))?;
  let second = heap.alloc_record();
  heap.define(second, "y", open_stored(2))?;

  let receiver = heap.alloc_record();
  let report = heap.mixin_all(receiver, &[first, second])?;
  assert!(report.is_complete());
  assert_eq!(report.copied.len(), 3);
  assert_eq!(heap.get(receiver, "x")?.into_value(), Some(Value::Number(1.0)));
  assert_eq!(heap.get(receiver, "y")?.into_value(), Some(Value::Number(2.0)));
  assert_eq!(heap.own_keys(receiver, true)?.collect::<Vec<_>>(), ["x", "y"]);
  Ok(())
}

#[test]
fn mixin_with_released_supplier_fails_as_a_whole() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let supplier = heap.alloc_record();
  let receiver = heap.alloc_record();
  heap.release(supplier)?;
  assert!(matches!(
    heap.mixin(receiver, supplier),
    Err(ObjectError::InvalidHandle)
  ));
  Ok(())
}

#[test]
fn mixin_all_with_a_stale_supplier_copies_nothing() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let good = heap.alloc_record();
  heap.define(good, "x", open_stored(true))?;
  let stale = heap.alloc_record();
  heap.define(stale, "y", open_stored(true))?;
  heap.release(stale)?;

  let receiver = heap.alloc_record();
  assert!(matches!(
    heap.mixin_all(receiver, &[good, stale]),
    Err(ObjectError::InvalidHandle)
  ));
  assert!(!heap.has_own(receiver, "x")?);
  assert_eq!(heap.own_keys(receiver, false)?.count(), 0);

  // A stale receiver is rejected the same way.
  let gone = heap.alloc_record();
  heap.release(gone)?;
  assert!(matches!(
    heap.mixin_all(gone, &[good]),
    Err(ObjectError::InvalidHandle)
  ));
  Ok(())
}
