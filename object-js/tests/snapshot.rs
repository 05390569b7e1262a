use object_js::{
  AttributeDescriptor, AttributeFlags, Extensibility, Getter, Heap, KindSnapshot, ObjectError,
  Value, ValueSnapshot,
};
use serde_json::json;

#[test]
fn snapshot_lists_own_attributes_without_running_getters() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let proto = heap.alloc_record();
  let r = heap.alloc_record_with_delegate(Some(proto))?;
  heap.define(
    r,
    "name",
    AttributeDescriptor::stored("box").with_flags(AttributeFlags::OPEN),
  )?;
  heap.define(r, "parent", AttributeDescriptor::stored(Value::Record(proto)))?;
  heap.define(
    r,
    "size",
    AttributeDescriptor::getter(Getter::new(|_, _| {
      Err(ObjectError::Throw(Value::from("getter must not run")))
    })),
  )?;
  heap.seal(r)?;

  let snapshot = heap.snapshot(r)?;
  assert_eq!(snapshot.index, r.index());
  assert_eq!(snapshot.extensibility, Extensibility::Sealed);
  assert_eq!(snapshot.delegate, Some(proto.index()));
  assert_eq!(snapshot.attributes.len(), 3);
  assert_eq!(
    snapshot.attributes[1].kind,
    KindSnapshot::Stored {
      value: ValueSnapshot::Record(proto.index()),
      writable: false,
    }
  );

  let json = serde_json::to_value(&snapshot).unwrap();
  assert_eq!(json["extensibility"], json!("sealed"));
  assert_eq!(
    json["attributes"][0],
    json!({
      "name": "name",
      "enumerable": true,
      "configurable": false,
      "kind": "stored",
      "value": { "type": "string", "value": "box" },
      "writable": true,
    })
  );
  assert_eq!(
    json["attributes"][2],
    json!({
      "name": "size",
      "enumerable": false,
      "configurable": false,
      "kind": "computed",
      "getter": true,
      "setter": false,
    })
  );
  Ok(())
}

#[test]
fn snapshot_of_released_record_fails() -> Result<(), ObjectError> {
  let mut heap = Heap::default();
  let r = heap.alloc_record();
  heap.release(r)?;
  assert!(matches!(heap.snapshot(r), Err(ObjectError::InvalidHandle)));
  Ok(())
}
