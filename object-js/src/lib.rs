//! Dynamic object records for `ecma-rs`: attribute descriptors, delegation chains, mixins and
//! extensibility locks.
//!
//! This crate models objects as mutable collections of named attributes. It provides:
//! - An arena of records with stable, generation-checked handles ([`Heap`], [`RecordId`])
//! - Stored and computed attribute descriptors ([`AttributeDescriptor`], [`AttributeKind`])
//! - Chained lookup and assignment through delegate records ([`Heap::get`], [`Heap::set`])
//! - Monotonic extensibility locks ([`Heap::prevent_extensions`], [`Heap::seal`],
//!   [`Heap::freeze`])
//! - Descriptor-level mixins with partial-failure reports ([`Heap::mixin`])
//! - Guarded constructor routines ([`Constructor`], [`Heap::instantiate`])
//!
//! # Handles and delegation
//!
//! Records are owned by the heap and referenced using handles. A handle contains
//! `{ index, generation }`; the `index` points into the heap slot vector and the `generation` is
//! incremented every time that slot is released.
//!
//! A record's delegate is stored as a [`WeakRecordId`]. Delegates may be shared by any number of
//! records and are never kept alive by them: once a delegate is released, lookups through it stop
//! at the dangling link.
//!
//! Setting a delegate does not check for cycles. Every traversal tracks the records it visited and
//! is bounded by [`HeapOptions::max_delegation_depth`], so a cyclic chain surfaces as
//! [`ObjectError::CyclicDelegation`] instead of a hang.
//!
//! # Assignment and shadowing
//!
//! [`Heap::set`] never writes to a delegate. If the attribute is inherited from a writable stored
//! descriptor (or not found at all), the value is written to the receiver, shadowing the
//! delegate's attribute. Computed attributes run their setter with the receiver as host context.
//!
//! # Threading
//!
//! The heap is single-threaded. Getters, setters and constructor bodies are `Rc`-shared closures,
//! which keeps [`Heap`] `!Send`; hosts that share records across threads must serialise access
//! themselves.

mod construct;
mod error;
mod handle;
mod heap;
mod integrity;
mod mixin;
mod object_ops;
mod property;
mod resolve;
mod snapshot;
mod value;

pub use crate::construct::Constructor;
pub use crate::construct::ConstructorFn;
pub use crate::error::CycleReason;
pub use crate::error::CyclicDelegation;
pub use crate::error::ObjectError;
pub use crate::handle::RecordId;
pub use crate::handle::WeakRecordId;
pub use crate::heap::Heap;
pub use crate::heap::HeapOptions;
pub use crate::heap::DEFAULT_MAX_DELEGATION_DEPTH;
pub use crate::integrity::Extensibility;
pub use crate::mixin::MixinError;
pub use crate::mixin::MixinFailure;
pub use crate::mixin::MixinReport;
pub use crate::object_ops::OwnKeys;
pub use crate::property::AttributeDescriptor;
pub use crate::property::AttributeFlags;
pub use crate::property::AttributeKind;
pub use crate::property::DescriptorPatch;
pub use crate::property::Getter;
pub use crate::property::GetterFn;
pub use crate::property::Setter;
pub use crate::property::SetterFn;
pub use crate::resolve::SetMode;
pub use crate::snapshot::AttributeSnapshot;
pub use crate::snapshot::KindSnapshot;
pub use crate::snapshot::RecordSnapshot;
pub use crate::snapshot::ValueSnapshot;
pub use crate::value::Lookup;
pub use crate::value::Value;
