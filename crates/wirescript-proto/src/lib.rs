//! Message-type registry and wire codec for the Wirescript protocol engine.
//!
//! Messages are framed as a big-endian `u16` type code followed by a payload
//! whose layout is described by a [`MessageDescriptor`]: an ordered list of
//! named fields, each with a fixed wire kind. The engine never hard-codes a
//! message layout; everything flows through registry lookups, so unknown
//! message names are caught before a script runs rather than producing a
//! false pass at execution time.
//!
//! The [`MessageRegistry`] is read-only once built. It is shared by reference
//! across the engine and queried without locking; no mutation path exists
//! after construction.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod field;
pub mod message;
pub mod registry;

pub use errors::{Result, WireError};
pub use field::{FieldDef, FieldKind, FieldValue};
pub use message::{FieldMap, MessageDescriptor, WireMessage};
pub use registry::MessageRegistry;
