//! transitrs - fixed-layout transit records for foreign call boundaries.
//!
//! A native caller (Fortran or C) hands a small flat record and a
//! pointer-or-integer union to a function implemented on the far side of a
//! language boundary, typically an embedded Python hook exported through
//! cffi as `python_function`. Both sides share memory by raw pointer, so the
//! only safety net is exact agreement on layout. This crate provides:
//!
//! - One canonical, versioned definition per record generation, with
//!   compile-time checks of every field offset
//! - A tagged native view of the union that decays to raw storage only at
//!   the call
//! - A typed entry point wrapper that lends caller-owned storage for exactly
//!   one call and can check that only documented fields changed
//! - A layout canary and integration-time verification against the far
//!   side's own `sizeof`/`offsetof`
//! - Emitters for the C header, cffi `cdef` text and a Fortran interface
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │      FFI Layer (transitrs.h)         │
//! │  layout queries, canary, logging     │
//! └──────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌──────────────────────────────────────┐
//! │  ┌────────────┐  ┌────────────────┐  │
//! │  │   Schema   │  │    Boundary    │  │
//! │  │ (versioned)│  │  (EntryPoint)  │  │
//! │  └────────────┘  └────────────────┘  │
//! │  ┌────────────┐  ┌────────────────┐  │
//! │  │ Union and  │  │    Bindings    │  │
//! │  │   canary   │  │ (C/cffi/F90)   │  │
//! │  └────────────┘  └────────────────┘  │
//! └──────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use transitrs::{CanaryRecord, EntryPoint, RawEntryPoint, TransitUnion};
//!
//! unsafe extern "C" fn callee(data: *mut CanaryRecord, value: *mut TransitUnion) {
//!     (*data).y += (*value).int_value();
//! }
//!
//! let entry = unsafe { EntryPoint::new("callee", callee as RawEntryPoint<CanaryRecord>) };
//! let mut record = CanaryRecord::new(1.5, 2, false);
//! let mut value = TransitUnion::from_int(40);
//! entry.invoke(&mut record, &mut value);
//! assert_eq!(record.y, 42);
//! ```

pub mod bindings;
pub mod boundary;
pub mod data;
pub mod error;
pub mod ffi;
pub mod schema;

// Re-export commonly used items
pub use bindings::BindingConfig;
pub use boundary::{EntryPoint, MutationContract, RawEntryPoint, ENTRY_SYMBOL};
pub use data::{CanaryLog, Handle, TransitUnion, TransitValue, ValueKind, CANARY_MAGIC};
pub use error::TransitError;
pub use schema::{
    CanaryRecord, CoordRecord, FieldDesc, FieldValue, FlagRecord, Primitive, SchemaVersion,
    TransitRecord, TransitSchema,
};

#[cfg(feature = "python-callee")]
pub use boundary::{python_entry_point, PYTHON_CONTRACT};

// Re-export FFI types for cbindgen
pub use ffi::layout::*;
pub use ffi::logging::*;
pub use ffi::types::*;
