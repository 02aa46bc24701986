//! FFI (Foreign Function Interface) layer for C bindings.
//!
//! Everything here is exported with C linkage and lands in
//! `include/transitrs.h`, so the far side can check the native layout and
//! canary from cffi, ctypes or Fortran `bind(c)` code.

pub mod layout;
pub mod logging;
pub mod types;

pub use layout::*;
pub use logging::*;
pub use types::*;
