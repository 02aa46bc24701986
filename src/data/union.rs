//! The untagged transit union and its tagged native counterpart.
//!
//! Native code works with [`TransitValue`], which carries its interpretation
//! with it. It decays to the raw [`TransitUnion`] only when handed across the
//! boundary, and is lifted back using the [`ValueKind`] both sides agreed on.

use crate::schema::Primitive;
use libc::{c_int, c_void};
use std::fmt;
use std::ptr;

/// Raw overlapping storage: an address or a C `int`.
///
/// Members are private so that every value is built through a constructor
/// that initialises the full pointer-width storage first. With no
/// uninitialised bytes and no invalid bit patterns for either member, both
/// readers are safe; reading the member that was not last written yields the
/// reinterpreted bits.
#[repr(C)]
#[derive(Clone, Copy)]
pub union TransitUnion {
    void_ptr: *mut c_void,
    int_value: c_int,
}

impl TransitUnion {
    /// Members in declaration order, as emitted into foreign declarations.
    pub const MEMBERS: [(&'static str, Primitive); 2] =
        [("void_ptr", Primitive::Pointer), ("int_value", Primitive::CInt)];

    /// Zeroed storage.
    pub const fn zeroed() -> Self {
        Self {
            void_ptr: ptr::null_mut(),
        }
    }

    pub fn from_int(value: c_int) -> Self {
        let mut raw = Self::zeroed();
        raw.set_int(value);
        raw
    }

    pub fn from_address(addr: *mut c_void) -> Self {
        Self { void_ptr: addr }
    }

    /// Overwrite the integer member. Bytes beyond the `int` keep their value.
    #[inline]
    pub fn set_int(&mut self, value: c_int) {
        self.int_value = value;
    }

    #[inline]
    pub fn set_address(&mut self, addr: *mut c_void) {
        self.void_ptr = addr;
    }

    /// Read the integer member.
    #[inline]
    pub fn int_value(&self) -> c_int {
        // SAFETY: storage is fully initialised and any bit pattern is a valid c_int.
        unsafe { self.int_value }
    }

    /// Read the address member.
    #[inline]
    pub fn address(&self) -> *mut c_void {
        // SAFETY: storage is fully initialised and any bit pattern is a valid raw pointer.
        unsafe { self.void_ptr }
    }

    /// The full storage as an unsigned integer of pointer width.
    #[inline]
    pub fn bits(&self) -> usize {
        self.address() as usize
    }
}

impl Default for TransitUnion {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for TransitUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitUnion({:#x})", self.bits())
    }
}

/// Opaque address passed through the union. Never dereferenced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(*mut c_void);

impl Handle {
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    pub const fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    #[inline]
    pub fn addr(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// Which union member the caller and callee agreed is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Address,
    Integer,
}

/// Tagged native view of the transit union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitValue {
    Address(Handle),
    Integer(c_int),
}

impl TransitValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TransitValue::Address(_) => ValueKind::Address,
            TransitValue::Integer(_) => ValueKind::Integer,
        }
    }

    /// Decay to the untagged representation.
    pub fn to_raw(self) -> TransitUnion {
        match self {
            TransitValue::Address(handle) => TransitUnion::from_address(handle.as_ptr()),
            TransitValue::Integer(value) => TransitUnion::from_int(value),
        }
    }

    /// Lift a raw union using the agreed interpretation.
    pub fn from_raw(raw: &TransitUnion, kind: ValueKind) -> Self {
        match kind {
            ValueKind::Address => TransitValue::Address(Handle::from_ptr(raw.address())),
            ValueKind::Integer => TransitValue::Integer(raw.int_value()),
        }
    }
}

impl From<c_int> for TransitValue {
    fn from(value: c_int) -> Self {
        TransitValue::Integer(value)
    }
}

impl From<Handle> for TransitValue {
    fn from(handle: Handle) -> Self {
        TransitValue::Address(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::POINTER_WIDTH;

    #[test]
    fn test_union_is_pointer_sized() {
        assert_eq!(std::mem::size_of::<TransitUnion>(), POINTER_WIDTH);
        assert_eq!(
            std::mem::size_of::<TransitUnion>(),
            std::mem::size_of::<*mut c_void>().max(std::mem::size_of::<c_int>())
        );
    }

    #[test]
    fn test_int_roundtrip_without_boundary() {
        let raw = TransitUnion::from_int(42);
        assert_eq!(raw.int_value(), 42);

        let raw = TransitUnion::from_int(-1);
        assert_eq!(raw.int_value(), -1);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_from_int_zeroes_upper_bytes() {
        let raw = TransitUnion::from_int(-1);
        assert_eq!(raw.bits(), u32::MAX as usize);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_address_reads_back_as_low_int_bits() {
        let addr: usize = 0x1234_5678;
        let raw = TransitUnion::from_address(addr as *mut c_void);
        assert_eq!(raw.int_value(), 0x1234_5678);

        let raw = TransitUnion::from_address(usize::MAX as *mut c_void);
        assert_eq!(raw.int_value(), -1);
    }

    #[cfg(all(target_endian = "little", target_pointer_width = "64"))]
    #[test]
    fn test_int_write_keeps_upper_address_bits() {
        let mut raw = TransitUnion::from_address(0xAAAA_BBBB_0000_0000usize as *mut c_void);
        raw.set_int(7);
        assert_eq!(raw.bits(), 0xAAAA_BBBB_0000_0007);
    }

    #[test]
    fn test_tagged_value_decays_and_lifts() {
        let value = TransitValue::from(42);
        let raw = value.to_raw();
        assert_eq!(TransitValue::from_raw(&raw, value.kind()), value);

        let mut slot = 0u8;
        let handle = Handle::from_ptr(&mut slot as *mut u8 as *mut c_void);
        let value = TransitValue::from(handle);
        let raw = value.to_raw();
        assert_eq!(raw.address(), handle.as_ptr());
        assert_eq!(TransitValue::from_raw(&raw, ValueKind::Address), value);
    }

    #[test]
    fn test_default_is_null() {
        let raw = TransitUnion::default();
        assert!(raw.address().is_null());
        assert_eq!(raw.int_value(), 0);
        assert!(Handle::null().is_null());
    }
}
