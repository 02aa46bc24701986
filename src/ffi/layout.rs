//! FFI functions for layout queries and integration-time checks.
//!
//! These let the far side (cffi, ctypes, a Fortran test driver) compare its
//! own `sizeof`/`offsetof` results against the native build before any record
//! is exchanged.

use super::types::TransitStatus;
use crate::data::check_canary;
use crate::schema::{verify_foreign, CanaryRecord, SchemaVersion};
use libc::c_int;
use log::warn;

/// Version of this C ABI. Bumped whenever a record or the union changes.
pub const ABI_VERSION: u32 = 1;

#[no_mangle]
pub extern "C" fn transit_abi_version() -> u32 {
    ABI_VERSION
}

/// Size of the record for `version`, or 0 if the version is unknown.
#[no_mangle]
pub extern "C" fn transit_record_size(version: u32) -> usize {
    SchemaVersion::from_u32(version).map_or(0, SchemaVersion::size)
}

/// Alignment of the record for `version`, or 0 if the version is unknown.
#[no_mangle]
pub extern "C" fn transit_record_align(version: u32) -> usize {
    SchemaVersion::from_u32(version).map_or(0, SchemaVersion::align)
}

/// Number of fields in the record for `version`, or 0 if unknown.
#[no_mangle]
pub extern "C" fn transit_record_field_count(version: u32) -> usize {
    SchemaVersion::from_u32(version).map_or(0, |v| v.fields().len())
}

/// Offset of field `index` of the record for `version`.
///
/// # Safety
/// `out_offset` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn transit_record_field_offset(
    version: u32,
    index: usize,
    out_offset: *mut usize,
) -> TransitStatus {
    if out_offset.is_null() {
        return TransitStatus::NullPointer;
    }

    let Some(version) = SchemaVersion::from_u32(version) else {
        return TransitStatus::UnknownSchema;
    };

    match version.fields().get(index) {
        Some(field) => {
            *out_offset = field.offset;
            TransitStatus::Ok
        }
        None => TransitStatus::InvalidArgument,
    }
}

#[no_mangle]
pub extern "C" fn transit_union_size() -> usize {
    std::mem::size_of::<crate::data::TransitUnion>()
}

/// Compare the far side's view of a record against the native layout.
///
/// `size` and `align` are the far side's `sizeof` and `_Alignof` for the
/// record; `offsets` its `offsetof` for each field in declaration order.
///
/// # Safety
/// `offsets` must point to `count` elements, or be NULL when `count` is 0.
#[no_mangle]
pub unsafe extern "C" fn transit_verify_foreign_layout(
    version: u32,
    size: usize,
    align: usize,
    offsets: *const usize,
    count: usize,
) -> TransitStatus {
    let Some(version) = SchemaVersion::from_u32(version) else {
        warn!("far side asked about unknown schema version {version}");
        return TransitStatus::UnknownSchema;
    };

    let offsets = if count == 0 {
        &[][..]
    } else if offsets.is_null() {
        return TransitStatus::NullPointer;
    } else {
        std::slice::from_raw_parts(offsets, count)
    };

    verify_foreign(version, size, align, offsets).into()
}

#[no_mangle]
pub extern "C" fn transit_canary_magic() -> c_int {
    crate::data::CANARY_MAGIC
}

/// Callee-side hook: confirm the record's sentinel reads as the magic value.
///
/// # Safety
/// `record` must point to a live `CanaryRecord` or be NULL.
#[no_mangle]
pub unsafe extern "C" fn transit_canary_check(record: *const CanaryRecord) -> TransitStatus {
    if record.is_null() {
        return TransitStatus::NullPointer;
    }

    check_canary((*record).sentinel).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CANARY_MAGIC;
    use crate::schema::POINTER_WIDTH;
    use std::ptr;

    #[test]
    fn test_size_queries() {
        assert_eq!(transit_abi_version(), ABI_VERSION);
        assert_eq!(transit_record_size(1), 8);
        assert_eq!(transit_record_size(2), 16);
        assert_eq!(transit_record_size(3), 12);
        assert_eq!(transit_record_size(42), 0);
        assert_eq!(transit_record_align(2), 4);
        assert_eq!(transit_record_field_count(2), 4);
        assert_eq!(transit_record_field_count(0), 0);
        assert_eq!(transit_union_size(), POINTER_WIDTH);
    }

    #[test]
    fn test_field_offset_query() {
        let mut offset = usize::MAX;
        unsafe {
            assert_eq!(transit_record_field_offset(2, 3, &mut offset), TransitStatus::Ok);
            assert_eq!(offset, 12);
            assert_eq!(
                transit_record_field_offset(2, 4, &mut offset),
                TransitStatus::InvalidArgument
            );
            assert_eq!(
                transit_record_field_offset(7, 0, &mut offset),
                TransitStatus::UnknownSchema
            );
            assert_eq!(
                transit_record_field_offset(2, 0, ptr::null_mut()),
                TransitStatus::NullPointer
            );
        }
    }

    #[test]
    fn test_verify_foreign_layout() {
        let good = [0usize, 4, 8];
        let packed = [0usize, 4, 8, 9];
        unsafe {
            assert_eq!(
                transit_verify_foreign_layout(3, 12, 4, good.as_ptr(), good.len()),
                TransitStatus::Ok
            );
            assert_eq!(
                transit_verify_foreign_layout(2, 13, 4, packed.as_ptr(), packed.len()),
                TransitStatus::LayoutMismatch
            );
            assert_eq!(
                transit_verify_foreign_layout(2, 16, 4, ptr::null(), 4),
                TransitStatus::NullPointer
            );
            assert_eq!(
                transit_verify_foreign_layout(2, 16, 4, ptr::null(), 0),
                TransitStatus::LayoutMismatch
            );
            assert_eq!(
                transit_verify_foreign_layout(9, 16, 4, good.as_ptr(), good.len()),
                TransitStatus::UnknownSchema
            );
        }
    }

    #[test]
    fn test_verify_foreign_layout_alignment() {
        let offsets = [0usize, 4, 8, 12];
        unsafe {
            assert_eq!(
                transit_verify_foreign_layout(2, 16, 4, offsets.as_ptr(), offsets.len()),
                TransitStatus::Ok
            );
            assert_eq!(
                transit_verify_foreign_layout(2, 16, 8, offsets.as_ptr(), offsets.len()),
                TransitStatus::LayoutMismatch
            );
        }
    }

    #[test]
    fn test_canary_hook() {
        let mut record = CanaryRecord::new(1.5, 2, false);
        assert_eq!(transit_canary_magic(), CANARY_MAGIC);
        unsafe {
            assert_eq!(transit_canary_check(&record), TransitStatus::Ok);
            record.sentinel = 0;
            assert_eq!(transit_canary_check(&record), TransitStatus::CanaryMismatch);
            assert_eq!(transit_canary_check(ptr::null()), TransitStatus::NullPointer);
        }
    }
}
