//! Independent layout computation and verification.
//!
//! The expected layout of a record is derived only from its ordered list of
//! primitives and the C alignment rules: each field starts at the next
//! multiple of its alignment, and the total size is rounded up to the
//! strictest field alignment. That result is then compared with what rustc
//! actually produced for the `#[repr(C)]` struct, or with what the far side
//! of the boundary reports.

use super::{FieldDesc, Primitive, SchemaVersion, TransitSchema};
use crate::data::TransitUnion;
use crate::error::TransitError;
use log::{debug, error};

/// Offsets, size and alignment derived from a primitive list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLayout {
    pub offsets: Vec<usize>,
    pub size: usize,
    pub align: usize,
}

/// Round `offset` up to the next multiple of `align` (a power of two).
#[inline]
pub const fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

/// Compile-time check used by [`transit_schema!`](crate::transit_schema).
pub const fn layout_agrees(fields: &[FieldDesc], size: usize, align: usize) -> bool {
    let mut offset = 0;
    let mut max_align = 1;
    let mut i = 0;
    while i < fields.len() {
        let field_align = fields[i].primitive.align();
        offset = align_up(offset, field_align);
        if fields[i].offset != offset {
            return false;
        }
        offset += fields[i].primitive.size();
        if field_align > max_align {
            max_align = field_align;
        }
        i += 1;
    }
    align_up(offset, max_align) == size && max_align == align
}

/// Lay out `primitives` in order following the C rules.
pub fn compute_layout(primitives: &[Primitive]) -> ComputedLayout {
    let mut offsets = Vec::with_capacity(primitives.len());
    let mut offset = 0;
    let mut align = 1;

    for prim in primitives {
        offset = align_up(offset, prim.align());
        offsets.push(offset);
        offset += prim.size();
        align = align.max(prim.align());
    }

    ComputedLayout {
        offsets,
        size: align_up(offset, align),
        align,
    }
}

/// Layout of the transit union: every member at offset 0, sized to the
/// largest member.
pub fn union_layout() -> ComputedLayout {
    let members = TransitUnion::MEMBERS.map(|(_, prim)| prim);
    let align = members.iter().map(|p| p.align()).max().unwrap_or(1);
    let widest = members.iter().map(|p| p.size()).max().unwrap_or(0);

    ComputedLayout {
        offsets: vec![0; members.len()],
        size: align_up(widest, align),
        align,
    }
}

/// Check the compiled layout of `R` against the computed one.
pub fn verify<R: TransitSchema>() -> Result<ComputedLayout, TransitError> {
    verify_fields(
        R::NAME,
        R::FIELDS,
        std::mem::size_of::<R>(),
        std::mem::align_of::<R>(),
    )
}

/// Check an arbitrary field table against a compiled size and alignment.
pub fn verify_fields(
    schema: &'static str,
    fields: &'static [FieldDesc],
    size: usize,
    align: usize,
) -> Result<ComputedLayout, TransitError> {
    let primitives: Vec<Primitive> = fields.iter().map(|f| f.primitive).collect();
    let computed = compute_layout(&primitives);

    for (field, &expected) in fields.iter().zip(&computed.offsets) {
        if field.offset != expected {
            error!(
                "{schema}.{} compiled at offset {}, computed {expected}",
                field.name, field.offset
            );
            return Err(TransitError::FieldOffsetMismatch {
                schema,
                field: field.name,
                expected,
                actual: field.offset,
            });
        }
    }

    if size != computed.size {
        error!("{schema} compiled to {size} bytes, computed {}", computed.size);
        return Err(TransitError::SizeMismatch {
            schema,
            expected: computed.size,
            actual: size,
        });
    }

    if align != computed.align {
        return Err(TransitError::AlignMismatch {
            schema,
            expected: computed.align,
            actual: align,
        });
    }

    debug!(
        "{schema}: {} fields, {} bytes, align {}",
        fields.len(),
        computed.size,
        computed.align
    );
    Ok(computed)
}

/// Compare a layout reported by the far side against a schema version.
///
/// `offsets` lists the far side's field offsets in declaration order, `size`
/// its `sizeof` and `align` its `_Alignof` for the record.
pub fn verify_foreign(
    version: SchemaVersion,
    size: usize,
    align: usize,
    offsets: &[usize],
) -> Result<(), TransitError> {
    let schema = version.name();
    let fields = version.fields();

    if offsets.len() != fields.len() {
        error!(
            "{schema}: far side reported {} fields, expected {}",
            offsets.len(),
            fields.len()
        );
        return Err(TransitError::FieldCountMismatch {
            schema,
            expected: fields.len(),
            actual: offsets.len(),
        });
    }

    for (field, &actual) in fields.iter().zip(offsets) {
        if field.offset != actual {
            error!(
                "{schema}.{}: far side offset {actual}, native offset {}",
                field.name, field.offset
            );
            return Err(TransitError::FieldOffsetMismatch {
                schema,
                field: field.name,
                expected: field.offset,
                actual,
            });
        }
    }

    if size != version.size() {
        error!("{schema}: far side size {size}, native size {}", version.size());
        return Err(TransitError::SizeMismatch {
            schema,
            expected: version.size(),
            actual: size,
        });
    }

    if align != version.align() {
        error!("{schema}: far side align {align}, native align {}", version.align());
        return Err(TransitError::AlignMismatch {
            schema,
            expected: version.align(),
            actual: align,
        });
    }

    debug!("{schema} ({version}) matches the far side layout");
    Ok(())
}
