//! Canonical, versioned schema definitions for transit records.
//!
//! Each record is a plain `#[repr(C)]` struct (so cbindgen can emit it into
//! the C header) paired with a [`TransitSchema`] implementation produced by
//! [`transit_schema!`](crate::transit_schema). The macro records the compiled
//! field offsets and fails compilation when they disagree with the layout
//! computed from the primitive list alone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Implement [`TransitSchema`] for a `#[repr(C)]` record.
///
/// Fields must be listed in declaration order with their C primitive. A
/// compile-time assertion checks that every compiled offset, the total size
/// and the alignment agree with [`layout::layout_agrees`].
///
/// ```
/// use transitrs::{transit_schema, SchemaVersion};
///
/// #[repr(C)]
/// #[derive(Debug, Clone, Copy)]
/// pub struct Point {
///     pub x: i32,
///     pub y: i32,
/// }
///
/// transit_schema!(Point, SchemaVersion::V1, { x: CInt, y: CInt });
/// ```
#[macro_export]
macro_rules! transit_schema {
    ($name:ident, $version:expr, { $($field:ident : $prim:ident),+ $(,)? }) => {
        impl $crate::schema::TransitSchema for $name {
            const VERSION: $crate::schema::SchemaVersion = $version;
            const NAME: &'static str = stringify!($name);
            const FIELDS: &'static [$crate::schema::FieldDesc] = &[
                $($crate::schema::FieldDesc {
                    name: stringify!($field),
                    primitive: $crate::schema::Primitive::$prim,
                    offset: ::core::mem::offset_of!($name, $field),
                }),+
            ];

            fn field_values(&self) -> ::std::vec::Vec<$crate::schema::FieldValue> {
                ::std::vec![$($crate::schema::FieldValue::from(self.$field)),+]
            }
        }

        const _: () = assert!(
            $crate::schema::layout::layout_agrees(
                <$name as $crate::schema::TransitSchema>::FIELDS,
                ::core::mem::size_of::<$name>(),
                ::core::mem::align_of::<$name>(),
            ),
            "compiled transit record layout drifted from its field list",
        );
    };
}

pub mod layout;
pub mod records;

pub use layout::{compute_layout, union_layout, verify, verify_foreign, ComputedLayout};
pub use records::{CanaryRecord, CoordRecord, FlagRecord, TransitRecord};

/// Width of an address on the target, in bytes.
pub const POINTER_WIDTH: usize = (usize::BITS / 8) as usize;

/// C primitive types allowed in a transit record.
///
/// Records stay flat: no nested aggregates, no variable-length members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `float` / `real(kind=c_float)`.
    CFloat,
    /// `int` / `integer(kind=c_int)`.
    CInt,
    /// `bool` / `logical(kind=c_bool)`.
    CBool,
    /// `void *` / `type(c_ptr)`.
    Pointer,
}

impl Primitive {
    /// Size in bytes under the platform C ABI.
    pub const fn size(self) -> usize {
        match self {
            Primitive::CFloat => 4,
            Primitive::CInt => 4,
            Primitive::CBool => 1,
            Primitive::Pointer => POINTER_WIDTH,
        }
    }

    /// Natural alignment in bytes under the platform C ABI.
    pub const fn align(self) -> usize {
        match self {
            Primitive::CFloat => 4,
            Primitive::CInt => 4,
            Primitive::CBool => 1,
            Primitive::Pointer => POINTER_WIDTH,
        }
    }

    /// C spelling of the type.
    pub fn c_type(self) -> &'static str {
        match self {
            Primitive::CFloat => "float",
            Primitive::CInt => "int",
            Primitive::CBool => "bool",
            Primitive::Pointer => "void *",
        }
    }

    /// Fortran `iso_c_binding` spelling of the type.
    pub fn fortran_type(self) -> &'static str {
        match self {
            Primitive::CFloat => "real(kind=c_float)",
            Primitive::CInt => "integer(kind=c_int)",
            Primitive::CBool => "logical(kind=c_bool)",
            Primitive::Pointer => "type(c_ptr)",
        }
    }
}

/// One field of a transit record, with its compiled offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: &'static str,
    pub primitive: Primitive,
    pub offset: usize,
}

/// The value of a single record field, used for before/after comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f32),
    Int(i32),
    Bool(bool),
}

impl FieldValue {
    /// Bitwise equality. Unlike `==`, a NaN coordinate equals itself.
    pub fn same_bits(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// Named, versioned field sets. Changing a record's fields means a new
/// version, never an in-place edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum SchemaVersion {
    /// Integer coordinates only.
    V1 = 1,
    /// Coordinates, flag and layout canary.
    V2 = 2,
    /// Coordinates and flag.
    V3 = 3,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 3] = [SchemaVersion::V1, SchemaVersion::V2, SchemaVersion::V3];

    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(SchemaVersion::V1),
            2 => Some(SchemaVersion::V2),
            3 => Some(SchemaVersion::V3),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Rust name of the record type bound to this version.
    pub fn name(self) -> &'static str {
        match self {
            SchemaVersion::V1 => CoordRecord::NAME,
            SchemaVersion::V2 => CanaryRecord::NAME,
            SchemaVersion::V3 => FlagRecord::NAME,
        }
    }

    pub fn fields(self) -> &'static [FieldDesc] {
        match self {
            SchemaVersion::V1 => CoordRecord::FIELDS,
            SchemaVersion::V2 => CanaryRecord::FIELDS,
            SchemaVersion::V3 => FlagRecord::FIELDS,
        }
    }

    /// Compiled size of the record.
    pub fn size(self) -> usize {
        match self {
            SchemaVersion::V1 => std::mem::size_of::<CoordRecord>(),
            SchemaVersion::V2 => std::mem::size_of::<CanaryRecord>(),
            SchemaVersion::V3 => std::mem::size_of::<FlagRecord>(),
        }
    }

    /// Compiled alignment of the record.
    pub fn align(self) -> usize {
        match self {
            SchemaVersion::V1 => std::mem::align_of::<CoordRecord>(),
            SchemaVersion::V2 => std::mem::align_of::<CanaryRecord>(),
            SchemaVersion::V3 => std::mem::align_of::<FlagRecord>(),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u32())
    }
}

/// A record type whose layout is part of a cross-language contract.
pub trait TransitSchema: Copy + 'static {
    /// Schema generation this record belongs to.
    const VERSION: SchemaVersion;
    /// Rust type name, used in diagnostics.
    const NAME: &'static str;
    /// Fields in declaration order, with compiled offsets.
    const FIELDS: &'static [FieldDesc];

    /// Current field values, in the same order as [`Self::FIELDS`].
    fn field_values(&self) -> Vec<FieldValue>;

    /// Look up a single field by name.
    fn field(&self, name: &str) -> Option<FieldValue> {
        Self::FIELDS
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| self.field_values().get(i).copied())
    }
}
