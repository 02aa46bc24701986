//! The three record generations exchanged across the boundary.
//!
//! Field order is the wire order. Never reorder or retype a field here; add a
//! new record and a new [`SchemaVersion`] instead.

use super::SchemaVersion;
use crate::data::canary::CANARY_MAGIC;
use libc::{c_float, c_int};

/// Integer coordinates only, as in the first `data_t` header.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordRecord {
    pub x: c_int,
    pub y: c_int,
}

crate::transit_schema!(CoordRecord, SchemaVersion::V1, { x: CInt, y: CInt });

/// Coordinates and flag, followed by a layout canary.
///
/// `sentinel` must hold [`CANARY_MAGIC`] when handed to the callee. A callee
/// that reads anything else is looking at the wrong offsets.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanaryRecord {
    pub x: c_float,
    pub y: c_int,
    pub flag: bool,
    pub sentinel: c_int,
}

crate::transit_schema!(
    CanaryRecord,
    SchemaVersion::V2,
    { x: CFloat, y: CInt, flag: CBool, sentinel: CInt }
);

impl CanaryRecord {
    pub fn new(x: c_float, y: c_int, flag: bool) -> Self {
        Self {
            x,
            y,
            flag,
            sentinel: CANARY_MAGIC,
        }
    }

    #[inline]
    pub fn has_valid_canary(&self) -> bool {
        self.sentinel == CANARY_MAGIC
    }
}

impl Default for CanaryRecord {
    fn default() -> Self {
        Self::new(0.0, 0, false)
    }
}

/// Coordinates and flag.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlagRecord {
    pub x: c_float,
    pub y: c_int,
    pub flag: bool,
}

crate::transit_schema!(FlagRecord, SchemaVersion::V3, { x: CFloat, y: CInt, flag: CBool });

/// Record type bound to the `python_function` entry symbol.
pub type TransitRecord = CanaryRecord;

impl From<CoordRecord> for FlagRecord {
    fn from(r: CoordRecord) -> Self {
        Self {
            x: r.x as c_float,
            y: r.y,
            flag: false,
        }
    }
}

impl From<FlagRecord> for CanaryRecord {
    fn from(r: FlagRecord) -> Self {
        Self::new(r.x, r.y, r.flag)
    }
}
