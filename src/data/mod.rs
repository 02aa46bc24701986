//! Values carried across the boundary alongside the record.

pub mod canary;
pub mod union;

pub use canary::{check_canary, CanaryLog, CANARY_MAGIC};
pub use union::{Handle, TransitUnion, TransitValue, ValueKind};
