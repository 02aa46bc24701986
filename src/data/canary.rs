//! Layout canary shared by both sides of the boundary.

use crate::error::TransitError;
use libc::c_int;
use log::{error, trace};
use std::sync::Mutex;

/// Value stored in [`CanaryRecord::sentinel`](crate::schema::CanaryRecord).
pub const CANARY_MAGIC: c_int = 123_456_789;

/// Check a sentinel value read by the callee.
pub fn check_canary(observed: c_int) -> Result<(), TransitError> {
    if observed == CANARY_MAGIC {
        trace!("canary ok");
        Ok(())
    } else {
        error!("canary read back as {observed:#x}, expected {CANARY_MAGIC:#x}");
        Err(TransitError::CanaryMismatch {
            expected: CANARY_MAGIC,
            observed,
        })
    }
}

/// Sentinel values seen by a callee, checked after the call.
///
/// Usable as a `static` so that plain `extern "C"` callees can record into it.
#[derive(Debug, Default)]
pub struct CanaryLog {
    observed: Mutex<Vec<c_int>>,
}

impl CanaryLog {
    pub const fn new() -> Self {
        Self {
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Record one observation.
    pub fn record(&self, observed: c_int) {
        self.lock().push(observed);
    }

    pub fn observations(&self) -> Vec<c_int> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Succeeds with the observation count when at least one observation was
    /// recorded and all of them equal [`CANARY_MAGIC`].
    pub fn verify(&self) -> Result<usize, TransitError> {
        let observed = self.lock();
        if observed.is_empty() {
            return Err(TransitError::NoCanaryObserved);
        }
        for &value in observed.iter() {
            check_canary(value)?;
        }
        Ok(observed.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<c_int>> {
        // A panicking recorder cannot leave the Vec half-written.
        self.observed.lock().unwrap_or_else(|e| e.into_inner())
    }
}
