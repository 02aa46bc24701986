//! Logging initialization for the C ABI.
//!
//! Hosts that already install a `log` backend can skip these.

use super::types::{TransitLogLevel, TransitStatus};
use std::ffi::{c_char, CStr};

/// Initialize console logging at a fixed level.
///
/// Returns `AlreadyInitialized` if a logger is already installed.
#[no_mangle]
pub extern "C" fn transit_logging_init(level: TransitLogLevel) -> TransitStatus {
    let filter: log::LevelFilter = level.into();

    match env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => TransitStatus::Ok,
        Err(_) => TransitStatus::AlreadyInitialized,
    }
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`.
#[no_mangle]
pub extern "C" fn transit_logging_init_env(default_level: TransitLogLevel) -> TransitStatus {
    let filter: log::LevelFilter = default_level.into();

    match env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter.to_string()),
    )
    .format_timestamp_millis()
    .try_init()
    {
        Ok(()) => TransitStatus::Ok,
        Err(_) => TransitStatus::AlreadyInitialized,
    }
}

/// Initialize logging with a filter string such as `"transitrs=trace"`.
///
/// # Safety
/// `filter` must be a valid null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn transit_logging_init_with_filter(filter: *const c_char) -> TransitStatus {
    if filter.is_null() {
        return TransitStatus::NullPointer;
    }

    let Ok(filter_str) = CStr::from_ptr(filter).to_str() else {
        return TransitStatus::InvalidUtf8;
    };

    match env_logger::Builder::new()
        .parse_filters(filter_str)
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => TransitStatus::Ok,
        Err(_) => TransitStatus::AlreadyInitialized,
    }
}
