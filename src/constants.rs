//! Application-wide constants and defaults.

/// Process exit code used when startup fails.
pub const EXIT_FAILURE: i32 = 1;

/// Default namespace prefix for published paths (before normalization).
pub const DEFAULT_ROOT: &str = "environment.sunphases";

/// Default sampling interval in seconds. Zero means one-shot.
pub const DEFAULT_HEARTBEAT: u64 = 60;

/// Upper bound on the sampling interval (one day).
pub const MAXIMUM_HEARTBEAT: u64 = 86_400;

/// Event keys produced by the default calculator. The engine treats keys as
/// opaque strings; this list exists so configuration validation can reject
/// boundary expressions that name an event which will never be published.
pub const PHASE_KEYS: [&str; 14] = [
    "dawn",
    "dusk",
    "goldenHour",
    "goldenHourEnd",
    "nadir",
    "nauticalDawn",
    "nauticalDusk",
    "night",
    "nightEnd",
    "solarNoon",
    "sunrise",
    "sunriseEnd",
    "sunset",
    "sunsetStart",
];
