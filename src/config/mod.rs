//! Configuration for the sunphases daemon.
//!
//! Settings load from a TOML file, `sunphases.toml`, in the XDG config
//! directory (`~/.config/sunphases/`) or a directory given with
//! `--config`. A commented default file is generated when none exists.
//!
//! ## Configuration Structure
//!
//! ```toml
//! root = "environment.sunphases"  # namespace prefix for published paths
//! heartbeat = 60                  # sampling interval in seconds, 0 = one-shot
//! # timezone = "Europe/London"    # override the coordinate-derived timezone
//!
//! [position]
//! source = "stdin"                # "static" | "stdin" | "file"
//! # latitude = 51.5074            # static source only
//! # longitude = -0.1278
//! # path = "/var/run/positions.ndjson"  # file source only
//!
//! [[notifications]]
//! range_low = "dawn"              # HH:MM:SS, event key, or key±offset (h|m|s)
//! range_high = "dusk"
//! in_range = { key = "daytime" }
//! out_range = { key = "nighttime", state = "normal", method = [] }
//! ```
//!
//! ## Validation
//!
//! All values are validated before the engine starts: coordinate and
//! heartbeat ranges, timezone names, non-empty keys, and a dry parse of
//! every boundary expression against the published event-key set. Invalid
//! configurations fail startup with an error chain naming the offending
//! field.

pub mod builder;
pub mod loading;
pub mod validation;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::constants::{DEFAULT_HEARTBEAT, DEFAULT_ROOT};
use crate::engine::rules::WindowRuleConfig;

// Re-export public API
pub use loading::{get_config_path, load, load_from_path};

/// Where position samples come from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PositionSourceKind {
    /// Fixed coordinates from this file.
    Static,
    /// Newline-delimited JSON positions on stdin.
    Stdin,
    /// Newline-delimited JSON positions from a file or FIFO.
    File,
}

/// The `[position]` table.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PositionConfig {
    pub source: PositionSourceKind,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub path: Option<PathBuf>,
}

/// One `[[metadata]]` entry: human-readable description for a published key.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetadataEntry {
    pub key: String,
    pub description: String,
    pub units: Option<String>,
}

/// Daemon settings as loaded from `sunphases.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Namespace prefix for published paths. Normalized by [`Config::root`].
    pub root: Option<String>,

    /// Sampling interval in seconds; 0 means evaluate exactly once.
    pub heartbeat: Option<u64>,

    /// IANA timezone overriding coordinate-derived detection.
    pub timezone: Option<String>,

    pub position: PositionConfig,

    /// Notification rules, evaluated in file order.
    #[serde(default)]
    pub notifications: Vec<WindowRuleConfig>,

    /// Per-key descriptions published once at startup. Defaults to the
    /// standard table when omitted.
    pub metadata: Option<Vec<MetadataEntry>>,
}

impl Config {
    /// The normalized root prefix: trimmed of whitespace and stray dots,
    /// with exactly one trailing dot.
    pub fn root(&self) -> String {
        normalize_root(self.root.as_deref().unwrap_or(DEFAULT_ROOT))
    }

    pub fn heartbeat(&self) -> u64 {
        self.heartbeat.unwrap_or(DEFAULT_HEARTBEAT)
    }

    /// The timezone override, if one was configured. Validation guarantees
    /// the name parses.
    pub fn zone_override(&self) -> Option<Tz> {
        self.timezone.as_deref().and_then(|name| name.parse().ok())
    }

    /// Metadata entries to announce, falling back to the standard table.
    pub fn metadata_entries(&self) -> Vec<MetadataEntry> {
        self.metadata.clone().unwrap_or_else(default_metadata)
    }

    /// Log a configuration summary at startup.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("root: {}", self.root());
        if self.heartbeat() == 0 {
            log_indented!("heartbeat: one-shot");
        } else {
            log_indented!("heartbeat: {}s", self.heartbeat());
        }
        if let Some(zone) = self.zone_override() {
            log_indented!("timezone: {zone} (override)");
        }
        log_indented!(
            "position source: {:?}",
            self.position.source
        );
        log_indented!("notification rules: {}", self.notifications.len());
    }
}

/// Trim whitespace and leading/trailing dots, then append one dot.
pub(crate) fn normalize_root(root: &str) -> String {
    format!("{}.", root.trim().trim_matches('.'))
}

/// The standard description table for the fourteen published keys.
pub fn default_metadata() -> Vec<MetadataEntry> {
    const UNITS: &str = "ISO8601 (UTC)";
    let entries = [
        ("dawn", "Morning nautical twilight ends, morning civil twilight starts"),
        ("dusk", "Evening nautical twilight starts"),
        ("goldenHour", "Evening golden hour starts"),
        ("goldenHourEnd", "Soft light, best time for photography ends"),
        ("nadir", "Darkest moment of the night, sun is in the lowest position"),
        ("nauticalDawn", "Morning nautical twilight starts"),
        ("nauticalDusk", "Evening astronomical twilight starts"),
        ("night", "Dark enough for astronomical observations"),
        ("nightEnd", "Morning astronomical twilight starts"),
        ("solarNoon", "Sun is at its highest elevation"),
        ("sunrise", "Top edge of the sun appears on the horizon"),
        ("sunriseEnd", "Bottom edge of the sun touches the horizon"),
        ("sunset", "Sun disappears below the horizon, evening civil twilight starts"),
        ("sunsetStart", "Bottom edge of the sun touches the horizon"),
    ];
    entries
        .iter()
        .map(|(key, description)| MetadataEntry {
            key: (*key).to_string(),
            description: (*description).to_string(),
            units: Some(UNITS.to_string()),
        })
        .collect()
}
