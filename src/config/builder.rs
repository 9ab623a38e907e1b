//! Default configuration generation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Contents written when no configuration file exists. Subscribes to stdin
/// and carries the classic daytime/nighttime rule so a bare install does
/// something useful.
const DEFAULT_CONFIG: &str = r#"# sunphases configuration

root = "environment.sunphases"  # namespace prefix for published paths
heartbeat = 60                  # sampling interval in seconds (0 = one-shot)
# timezone = "Europe/London"    # override the coordinate-derived timezone

[position]
source = "stdin"                # "static" | "stdin" | "file"
# latitude = 51.5074            # static source only
# longitude = -0.1278
# path = "/var/run/positions.ndjson"  # file source only

# Boundaries accept HH:MM:SS, an event key (sunrise, dusk, solarNoon, ...),
# or an event key with an offset such as "dawn-30m" or "sunset+1h".
[[notifications]]
range_low = "dawn"
range_high = "dusk"
in_range = { key = "daytime" }
out_range = { key = "nighttime" }
"#;

/// Write the default configuration file, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config '{}'", path.display()))
}
