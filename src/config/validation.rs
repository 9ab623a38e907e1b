//! Configuration validation.
//!
//! Everything here runs before the engine starts: a configuration that
//! passes validation cannot produce a startup-time surprise from a
//! malformed rule or an impossible position source.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

use super::{Config, PositionSourceKind};
use crate::constants::{MAXIMUM_HEARTBEAT, PHASE_KEYS};
use crate::engine::expr;
use crate::phases::PhaseTimes;

/// Validate a loaded configuration, failing with a message naming the
/// offending field.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.root() == "." {
        anyhow::bail!("root must not be empty");
    }

    if config.heartbeat() > MAXIMUM_HEARTBEAT {
        anyhow::bail!(
            "heartbeat ({} s) must be at most {} seconds",
            config.heartbeat(),
            MAXIMUM_HEARTBEAT
        );
    }

    if let Some(name) = config.timezone.as_deref() {
        name.parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("unknown timezone '{name}'"))?;
    }

    validate_position(config)?;

    let probe = probe_times();
    for (index, rule) in config.notifications.iter().enumerate() {
        let number = index + 1;
        if rule.in_range.key.trim().is_empty() {
            anyhow::bail!("notification rule {number}: in_range key must not be empty");
        }
        if rule.out_range.key.trim().is_empty() {
            anyhow::bail!("notification rule {number}: out_range key must not be empty");
        }
        expr::evaluate(&rule.range_low, &probe, &Tz::UTC)
            .with_context(|| format!("notification rule {number}: range_low"))?;
        expr::evaluate(&rule.range_high, &probe, &Tz::UTC)
            .with_context(|| format!("notification rule {number}: range_high"))?;
    }

    Ok(())
}

fn validate_position(config: &Config) -> Result<()> {
    let position = &config.position;
    match position.source {
        PositionSourceKind::Static => {
            let (Some(latitude), Some(longitude)) = (position.latitude, position.longitude) else {
                anyhow::bail!("static position source requires latitude and longitude");
            };
            if !(-90.0..=90.0).contains(&latitude) {
                anyhow::bail!("latitude must be between -90 and 90 degrees (got {latitude})");
            }
            if !(-180.0..=180.0).contains(&longitude) {
                anyhow::bail!("longitude must be between -180 and 180 degrees (got {longitude})");
            }
        }
        PositionSourceKind::File => {
            if position.path.is_none() {
                anyhow::bail!("file position source requires a path");
            }
        }
        PositionSourceKind::Stdin => {}
    }
    Ok(())
}

/// Probe table containing every key the calculator can publish, used for a
/// dry parse of boundary expressions before startup.
fn probe_times() -> PhaseTimes {
    let epoch = Utc.timestamp_opt(0, 0).unwrap();
    PHASE_KEYS
        .iter()
        .map(|key| ((*key).to_string(), epoch))
        .collect()
}
