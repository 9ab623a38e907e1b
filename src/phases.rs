//! Solar event tables and the calculator seam.
//!
//! The engine never computes solar geometry itself; it asks a
//! [`PhaseCalculator`] for a day's event table and works with whatever keys
//! came back. The default implementation lives in [`crate::solar`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// A day's resolved event-key → timestamp table.
///
/// Produced once per (day, position bucket) and replaced wholesale on
/// refresh, never merged. Keys are opaque to the engine: whatever the
/// calculator produced is what boundary expressions can name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTimes {
    times: BTreeMap<String, DateTime<Utc>>,
}

impl PhaseTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, at: DateTime<Utc>) {
        self.times.insert(key.into(), at);
    }

    pub fn get(&self, key: &str) -> Option<DateTime<Utc>> {
        self.times.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Iterate entries in key order, so publication is deterministic.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.times.iter().map(|(k, at)| (k.as_str(), *at))
    }
}

impl FromIterator<(String, DateTime<Utc>)> for PhaseTimes {
    fn from_iter<I: IntoIterator<Item = (String, DateTime<Utc>)>>(iter: I) -> Self {
        Self {
            times: iter.into_iter().collect(),
        }
    }
}

/// External astronomical calculator.
///
/// Treated as a fast, synchronous, pure function of its inputs. Returning
/// `None` signals a recoverable computation failure: the engine keeps any
/// previously cached table in use.
pub trait PhaseCalculator {
    /// The event table for the calendar day containing `now` at a position.
    fn phase_times(&self, now: DateTime<Utc>, latitude: f64, longitude: f64) -> Option<PhaseTimes>;

    /// The wall-clock timezone the observer at this position lives in.
    ///
    /// `None` leaves the engine on its configured (or previous) zone. Both
    /// "now" and event instants are read in this one zone, so in-window
    /// comparisons stay consistent.
    fn local_zone(&self, _latitude: f64, _longitude: f64) -> Option<Tz> {
        None
    }
}
