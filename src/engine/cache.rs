//! Event-table cache and the refresh trigger.
//!
//! Decides, per position sample, whether the cached solar event table is
//! still valid or the external calculator must be consulted again. The
//! trigger is deliberately coarse: a calendar-day rollover or a move of more
//! than one degree in either coordinate.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

use crate::phases::{PhaseCalculator, PhaseTimes};
use crate::source::Position;

/// Result of a refresh decision.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Cached table still valid for this sample.
    NotNeeded,
    /// Table recomputed; the new table is handed back for publication.
    Refreshed(PhaseTimes),
    /// Calculator produced no usable data. The cached table, if any, stays
    /// in use.
    Failed(String),
}

/// Cached event table plus the day, position and zone it was computed for.
///
/// Owned exclusively by the refresh path; rule evaluation only reads it.
/// The cached table may be stale relative to wall-clock "today" when
/// recomputation keeps failing; the engine tolerates that rather than
/// discarding a still-usable schedule.
#[derive(Debug, Clone)]
pub struct PhaseCache {
    last_day: Option<u32>,
    last_position: Option<Position>,
    times: Option<PhaseTimes>,
    zone: Tz,
    zone_override: Option<Tz>,
}

impl PhaseCache {
    /// An empty cache. With no `zone_override` the observer zone is taken
    /// from the calculator on each refresh, starting from UTC.
    pub fn new(zone_override: Option<Tz>) -> Self {
        Self {
            last_day: None,
            last_position: None,
            times: None,
            zone: zone_override.unwrap_or(Tz::UTC),
            zone_override,
        }
    }

    /// The cached table, if any refresh has ever succeeded.
    pub fn times(&self) -> Option<&PhaseTimes> {
        self.times.as_ref()
    }

    /// The wall-clock frame for all seconds-of-day conversions.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Decide whether the cached table is still valid for `position` at
    /// `now`, recomputing it through `calc` when it is not.
    ///
    /// A refresh is required when no table exists yet, when the UTC
    /// day-of-year has rolled over, or when either coordinate has moved by
    /// more than one degree. On success, table, day, position and zone all
    /// replace together; a failed computation leaves every field untouched.
    pub fn maybe_refresh(
        &mut self,
        calc: &dyn PhaseCalculator,
        position: Position,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        let today = day_of_year(now);
        if !self.needs_refresh(&position, today) {
            return RefreshOutcome::NotNeeded;
        }

        match calc.phase_times(now, position.latitude, position.longitude) {
            Some(times) if !times.is_empty() => {
                self.zone = self
                    .zone_override
                    .or_else(|| calc.local_zone(position.latitude, position.longitude))
                    .unwrap_or(self.zone);
                self.last_day = Some(today);
                self.last_position = Some(position);
                self.times = Some(times.clone());
                RefreshOutcome::Refreshed(times)
            }
            _ => RefreshOutcome::Failed(format!(
                "no sun phase data for {:.4},{:.4} on day {}",
                position.latitude, position.longitude, today
            )),
        }
    }

    fn needs_refresh(&self, position: &Position, today: u32) -> bool {
        if self.times.is_none() || self.last_day != Some(today) {
            return true;
        }
        match &self.last_position {
            Some(last) => !last.within_degree(position),
            None => true,
        }
    }
}

/// Calendar day within the year, in UTC, unaffected by time-of-day.
fn day_of_year(now: DateTime<Utc>) -> u32 {
    now.ordinal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    /// Calculator that counts invocations and can be switched to failing.
    struct CountingCalculator {
        calls: Cell<u32>,
        fail: bool,
    }

    impl CountingCalculator {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Cell::new(0),
                fail: true,
            }
        }
    }

    impl PhaseCalculator for CountingCalculator {
        fn phase_times(&self, now: DateTime<Utc>, _lat: f64, _lon: f64) -> Option<PhaseTimes> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return None;
            }
            let mut times = PhaseTimes::new();
            times.insert("sunrise", now.date_naive().and_hms_opt(6, 0, 0).unwrap().and_utc());
            Some(times)
        }
    }

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    const HOME: Position = Position {
        latitude: 57.0,
        longitude: -3.0,
    };

    #[test]
    fn first_sample_always_refreshes() {
        let calc = CountingCalculator::new();
        let mut cache = PhaseCache::new(None);
        let outcome = cache.maybe_refresh(&calc, HOME, noon(2024, 6, 21));
        assert!(matches!(outcome, RefreshOutcome::Refreshed(_)));
        assert_eq!(calc.calls.get(), 1);
    }

    #[test]
    fn nearby_position_same_day_is_not_needed() {
        let calc = CountingCalculator::new();
        let mut cache = PhaseCache::new(None);
        cache.maybe_refresh(&calc, HOME, noon(2024, 6, 21));

        let nearby = Position {
            latitude: HOME.latitude + 1.0,
            longitude: HOME.longitude - 1.0,
        };
        let outcome = cache.maybe_refresh(&calc, nearby, noon(2024, 6, 21));
        assert_eq!(outcome, RefreshOutcome::NotNeeded);
        assert_eq!(calc.calls.get(), 1);
    }

    #[test]
    fn moving_more_than_one_degree_refreshes() {
        let calc = CountingCalculator::new();
        let mut cache = PhaseCache::new(None);
        cache.maybe_refresh(&calc, HOME, noon(2024, 6, 21));

        let far = Position {
            latitude: HOME.latitude,
            longitude: HOME.longitude + 1.5,
        };
        let outcome = cache.maybe_refresh(&calc, far, noon(2024, 6, 21));
        assert!(matches!(outcome, RefreshOutcome::Refreshed(_)));
        assert_eq!(calc.calls.get(), 2);
    }

    #[test]
    fn day_rollover_refreshes_at_an_unchanged_position() {
        let calc = CountingCalculator::new();
        let mut cache = PhaseCache::new(None);
        cache.maybe_refresh(&calc, HOME, noon(2024, 6, 21));

        let outcome = cache.maybe_refresh(&calc, HOME, noon(2024, 6, 22));
        assert!(matches!(outcome, RefreshOutcome::Refreshed(_)));
        // Time-of-day alone never triggers: a later sample the same day is
        // still NotNeeded.
        let later = Utc.with_ymd_and_hms(2024, 6, 22, 23, 59, 0).unwrap();
        assert_eq!(cache.maybe_refresh(&calc, HOME, later), RefreshOutcome::NotNeeded);
    }

    #[test]
    fn failed_computation_keeps_stale_table_and_retries() {
        let ok = CountingCalculator::new();
        let bad = CountingCalculator::failing();
        let mut cache = PhaseCache::new(None);
        cache.maybe_refresh(&ok, HOME, noon(2024, 6, 21));
        let stale = cache.times().cloned();

        // Rollover with a failing calculator: Failed, table untouched.
        let outcome = cache.maybe_refresh(&bad, HOME, noon(2024, 6, 22));
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert_eq!(cache.times().cloned(), stale);

        // The trigger state was not advanced either, so the next sample
        // attempts the computation again.
        let outcome = cache.maybe_refresh(&bad, HOME, noon(2024, 6, 22));
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert_eq!(bad.calls.get(), 2);
    }

    #[test]
    fn failure_on_first_sample_leaves_cache_empty() {
        let bad = CountingCalculator::failing();
        let mut cache = PhaseCache::new(None);
        let outcome = cache.maybe_refresh(&bad, HOME, noon(2024, 6, 21));
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert!(cache.times().is_none());
    }
}
