//! The recompute/trigger engine.
//!
//! One `RuleEngine` instance processes position samples serially: refresh
//! the cached solar event table if the sample requires it, then re-evaluate
//! every window rule against the current wall-clock seconds-of-day. All
//! state lives in explicit owned structures (`cache::PhaseCache`, per-rule
//! hysteresis in `rules::WindowRule`); there is no shared ambient state and
//! no internal locking.
//!
//! - **`expr`**: boundary expression grammar and evaluation
//! - **`cache`**: event-table cache and the refresh trigger
//! - **`rules`**: window rules and their hysteresis state machines

pub mod cache;
pub mod expr;
pub mod rules;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::phases::{PhaseCalculator, PhaseTimes};
use crate::source::Position;
use cache::{PhaseCache, RefreshOutcome};
use rules::{RuleAction, WindowRule, WindowRuleConfig};

/// Everything one position sample produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleOutcome {
    /// The recomputed event table, present only when a refresh actually
    /// happened this sample. Publication follows refreshes, not samples.
    pub refreshed: Option<PhaseTimes>,
    /// Rule transitions, in configuration order.
    pub actions: Vec<RuleAction>,
}

/// Owns the rule set and the event cache; the single mutation path for both.
pub struct RuleEngine {
    cache: PhaseCache,
    rules: Vec<WindowRule>,
    root: String,
}

impl RuleEngine {
    /// Build an engine from a normalized root prefix, an optional timezone
    /// override and the configured rules (evaluated in the given order).
    pub fn new(root: String, zone_override: Option<Tz>, rules: Vec<WindowRuleConfig>) -> Self {
        Self {
            cache: PhaseCache::new(zone_override),
            rules: rules.into_iter().map(WindowRule::new).collect(),
            root,
        }
    }

    /// Process one position sample to completion.
    ///
    /// Rules are evaluated whenever *any* usable table exists, fresh or
    /// previously cached. Until a first table has been produced there is no
    /// schedule to classify against, so no notifications are raised. A
    /// failure inside one rule is logged and skipped; siblings and later
    /// samples are unaffected.
    pub fn on_sample(
        &mut self,
        calc: &dyn PhaseCalculator,
        position: Position,
        now: DateTime<Utc>,
    ) -> SampleOutcome {
        let refreshed = match self.cache.maybe_refresh(calc, position, now) {
            RefreshOutcome::NotNeeded => None,
            RefreshOutcome::Refreshed(times) => Some(times),
            RefreshOutcome::Failed(reason) => {
                log_warning!("unable to compute sun phase data: {reason}");
                None
            }
        };

        let mut actions = Vec::new();
        if let Some(times) = self.cache.times() {
            let zone = self.cache.zone();
            let now_seconds = i64::from(now.with_timezone(&zone).num_seconds_from_midnight());
            for rule in &mut self.rules {
                match rule.evaluate(now_seconds, times, &zone, &self.root) {
                    Ok(Some(action)) => actions.push(action),
                    Ok(None) => {}
                    Err(e) => log_warning!("notification rule skipped: {e}"),
                }
            }
        }

        SampleOutcome { refreshed, actions }
    }
}
