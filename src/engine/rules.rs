//! Window rules and their hysteresis state machines.
//!
//! A rule owns two boundary expressions and two notification descriptors.
//! Every sample re-classifies "now" against the window, but a notification
//! is only emitted when the classification differs from what was last
//! asserted — re-evaluation against an unchanged window is silent.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::expr::{self, ExpressionError};
use crate::phases::PhaseTimes;

/// Severity carried on a raised notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Alert,
    Warn,
    Alarm,
    Emergency,
}

/// Delivery method requested for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Visual,
    Sound,
}

/// One of the two notification descriptors on a window rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationSpec {
    /// User path fragment the notification is raised under.
    pub key: String,
    #[serde(default)]
    pub state: Severity,
    #[serde(default)]
    pub method: Vec<Method>,
}

/// A notification value as published to a notification path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub state: Severity,
    pub method: Vec<Method>,
    pub message: String,
}

/// One configured rule: window boundaries plus the notification to assert on
/// each side of the window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowRuleConfig {
    pub range_low: String,
    pub range_high: String,
    pub in_range: NotificationSpec,
    pub out_range: NotificationSpec,
}

/// Which side of the window was last asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleState {
    #[default]
    Unset,
    AssertedIn,
    AssertedOut,
}

/// The pair of deltas produced by one rule transition: clear the previously
/// asserted notification path, then raise the other one.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAction {
    pub clear_path: String,
    pub raise_path: String,
    pub notification: Notification,
}

/// A window rule plus its hysteresis memory. Lives for the process lifetime;
/// the state persists across evaluations and is only ever changed here.
#[derive(Debug, Clone)]
pub struct WindowRule {
    config: WindowRuleConfig,
    state: RuleState,
}

impl WindowRule {
    pub fn new(config: WindowRuleConfig) -> Self {
        Self {
            config,
            state: RuleState::Unset,
        }
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    /// Classify `now_seconds` against the window and emit the transition
    /// actions if the classification differs from the last asserted state.
    ///
    /// The comparisons are strict on both ends: the boundary instants
    /// themselves classify as out-of-range. Expression failures leave the
    /// state untouched.
    pub fn evaluate(
        &mut self,
        now_seconds: i64,
        times: &PhaseTimes,
        zone: &Tz,
        root: &str,
    ) -> Result<Option<RuleAction>, ExpressionError> {
        let low = expr::evaluate(&self.config.range_low, times, zone)?;
        let high = expr::evaluate(&self.config.range_high, times, zone)?;
        let in_range = now_seconds > low && now_seconds < high;

        let action = if in_range && self.state != RuleState::AssertedIn {
            self.state = RuleState::AssertedIn;
            Some(RuleAction {
                clear_path: notification_path(root, &self.config.out_range.key),
                raise_path: notification_path(root, &self.config.in_range.key),
                notification: Notification {
                    state: self.config.in_range.state,
                    method: self.config.in_range.method.clone(),
                    message: format!(
                        "Between {} and {}.",
                        self.config.range_low, self.config.range_high
                    ),
                },
            })
        } else if !in_range && self.state != RuleState::AssertedOut {
            self.state = RuleState::AssertedOut;
            Some(RuleAction {
                clear_path: notification_path(root, &self.config.in_range.key),
                raise_path: notification_path(root, &self.config.out_range.key),
                notification: Notification {
                    state: self.config.out_range.state,
                    method: self.config.out_range.method.clone(),
                    message: format!(
                        "Outside {} and {}.",
                        self.config.range_low, self.config.range_high
                    ),
                },
            })
        } else {
            None
        };

        Ok(action)
    }
}

/// Notification path for a rule key under the (normalized) root.
fn notification_path(root: &str, key: &str) -> String {
    format!("notifications.{root}{key}")
}
