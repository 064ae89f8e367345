//! Event types emitted by the countdown engine.
//!
//! Every user action and phase transition produces an [`Event`]. The CLI
//! prints them as JSON; the drink log persists the acknowledgments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A fresh countdown cycle began (explicit start or acknowledge).
    CycleStarted {
        interval_ms: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero and the alert phase began.
    AlertEntered {
        interval_ms: u64,
        at: DateTime<Utc>,
    },
    /// The user acknowledged the reminder by drinking.
    DrinkLogged {
        interval_ms: u64,
        /// Time spent alerting before the acknowledge. `None` when the
        /// user drank ahead of the alert.
        response_ms: Option<u64>,
        at: DateTime<Utc>,
    },
    /// Point-in-time view of the engine, for `timer status`.
    StateSnapshot {
        phase: Phase,
        remaining_ms: u64,
        interval_ms: u64,
        progress_pct: f64,
        alert_elapsed_ms: u64,
        at: DateTime<Utc>,
    },
}
