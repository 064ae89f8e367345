//! Core countdown engine.
//!
//! The engine is a wall-clock-based state machine. It owns no thread and
//! never reads the clock itself - the caller passes `now` (epoch ms) into
//! `tick()` periodically and into every command, which keeps transitions
//! deterministic and testable.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Counting --(countdown hits zero)--> Alerting
//!                    ^                                    |
//!                    +-------------acknowledge------------+
//! ```
//!
//! There is no path back to `Idle`; once started, the cycle repeats until
//! the process exits.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(1.0);
//! engine.start(now_ms());
//! // In a loop:
//! let outcome = engine.tick(now_ms());
//! // outcome.event carries Event::AlertEntered exactly on the crossing tick
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::display::progress_pct;
use crate::events::Event;

/// Longest accepted reminder interval, in hours.
pub const MAX_INTERVAL_HOURS: f64 = 24.0;

/// Fallback interval (one hour) when no valid value was ever configured.
pub const DEFAULT_INTERVAL_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Configured but never started.
    Idle,
    /// Counting down toward the next reminder.
    Counting,
    /// Countdown hit zero; nagging until the user drinks.
    Alerting,
}

/// Per-tick view of the engine, consumed by renderers and the alert
/// coordinator. Carries no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedState {
    pub phase: Phase,
    pub remaining_ms: u64,
    /// How long the engine has been alerting. Zero outside `Alerting`.
    pub alert_elapsed_ms: u64,
}

/// What a single `tick()` produced.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: DerivedState,
    /// `Some(Event::AlertEntered)` exactly on the tick that crossed zero.
    pub event: Option<Event>,
}

/// Core countdown state machine.
///
/// Serializable so the CLI can persist it between invocations; all fields
/// stay private and timestamps are plain epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    /// Reminder interval in milliseconds, always the last valid
    /// configured value.
    interval_ms: u64,
    /// When the current cycle began (epoch ms).
    #[serde(default)]
    cycle_start_ms: Option<u64>,
    /// When the alert phase began (epoch ms).
    #[serde(default)]
    alert_start_ms: Option<u64>,
    phase: Phase,
}

impl TimerEngine {
    /// Create a new engine in `Idle`. An invalid `interval_hours` falls
    /// back to the one-hour default.
    pub fn new(interval_hours: f64) -> Self {
        Self {
            interval_ms: interval_ms_from_hours(interval_hours)
                .unwrap_or(DEFAULT_INTERVAL_MS),
            cycle_start_ms: None,
            alert_start_ms: None,
            phase: Phase::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Milliseconds until the next reminder. Never negative; the full
    /// interval while `Idle`, zero while `Alerting`. A clock that jumped
    /// behind the cycle start reads as nothing elapsed.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            Phase::Idle => self.interval_ms,
            Phase::Alerting => 0,
            Phase::Counting => {
                let start = self.cycle_start_ms.unwrap_or(now_ms);
                self.interval_ms
                    .saturating_sub(now_ms.saturating_sub(start))
            }
        }
    }

    /// Full state snapshot event, for status output.
    pub fn snapshot(&self, now_ms: u64) -> Event {
        let remaining_ms = self.remaining_ms(now_ms);
        Event::StateSnapshot {
            phase: self.phase,
            remaining_ms,
            interval_ms: self.interval_ms,
            progress_pct: progress_pct(remaining_ms, self.interval_ms),
            alert_elapsed_ms: self.alert_elapsed_ms(now_ms),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────

    /// Update the reminder interval from an hour count.
    ///
    /// Only values with `0 < hours <= 24` are applied; anything else
    /// (zero, negative, too large, non-finite) keeps the previous
    /// interval without signalling an error. A running cycle keeps its
    /// start time, so a shorter interval is measured against the time
    /// already elapsed.
    pub fn configure(&mut self, interval_hours: f64) {
        if let Some(ms) = interval_ms_from_hours(interval_hours) {
            self.interval_ms = ms;
        }
    }

    /// Begin a fresh countdown cycle at `now_ms`. Valid in every phase.
    pub fn start(&mut self, now_ms: u64) -> Event {
        self.phase = Phase::Counting;
        self.cycle_start_ms = Some(now_ms);
        self.alert_start_ms = None;
        Event::CycleStarted {
            interval_ms: self.interval_ms,
            at: Utc::now(),
        }
    }

    /// The user drank: restart the countdown and report how long the
    /// alert had been running, if it was.
    pub fn acknowledge(&mut self, now_ms: u64) -> Event {
        let response_ms = match self.phase {
            Phase::Alerting => self
                .alert_start_ms
                .map(|start| now_ms.saturating_sub(start)),
            _ => None,
        };
        self.start(now_ms);
        Event::DrinkLogged {
            interval_ms: self.interval_ms,
            response_ms,
            at: Utc::now(),
        }
    }

    /// Advance the state machine against the given wall-clock time.
    ///
    /// The Counting -> Alerting transition happens exactly once, on the
    /// tick where the remaining time clamps to zero, and that tick carries
    /// `Some(Event::AlertEntered)`. For a fixed `now_ms` the returned
    /// state is stable across repeated calls.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if self.phase == Phase::Counting {
            let remaining_ms = self.remaining_ms(now_ms);
            if remaining_ms == 0 {
                self.phase = Phase::Alerting;
                self.alert_start_ms = Some(now_ms);
                return TickOutcome {
                    state: DerivedState {
                        phase: Phase::Alerting,
                        remaining_ms: 0,
                        alert_elapsed_ms: 0,
                    },
                    event: Some(Event::AlertEntered {
                        interval_ms: self.interval_ms,
                        at: Utc::now(),
                    }),
                };
            }
            return TickOutcome {
                state: DerivedState {
                    phase: Phase::Counting,
                    remaining_ms,
                    alert_elapsed_ms: 0,
                },
                event: None,
            };
        }

        TickOutcome {
            state: DerivedState {
                phase: self.phase,
                remaining_ms: self.remaining_ms(now_ms),
                alert_elapsed_ms: self.alert_elapsed_ms(now_ms),
            },
            event: None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────────

    fn alert_elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            Phase::Alerting => self
                .alert_start_ms
                .map(|start| now_ms.saturating_sub(start))
                .unwrap_or(0),
            _ => 0,
        }
    }
}

fn interval_ms_from_hours(hours: f64) -> Option<u64> {
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_INTERVAL_HOURS {
        return None;
    }
    Some((hours * 3_600_000.0).round() as u64)
}

/// Wall-clock epoch milliseconds, the `now_ms` the CLI feeds into the
/// engine.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
