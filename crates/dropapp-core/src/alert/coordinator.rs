//! Alert fan-out: decides, every tick, what each side-effect channel
//! should be doing, and issues the commands.
//!
//! Policy summary (remaining = countdown left, elapsed = time alerting):
//!
//! ```text
//! counting, remaining > 10s      flashlight off
//! counting, 5s < remaining <= 10s  flashlight steady on
//! counting, remaining <= 5s      flashlight strobes at 250ms
//! alerting, entry tick           strobe + impact pulse + alarm sound
//! alerting, ongoing              strobe + short pulse every 15th frame
//! ```
//!
//! Channels fail independently: every command result is logged and
//! dropped, and a failed command still counts as issued.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::channels::ChannelSet;
use crate::events::Event;
use crate::timer::{DerivedState, Phase, TickOutcome};

/// Flashlight steady-on window starts at this much remaining.
pub const FLASH_SOLID_MS: u64 = 10_000;
/// Flashlight strobe window starts at this much remaining.
pub const FLASH_STROBE_MS: u64 = 5_000;
/// Strobe half-period: on for 250ms, off for 250ms.
pub const STROBE_PERIOD_MS: u64 = 250;
/// Heavy pulse issued once when the alert begins.
pub const IMPACT_PULSE_MS: u64 = 300;
/// Light pulse repeated while the alert is ignored.
pub const SHORT_PULSE_MS: u64 = 120;
/// Dispatch frames between short pulses.
pub const SHORT_PULSE_FRAMES: u64 = 15;

/// Fixed id of the "time to drink" scheduled notification.
pub const REMINDER_ID: u32 = 1;
pub const REMINDER_TITLE: &str = "DropApp";
pub const REMINDER_BODY: &str = "Time for your next drop of water!";

/// Notification lead before the countdown ends, for cycles begun by an
/// explicit start.
pub const START_REMINDER_LEAD_MS: u64 = 10_000;
/// Lead for cycles begun by acknowledging a drink. Deliberately longer
/// than the start lead.
pub const ACK_REMINDER_LEAD_MS: u64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashlightCmd {
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationCmd {
    /// Heavy 300ms pulse.
    Impact,
    /// Light 120ms pulse.
    Short,
}

impl VibrationCmd {
    pub fn duration_ms(self) -> u64 {
        match self {
            VibrationCmd::Impact => IMPACT_PULSE_MS,
            VibrationCmd::Short => SHORT_PULSE_MS,
        }
    }
}

/// At most one command per channel per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPlan {
    pub flashlight: FlashlightCmd,
    pub vibration: Option<VibrationCmd>,
    pub play_alarm: bool,
}

/// Pure policy: what every channel should be doing for this state.
///
/// `alert_entered` marks the tick that crossed into the alert phase and
/// carries the one-shot effects. `frame` is the dispatch frame counter,
/// which drives the short-pulse cadence.
pub fn plan(state: &DerivedState, alert_entered: bool, frame: u64) -> ChannelPlan {
    match state.phase {
        Phase::Idle => ChannelPlan {
            flashlight: FlashlightCmd::Off,
            vibration: None,
            play_alarm: false,
        },
        Phase::Counting => {
            let flashlight = if state.remaining_ms > FLASH_SOLID_MS {
                FlashlightCmd::Off
            } else if state.remaining_ms > FLASH_STROBE_MS {
                FlashlightCmd::On
            } else {
                strobe(state.remaining_ms)
            };
            ChannelPlan {
                flashlight,
                vibration: None,
                play_alarm: false,
            }
        }
        Phase::Alerting => {
            let vibration = if alert_entered {
                Some(VibrationCmd::Impact)
            } else if frame % SHORT_PULSE_FRAMES == 0 {
                Some(VibrationCmd::Short)
            } else {
                None
            };
            ChannelPlan {
                flashlight: strobe(state.alert_elapsed_ms),
                vibration,
                play_alarm: alert_entered,
            }
        }
    }
}

/// On during even 250ms slots, off during odd ones.
fn strobe(ms: u64) -> FlashlightCmd {
    if (ms / STROBE_PERIOD_MS) % 2 == 0 {
        FlashlightCmd::On
    } else {
        FlashlightCmd::Off
    }
}

/// User-facing channel toggles applied on top of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub flash_enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            flash_enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

/// Drives the channel bundle from tick outcomes and user actions.
///
/// Remembers only the last flashlight command it issued, so duplicate
/// commands are suppressed; everything else is stateless between ticks
/// apart from the frame counter.
pub struct AlertCoordinator {
    settings: AlertSettings,
    frame: u64,
    last_flashlight: Option<FlashlightCmd>,
}

impl AlertCoordinator {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            settings,
            frame: 0,
            last_flashlight: None,
        }
    }

    pub fn settings(&self) -> AlertSettings {
        self.settings
    }

    /// Config-reload point; takes effect from the next dispatch.
    pub fn set_settings(&mut self, settings: AlertSettings) {
        self.settings = settings;
    }

    /// Issue this tick's commands. Each channel is invoked independently;
    /// a failure is logged and swallowed so one bad channel never blocks
    /// the others.
    pub fn dispatch(&mut self, outcome: &TickOutcome, channels: &mut ChannelSet) {
        self.frame = self.frame.wrapping_add(1);
        let alert_entered = matches!(outcome.event, Some(Event::AlertEntered { .. }));
        if alert_entered {
            debug!("alert phase entered");
        }
        let mut plan = plan(&outcome.state, alert_entered, self.frame);

        if !self.settings.flash_enabled {
            plan.flashlight = FlashlightCmd::Off;
        }
        if !self.settings.vibration_enabled {
            plan.vibration = None;
        }
        if !self.settings.sound_enabled {
            plan.play_alarm = false;
        }

        self.issue_flashlight(plan.flashlight, channels);
        if let Some(pulse) = plan.vibration {
            if let Err(e) = channels.vibration.pulse(pulse.duration_ms()) {
                warn!(error = %e, "vibration pulse failed");
            }
        }
        if plan.play_alarm {
            if let Err(e) = channels.audio.play_alarm() {
                warn!(error = %e, "alarm sound failed");
            }
        }
    }

    /// A fresh cycle from an explicit start. Returns the delay the
    /// reminder notification was scheduled with.
    pub fn on_start(&mut self, interval_ms: u64, channels: &mut ChannelSet) -> u64 {
        self.begin_cycle(interval_ms, START_REMINDER_LEAD_MS, channels)
    }

    /// A fresh cycle from a drink acknowledgment. Schedules the reminder
    /// with the longer lead.
    pub fn on_acknowledge(&mut self, interval_ms: u64, channels: &mut ChannelSet) -> u64 {
        self.begin_cycle(interval_ms, ACK_REMINDER_LEAD_MS, channels)
    }

    fn begin_cycle(&mut self, interval_ms: u64, lead_ms: u64, channels: &mut ChannelSet) -> u64 {
        // The off is issued unconditionally, bypassing the dedupe.
        if let Err(e) = channels.flashlight.disable() {
            warn!(error = %e, "flashlight disable failed");
        }
        self.last_flashlight = Some(FlashlightCmd::Off);

        if let Err(e) = channels.notifier.cancel(REMINDER_ID) {
            warn!(error = %e, "reminder cancel failed");
        }
        let delay_ms = interval_ms.saturating_sub(lead_ms);
        if let Err(e) =
            channels
                .notifier
                .schedule(REMINDER_ID, delay_ms, REMINDER_TITLE, REMINDER_BODY)
        {
            warn!(error = %e, "reminder schedule failed");
        }
        debug!(delay_ms, "reminder scheduled");
        delay_ms
    }

    fn issue_flashlight(&mut self, cmd: FlashlightCmd, channels: &mut ChannelSet) {
        if self.last_flashlight == Some(cmd) {
            return;
        }
        let result = match cmd {
            FlashlightCmd::On => channels.flashlight.enable(),
            FlashlightCmd::Off => channels.flashlight.disable(),
        };
        if let Err(e) = result {
            warn!(error = %e, "flashlight command failed");
        }
        // Recorded as issued either way; failures are not retried.
        self.last_flashlight = Some(cmd);
    }
}
