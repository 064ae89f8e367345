//! Side-effect channel contracts for the alert fan-out.
//!
//! Each channel is a separate trait so tests can inject recorders and
//! platforms can swap implementations. Every method is fire-and-forget
//! from the coordinator's point of view: a returned error is logged and
//! dropped, never retried.

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// A scheduled reminder notification that has not fired yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReminder {
    pub id: u32,
    /// Epoch ms at which the reminder should fire.
    pub fire_at_ms: u64,
    pub title: String,
    pub body: String,
}

/// Scheduled-notification channel.
pub trait Notifier {
    /// Replace-or-create a notification that fires after `delay_ms`.
    fn schedule(
        &mut self,
        id: u32,
        delay_ms: u64,
        title: &str,
        body: &str,
    ) -> Result<(), ChannelError>;

    /// Cancel a previously scheduled notification. Cancelling an unknown
    /// id is not an error.
    fn cancel(&mut self, id: u32) -> Result<(), ChannelError>;

    /// Deliver a scheduled notification that has come due. Implementations
    /// that hand scheduling to the OS can leave the no-op default.
    fn pump(&mut self, _now_ms: u64) -> Result<(), ChannelError> {
        Ok(()) // default no-op
    }

    /// The reminder still waiting to fire, if this implementation tracks
    /// one in-process.
    fn pending(&self) -> Option<PendingReminder> {
        None // default no-op
    }
}

/// Torch / screen-flash channel. Both calls are idempotent.
pub trait Flashlight {
    fn enable(&mut self) -> Result<(), ChannelError>;
    fn disable(&mut self) -> Result<(), ChannelError>;
}

/// Haptic channel.
pub trait Vibration {
    fn pulse(&mut self, duration_ms: u64) -> Result<(), ChannelError>;
}

/// Alarm-sound channel.
pub trait AlarmAudio {
    fn play_alarm(&mut self) -> Result<(), ChannelError>;
}

/// The injected channel bundle the coordinator drives.
pub struct ChannelSet {
    pub notifier: Box<dyn Notifier>,
    pub flashlight: Box<dyn Flashlight>,
    pub vibration: Box<dyn Vibration>,
    pub audio: Box<dyn AlarmAudio>,
}

impl ChannelSet {
    /// All-null channels, for commands with no delivery surface.
    pub fn silent() -> Self {
        Self {
            notifier: Box::new(NullNotifier),
            flashlight: Box::new(NullFlashlight),
            vibration: Box::new(NullVibration),
            audio: Box::new(NullAudio),
        }
    }
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn schedule(
        &mut self,
        _id: u32,
        _delay_ms: u64,
        _title: &str,
        _body: &str,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn cancel(&mut self, _id: u32) -> Result<(), ChannelError> {
        Ok(())
    }
}

pub struct NullFlashlight;

impl Flashlight for NullFlashlight {
    fn enable(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Desktop machines have no vibration motor; hardware without haptics
/// gets the silent no-op.
pub struct NullVibration;

impl Vibration for NullVibration {
    fn pulse(&mut self, _duration_ms: u64) -> Result<(), ChannelError> {
        Ok(())
    }
}

pub struct NullAudio;

impl AlarmAudio for NullAudio {
    fn play_alarm(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}
