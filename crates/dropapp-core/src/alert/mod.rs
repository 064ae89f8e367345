mod channels;
mod coordinator;
mod desktop;
mod terminal;

pub use channels::{
    AlarmAudio, ChannelSet, Flashlight, Notifier, NullAudio, NullFlashlight, NullNotifier,
    NullVibration, PendingReminder, Vibration,
};
pub use coordinator::{
    plan, AlertCoordinator, AlertSettings, ChannelPlan, FlashlightCmd, VibrationCmd,
    ACK_REMINDER_LEAD_MS, FLASH_SOLID_MS, FLASH_STROBE_MS, IMPACT_PULSE_MS, REMINDER_BODY,
    REMINDER_ID, REMINDER_TITLE, SHORT_PULSE_FRAMES, SHORT_PULSE_MS, START_REMINDER_LEAD_MS,
    STROBE_PERIOD_MS,
};
pub use desktop::DesktopNotifier;
pub use terminal::{TerminalBell, TerminalFlashlight};
