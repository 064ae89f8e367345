//! Terminal stand-ins for phone-grade alert hardware.
//!
//! The flashlight maps to DECSCNM reverse video, so the whole terminal
//! "lights up"; the alarm maps to the ASCII bell. Terminals that ignore
//! the escapes degrade to doing nothing.

use std::io::Write;

use super::channels::{AlarmAudio, Flashlight};
use crate::error::ChannelError;

const REVERSE_VIDEO_ON: &[u8] = b"\x1b[?5h";
const REVERSE_VIDEO_OFF: &[u8] = b"\x1b[?5l";

/// Flashlight channel that inverts the terminal colors.
pub struct TerminalFlashlight;

impl Flashlight for TerminalFlashlight {
    fn enable(&mut self) -> Result<(), ChannelError> {
        let mut out = std::io::stdout();
        out.write_all(REVERSE_VIDEO_ON)?;
        out.flush()?;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ChannelError> {
        let mut out = std::io::stdout();
        out.write_all(REVERSE_VIDEO_OFF)?;
        out.flush()?;
        Ok(())
    }
}

/// Alarm channel that rings the terminal bell (BEL, 0x07).
pub struct TerminalBell;

impl AlarmAudio for TerminalBell {
    fn play_alarm(&mut self) -> Result<(), ChannelError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}
