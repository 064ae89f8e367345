//! Desktop notification delivery.
//!
//! There is no OS-level scheduler behind desktop toasts, so scheduling is
//! tracked in-process: `schedule` records the reminder and `pump` shows it
//! once due. The CLI persists the pending reminder between invocations so
//! a reminder scheduled by one command can be delivered by a later one.

use notify_rust::Notification;

use super::channels::{Notifier, PendingReminder};
use crate::error::ChannelError;
use crate::timer::now_ms;

/// Scheduled-notification channel backed by desktop toasts.
#[derive(Debug, Default)]
pub struct DesktopNotifier {
    pending: Option<PendingReminder>,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a reminder persisted by an earlier invocation.
    pub fn with_pending(pending: Option<PendingReminder>) -> Self {
        Self { pending }
    }

    /// Remove and return the pending reminder if it is due at `at_ms`.
    pub fn take_due(&mut self, at_ms: u64) -> Option<PendingReminder> {
        if self.pending.as_ref().is_some_and(|p| p.fire_at_ms <= at_ms) {
            self.pending.take()
        } else {
            None
        }
    }
}

impl Notifier for DesktopNotifier {
    fn schedule(
        &mut self,
        id: u32,
        delay_ms: u64,
        title: &str,
        body: &str,
    ) -> Result<(), ChannelError> {
        self.pending = Some(PendingReminder {
            id,
            fire_at_ms: now_ms().saturating_add(delay_ms),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn cancel(&mut self, id: u32) -> Result<(), ChannelError> {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.pending = None;
        }
        Ok(())
    }

    fn pump(&mut self, now_ms: u64) -> Result<(), ChannelError> {
        // The reminder is consumed before the show attempt; a delivery
        // failure drops it rather than retrying.
        if let Some(reminder) = self.take_due(now_ms) {
            Notification::new()
                .summary(&reminder.title)
                .body(&reminder.body)
                .appname("dropapp")
                .show()
                .map_err(|e| ChannelError::Delivery(e.to_string()))?;
        }
        Ok(())
    }

    fn pending(&self) -> Option<PendingReminder> {
        self.pending.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_tracks_a_pending_reminder() {
        let mut notifier = DesktopNotifier::new();
        let before = now_ms();
        notifier.schedule(1, 50_000, "DropApp", "body").unwrap();
        let pending = notifier.pending().unwrap();
        assert_eq!(pending.id, 1);
        assert!(pending.fire_at_ms >= before + 50_000);
    }

    #[test]
    fn schedule_replaces_the_previous_reminder() {
        let mut notifier = DesktopNotifier::new();
        notifier.schedule(1, 50_000, "t", "b").unwrap();
        notifier.schedule(1, 90_000, "t", "b").unwrap();
        let pending = notifier.pending().unwrap();
        assert!(pending.fire_at_ms >= now_ms() + 80_000);
    }

    #[test]
    fn cancel_only_clears_matching_ids() {
        let mut notifier = DesktopNotifier::new();
        notifier.schedule(1, 1_000, "t", "b").unwrap();
        notifier.cancel(2).unwrap();
        assert!(notifier.pending().is_some());
        notifier.cancel(1).unwrap();
        assert!(notifier.pending().is_none());
    }

    #[test]
    fn take_due_waits_for_the_deadline() {
        let mut notifier = DesktopNotifier::with_pending(Some(PendingReminder {
            id: 1,
            fire_at_ms: 1_000,
            title: "t".into(),
            body: "b".into(),
        }));
        assert!(notifier.take_due(999).is_none());
        let due = notifier.take_due(1_000).unwrap();
        assert_eq!(due.id, 1);
        assert!(notifier.pending().is_none());
    }
}
