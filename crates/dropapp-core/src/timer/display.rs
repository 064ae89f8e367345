//! Read-only formatting helpers for countdown state.

/// Zero-padded `HH:MM:SS` with floored seconds.
pub fn format_hms(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Share of the interval already elapsed, clamped to `0.0..=100.0`.
pub fn progress_pct(remaining_ms: u64, interval_ms: u64) -> f64 {
    if interval_ms == 0 {
        return 0.0;
    }
    ((1.0 - remaining_ms as f64 / interval_ms as f64) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_is_zero_padded() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3_725_000), "01:02:05");
        assert_eq!(format_hms(86_400_000), "24:00:00");
    }

    #[test]
    fn hms_floors_partial_seconds() {
        assert_eq!(format_hms(999), "00:00:00");
        assert_eq!(format_hms(1_999), "00:00:01");
    }

    #[test]
    fn progress_covers_the_interval() {
        assert_eq!(progress_pct(60_000, 60_000), 0.0);
        assert_eq!(progress_pct(30_000, 60_000), 50.0);
        assert_eq!(progress_pct(0, 60_000), 100.0);
        assert_eq!(progress_pct(10, 0), 0.0);
    }
}
