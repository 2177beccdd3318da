//! Human-readable uptime formatting.

/// Render an uptime in the two most significant units.
pub fn format_uptime(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if seconds < MINUTE {
        format!("{seconds}s")
    } else if seconds < HOUR {
        format!("{}m {}s", seconds / MINUTE, seconds % MINUTE)
    } else if seconds < DAY {
        format!("{}h {}m", seconds / HOUR, (seconds % HOUR) / MINUTE)
    } else {
        format!("{}d {}h", seconds / DAY, (seconds % DAY) / HOUR)
    }
}
