//! Display helpers shared by every view.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

/// Elapsed session time as `MM:SS`. Minutes do not roll over into hours.
#[must_use]
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Short relative time: `just now`, `5m ago`, `3h ago`, or a plain date.
#[must_use]
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    then.format("%-m/%-d/%Y").to_string()
}

/// Human-readable size with one decimal for KB and MB.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1_048_576 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    }
}

/// Date label stored in the recent-sessions ledger, e.g. `Oct 19, 2:30 PM`.
#[must_use]
pub fn format_ledger_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%b %-d, %-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3600 + 61), "61:01");
        assert_eq!(format_elapsed(100 * 60), "100:00");
    }

    #[test]
    fn test_format_relative_time() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative_time(now - Duration::minutes(150), now), "2h ago");
        assert_eq!(format_relative_time(now - Duration::days(3), now), "10/16/2026");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2_457_600), "2.3 MB");
    }

    #[test]
    fn test_format_ledger_date() {
        let at = Utc.with_ymd_and_hms(2026, 2, 5, 14, 30, 0).unwrap();
        assert_eq!(format_ledger_date(&at), "Feb 5, 2:30 PM");
        let morning = Utc.with_ymd_and_hms(2026, 10, 19, 9, 5, 0).unwrap();
        assert_eq!(format_ledger_date(&morning), "Oct 19, 9:05 AM");
    }
}
