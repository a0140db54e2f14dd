use chrono::{DateTime, Local, SecondsFormat, Utc};

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Compact stamp used in artifact file names.
pub fn file_stamp(now: &DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Fixed-width RFC 3339 (microseconds, `Z` suffix), so stored values sort as text.
pub fn utc_rfc3339(now: &DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn format_local(at: &DateTime<Utc>, pattern: &str) -> String {
    at.with_timezone(&Local).format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamps_are_fixed_width() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(file_stamp(&at), "20240309_070501");
        assert_eq!(utc_rfc3339(&at), "2024-03-09T07:05:01.000000Z");
    }
}
