//! Lenient date parsing for travel plan windows.
//!
//! The API stores plan dates as whatever the client sent: bare dates from
//! date pickers, or full ISO timestamps from older clients. Plans are
//! day-granular, so everything is reduced to a UTC calendar day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date or timestamp string into its UTC calendar day.
///
/// Returns `None` for anything unrecognized.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc().date());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Parse a request's "now": an RFC 3339 timestamp, or a bare date meaning
/// midnight UTC
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(ts.with_timezone(&Utc));
    }
    parse_day(raw).map(|day| day.and_time(NaiveTime::MIN).and_utc())
}

/// Inclusive day range a travel plan covers. `end == None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl PlanWindow {
    /// Build a window from raw start/end strings.
    ///
    /// A present-but-unparseable end date, or an end before the start, makes
    /// the whole window invalid rather than silently open-ended.
    pub fn parse(start: &str, end: Option<&str>) -> Option<Self> {
        let start = parse_day(start)?;
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_day(raw)?),
            None => None,
        };

        if let Some(end) = end
            && end < start
        {
            return None;
        }

        Some(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && self.end.is_none_or(|end| day <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_day("2024-01-05"), Some(day("2024-01-05")));
        assert_eq!(parse_day(" 2024-01-05 "), Some(day("2024-01-05")));
        assert_eq!(parse_day("2024-01-05T10:00:00Z"), Some(day("2024-01-05")));
        assert_eq!(
            parse_day("2024-01-05T10:00:00.000Z"),
            Some(day("2024-01-05"))
        );
        assert_eq!(parse_day("2024-01-05T10:00:00"), Some(day("2024-01-05")));
        assert_eq!(parse_day("2024-01-05 10:00:00"), Some(day("2024-01-05")));
    }

    #[test]
    fn test_offset_timestamps_use_utc_day() {
        // 01:00 at +02:00 is still the previous day in UTC
        assert_eq!(
            parse_day("2024-01-05T01:00:00+02:00"),
            Some(day("2024-01-04"))
        );
    }

    #[test]
    fn test_malformed_dates() {
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("soon"), None);
        assert_eq!(parse_day("2024-13-40"), None);
        assert_eq!(parse_day("Invalid Date"), None);
    }

    #[test]
    fn test_parse_instant() {
        use chrono::TimeZone;
        assert_eq!(
            parse_instant("2024-01-05T10:30:00+01:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_instant("2024-01-05"),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant("yesterday"), None);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let w = PlanWindow::parse("2024-01-01", Some("2024-01-10")).unwrap();
        assert!(!w.contains(day("2023-12-31")));
        assert!(w.contains(day("2024-01-01")));
        assert!(w.contains(day("2024-01-10")));
        assert!(!w.contains(day("2024-01-11")));
    }

    #[test]
    fn test_window_open_ended() {
        let w = PlanWindow::parse("2024-01-01", None).unwrap();
        assert!(w.contains(day("2099-01-01")));

        let w = PlanWindow::parse("2024-01-01", Some("  ")).unwrap();
        assert_eq!(w.end, None);
    }

    #[test]
    fn test_window_rejects_bad_end() {
        assert_eq!(PlanWindow::parse("2024-01-10", Some("2024-01-01")), None);
        assert_eq!(PlanWindow::parse("2024-01-01", Some("whenever")), None);
        assert_eq!(PlanWindow::parse("garbage", Some("2024-01-01")), None);
    }
}
