//! Time primitives.
//!
//! Two unrelated notions of time live here:
//! - `Time`: the monotonic interaction timebase (seconds) used by debouncing
//!   and frame throttling. Callers supply it, so behavior replays exactly.
//! - Calendar dates of historical events (`chrono`).

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn after(self, d: Duration) -> Self {
        Time(self.0 + d.as_secs_f64())
    }

    /// Seconds elapsed since `earlier` (never negative).
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

/// Parse an ISO-8601 date or timestamp into UTC.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 timestamps and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps (interpreted as UTC).
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Parse an ISO-8601 string down to its calendar date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    parse_iso_datetime(s).map(|dt| dt.date_naive())
}

/// Optional calendar range carried by a cluster.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct DateRange {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(min: Option<DateTime<Utc>>, max: Option<DateTime<Utc>>) -> Self {
        Self { min, max }
    }

    /// Whole days covered, rounded up; 0 if either end is missing or the range is inverted.
    pub fn span_days(&self) -> i64 {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return 0;
        };
        let ms = (max - min).num_milliseconds() as f64;
        ((ms / MS_PER_DAY).ceil() as i64).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{DateRange, Time, parse_iso_date, parse_iso_datetime};
    use chrono::NaiveDate;
    use std::time::Duration;

    #[test]
    fn time_after_and_since() {
        let t0 = Time::from_millis(1_500);
        let t1 = t0.after(Duration::from_millis(250));
        assert_eq!(t1, Time(1.75));
        assert_eq!(t1.since(t0), 0.25);
        assert_eq!(t0.since(t1), 0.0);
    }

    #[test]
    fn parses_dates_and_timestamps() {
        let d = NaiveDate::from_ymd_opt(1944, 6, 6).expect("date");
        assert_eq!(parse_iso_date("1944-06-06"), Some(d));
        assert_eq!(parse_iso_date("1944-06-06T05:30:00Z"), Some(d));
        assert_eq!(parse_iso_date("1944-06-06T05:30:00"), Some(d));
        assert!(parse_iso_datetime("June 1944").is_none());
    }

    #[test]
    fn span_rounds_partial_days_up() {
        let r = DateRange::new(
            parse_iso_datetime("1916-07-01"),
            parse_iso_datetime("1916-11-18"),
        );
        assert_eq!(r.span_days(), 140);

        let partial = DateRange::new(
            parse_iso_datetime("1916-07-01T00:00:00Z"),
            parse_iso_datetime("1916-07-02T06:00:00Z"),
        );
        assert_eq!(partial.span_days(), 2);
    }

    #[test]
    fn span_is_zero_when_an_end_is_missing() {
        let r = DateRange::new(parse_iso_datetime("1939-09-01"), None);
        assert_eq!(r.span_days(), 0);
        assert_eq!(DateRange::default().span_days(), 0);
    }
}
