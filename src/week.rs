//! Permissive parsing of chart-week timestamps.
//!
//! Chart exports disagree on date formats, and some rows carry garbage in the
//! week column. Anything we can't read becomes `None` instead of an error so the
//! row can stay in the table without contributing a year.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a chart week. Returns `None` for empty or unrecognised input.
pub fn parse_chart_week(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_iso_date() {
        let w = parse_chart_week("2020-01-04").unwrap();
        assert_eq!((w.year(), w.month(), w.day()), (2020, 1, 4));
    }

    #[test]
    fn test_datetime_variants() {
        assert!(parse_chart_week("2020-01-04 00:00:00").is_some());
        assert!(parse_chart_week("2020-01-04T00:00:00").is_some());
        assert!(parse_chart_week("2020-01-04T00:00:00.000").is_some());
        assert!(parse_chart_week("2020-01-04T00:00:00Z").is_some());
        assert!(parse_chart_week("2020-01-04T05:00:00+05:00").is_some());
    }

    #[test]
    fn test_slash_formats() {
        assert_eq!(parse_chart_week("2019/12/28").map(|w| w.year()), Some(2019));
        assert_eq!(parse_chart_week("12/28/2019").map(|w| w.year()), Some(2019));
    }

    #[test]
    fn test_rfc3339_keeps_own_offset() {
        let w = parse_chart_week("2021-01-01T02:00:00+05:00").unwrap();
        assert_eq!(w.year(), 2021);
        assert_eq!(w.to_string(), "2021-01-01 02:00:00");
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_chart_week(""), None);
        assert_eq!(parse_chart_week("   "), None);
        assert_eq!(parse_chart_week("not a date"), None);
        assert_eq!(parse_chart_week("2020-13-45"), None);
        assert_eq!(parse_chart_week("NaT"), None);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert!(parse_chart_week("  2022-06-11 ").is_some());
    }
}
