// src/core/time.rs
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Weekday};

/// Moscow has kept UTC+3 all year round since 2014.
static MSK: LazyLock<FixedOffset> =
    LazyLock::new(|| FixedOffset::east_opt(3 * 3600).expect("valid offset"));

pub fn msk() -> FixedOffset {
    *MSK
}

/// Moscow civil time for a calendar date and clock time.
pub fn at_msk(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<FixedOffset>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    msk().from_local_datetime(&naive).single()
}

/// Calendar feed timestamps. Offsets are honoured; naive values are read
/// as Moscow time; a bare date means midnight.
pub fn parse_feed_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&msk()));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return msk().from_local_datetime(&naive).single();
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| at_msk(d, 0, 0))
}

pub fn weekday_caps(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "ПОНЕДЕЛЬНИК",
        Weekday::Tue => "ВТОРНИК",
        Weekday::Wed => "СРЕДА",
        Weekday::Thu => "ЧЕТВЕРГ",
        Weekday::Fri => "ПЯТНИЦА",
        Weekday::Sat => "СУББОТА",
        Weekday::Sun => "ВОСКРЕСЕНЬЕ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn feed_timestamp_formats() {
        let with_offset = parse_feed_timestamp("2025-10-24T19:00:00+03:00").unwrap();
        assert_eq!((with_offset.day(), with_offset.hour()), (24, 19));

        // UTC is shifted into Moscow time
        let utc = parse_feed_timestamp("2025-10-24T16:00:00Z").unwrap();
        assert_eq!(utc.hour(), 19);
        assert_eq!(utc.offset(), &msk());

        let naive_t = parse_feed_timestamp("2025-10-30T19:30:00").unwrap();
        assert_eq!((naive_t.hour(), naive_t.minute()), (19, 30));

        let naive_space = parse_feed_timestamp("2025-10-30 19:00:00").unwrap();
        assert_eq!(naive_space, naive_t - chrono::TimeDelta::minutes(30));

        let date_only = parse_feed_timestamp("2025-10-30").unwrap();
        assert_eq!((date_only.day(), date_only.hour()), (30, 0));
    }

    #[test]
    fn feed_timestamp_rejects_garbage() {
        assert!(parse_feed_timestamp("").is_none());
        assert!(parse_feed_timestamp("30.10.2025").is_none());
        assert!(parse_feed_timestamp("tomorrow").is_none());
    }

    #[test]
    fn at_msk_rejects_invalid_clock() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 19).unwrap();
        assert!(at_msk(d, 24, 0).is_none());
        assert_eq!(at_msk(d, 10, 0).unwrap().to_rfc3339(), "2025-04-19T10:00:00+03:00");
    }
}
