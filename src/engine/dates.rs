// src/engine/dates.rs
use std::{collections::HashMap, sync::LazyLock};

use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use scraper::ElementRef;
use tracing::{debug, warn};

use super::types::{InlineDate, SlotTable};
use crate::core::{
    html::{attr, child_elements, class_of, leading_text, text_content},
    time::{at_msk, parse_feed_timestamp},
};
use crate::model::GameRecord;
use crate::scrape::EventMetadata;

/// "Суббота — 19.04.2025", "Воскресенье (09.11) — 9.11.2025"
static DAY_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Cyrillic}]+(?:\s+\([^\)]+\))?\s—\s(\d{1,2})\.(\d{2})\.(\d{4})").expect("valid regex")
});

/// "Утро (10:00", "День (11:00-15:00)"
static TAB_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Cyrillic}]+\s*\((\d{2}):(\d{2})").expect("valid regex"));

/// "30 октября 2025, 19:00", optionally followed by "- 23:00"
static INLINE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s+([\p{Cyrillic}]+)\s+(\d{4}),\s*(\d{2}):(\d{2})(?:\s*-\s*(\d{2}):(\d{2}))?")
        .expect("valid regex")
});

/// "Пятница (19:00 - 23:00)"
static TIME_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Cyrillic}]+\s+\((\d{2}):(\d{2})\s*-\s*\d{2}:\d{2}\)").expect("valid regex")
});

/// "(19:00 - 23:00)" anywhere
static TIME_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{2}):(\d{2})\s*-\s*\d{2}:\d{2}\)").expect("valid regex"));

/// Genitive and nominative month names.
pub fn month_number(name: &str) -> Option<u32> {
    let m = match name.to_lowercase().as_str() {
        "января" | "январь" => 1,
        "февраля" | "февраль" => 2,
        "марта" | "март" => 3,
        "апреля" | "апрель" => 4,
        "мая" | "май" => 5,
        "июня" | "июнь" => 6,
        "июля" | "июль" => 7,
        "августа" | "август" => 8,
        "сентября" | "сентябрь" => 9,
        "октября" | "октябрь" => 10,
        "ноября" | "ноябрь" => 11,
        "декабря" | "декабрь" => 12,
        _ => return None,
    };
    Some(m)
}

fn num(caps: &regex::Captures<'_>, i: usize) -> Option<u32> {
    caps.get(i)?.as_str().parse().ok()
}

pub fn parse_day_caption(text: &str) -> Option<NaiveDate> {
    let caps = DAY_CAPTION.captures(text)?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, num(&caps, 2)?, num(&caps, 1)?)
}

pub fn parse_tab_time(text: &str) -> Option<(u32, u32)> {
    let caps = TAB_TIME.captures(text)?;
    Some((num(&caps, 1)?, num(&caps, 2)?))
}

/// Start of the first "(HH:MM - HH:MM)" range in `text`.
pub fn range_start(text: &str) -> Option<(u32, u32)> {
    let caps = TIME_RANGE.captures(text)?;
    Some((num(&caps, 1)?, num(&caps, 2)?))
}

pub fn parse_inline_date(text: &str) -> InlineDate {
    if let Some(caps) = INLINE_DATE.captures(text) {
        let month_name = caps.get(2).map_or("", |m| m.as_str());
        match month_number(month_name) {
            Some(month) => {
                let date = caps
                    .get(3)
                    .and_then(|y| y.as_str().parse::<i32>().ok())
                    .zip(num(&caps, 1))
                    .and_then(|(year, day)| NaiveDate::from_ymd_opt(year, month, day));
                let at = date.zip(num(&caps, 4).zip(num(&caps, 5)))
                    .and_then(|(d, (h, m))| at_msk(d, h, m));
                if let Some(at) = at {
                    return InlineDate::Found(at);
                }
                debug!(text, "inline date out of range");
            }
            None => warn!(month = month_name, text, "unknown month name"),
        }
    }
    if TIME_ONLY.is_match(text) {
        debug!(text, "time-only paragraph, date left to fallback");
        return InlineDate::TimeOnly;
    }
    InlineDate::NoMatch
}

/// Read a date paragraph text node by text node. A time-only fragment
/// stops the search so a later node cannot supply a wrong date.
pub fn resolve_paragraph(p: ElementRef<'_>) -> Option<DateTime<FixedOffset>> {
    for raw in p.text() {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        match parse_inline_date(text) {
            InlineDate::Found(at) => return Some(at),
            InlineDate::TimeOnly => return None,
            InlineDate::NoMatch => debug!(raw_date = text, "failed to parse date"),
        }
    }
    None
}

/// Walk the children of an `event-day` header: the caption sets the day,
/// each tab adds a slot on that day.
pub fn collect_slots(day: ElementRef<'_>, table: &mut SlotTable) {
    for el in child_elements(day) {
        let class = class_of(el);
        if class == "caption" {
            if let Some(text) = leading_text(el) {
                match parse_day_caption(text) {
                    Some(d) => table.day = Some(d),
                    None => debug!(date_text = text, "day caption did not match"),
                }
            }
        } else if class == "tabs-caption" {
            collect_slots(el, table);
        } else if class.contains("tab-caption") {
            add_tab(el, table);
        }
    }
}

fn add_tab(tab: ElementRef<'_>, table: &mut SlotTable) {
    let slot: u32 = attr(tab, "data-timeslot").trim().parse().unwrap_or(0);
    let Some((hour, minute)) = leading_text(tab).and_then(parse_tab_time) else {
        return;
    };
    let Some(day) = table.day else {
        warn!(slot, "time slot before any day header");
        return;
    };
    if slot == 0 {
        debug!("time tab without a slot id");
        return;
    }
    if let Some(at) = at_msk(day, hour, minute) {
        table.starts.insert(slot, at);
    }
}

/// Slot → start time read from every tab caption's "(HH:MM - HH:MM)".
pub fn tab_range_starts<'a>(tabs: impl Iterator<Item = ElementRef<'a>>) -> HashMap<u32, (u32, u32)> {
    let mut out = HashMap::new();
    for tab in tabs {
        let raw = attr(tab, "data-timeslot");
        let Ok(slot) = raw.trim().parse::<u32>() else {
            debug!(timeslot = raw, "tab caption without numeric slot");
            continue;
        };
        if let Some(hm) = range_start(&text_content(tab)) {
            out.insert(slot, hm);
        }
    }
    out
}

/// Date from the calendar entry, clock time from the page when it has one.
///
/// `page_times` maps slot → (hour, minute) as read from the page. Midnight
/// counts as "no time found" and the calendar's own time is used.
pub fn apply_metadata_fallback(
    records: &mut [GameRecord],
    meta: &EventMetadata,
    page_times: &HashMap<u32, (u32, u32)>,
) {
    let Some(start) = parse_feed_timestamp(&meta.start) else {
        debug!(start = %meta.start, "calendar start did not parse");
        return;
    };
    for r in records.iter_mut().filter(|r| r.scheduled_at.is_none()) {
        let from_page = page_times
            .get(&r.slot)
            .filter(|(h, m)| *h > 0 || *m > 0)
            .and_then(|&(h, m)| at_msk(start.date_naive(), h, m));
        match from_page {
            Some(at) => {
                debug!(game_id = %r.external_id, slot = r.slot, time = %at.format("%H:%M"), "date from calendar, time from page");
                r.scheduled_at = Some(at);
            }
            None => {
                debug!(game_id = %r.external_id, slot = r.slot, "date and time from calendar");
                r.scheduled_at = Some(start);
            }
        }
    }
}
