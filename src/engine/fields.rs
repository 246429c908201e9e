// src/engine/fields.rs
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use url::Url;

use super::dates::resolve_paragraph;
use crate::core::{
    html::{attr, class_of, following_elements, flatten_text, has_ancestor, is_tag, leading_text, subtree, text_content},
    sanitize::absolutize,
};
use crate::model::GameRecord;

static SEATS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+мест\s+из\s+(\d+)").expect("valid regex"));

/// Labels of the `table-single` rows we read.
const SETTING: &str = "Сеттинг:";
const SYSTEM: &str = "Система:";
const GENRE: &str = "Жанр:";
const HOST: &str = "Игру проводит:";
const SEATS_LABEL: &str = "Места:";
const DESCRIPTION_CAPTION: &str = "Описание";

/// `game-single`, or `event-single` without a longer `event-single-*` modifier.
pub fn is_event_block(class: &str) -> bool {
    class == "game-single" || (class.contains("event-single") && !class.contains("event-single-"))
}

pub fn is_day_header(class: &str) -> bool {
    class.contains("event-day")
}

/// `(free, total)` from "Осталось 3 мест из 6" or "1 мест из 2".
pub fn parse_seats(text: &str) -> Option<(u32, u32)> {
    let caps = SEATS.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Block id attribute, else "game" + last path segment of the page URL.
pub fn block_id(block: ElementRef<'_>, page_url: &str) -> String {
    let id = attr(block, "id").trim();
    if !id.is_empty() {
        return s!(id);
    }
    let tail = page_url.rsplit('/').next().unwrap_or(page_url);
    format!("game{tail}")
}

/// Read one event block into a record. The date here comes only from the
/// block's own date paragraph; slot and calendar dates are applied later.
pub fn read_block(block: ElementRef<'_>, page_url: &str, root: &Url) -> GameRecord {
    let mut rec = GameRecord::new(block_id(block, page_url), page_url);
    rec.slot = attr(block, "data-timeslot").trim().parse().unwrap_or(0);

    for el in subtree(block) {
        let class = class_of(el);
        match el.value().name() {
            "h4" if rec.title.is_empty() => read_title(el, &mut rec, root),
            "p" => {
                if class == "subcaption-h4" && rec.scheduled_at.is_none() {
                    rec.scheduled_at = resolve_paragraph(el);
                }
                if class.contains("game-description")
                    && rec.notes.is_empty()
                    && has_ancestor(el, |a| is_tag(a, "div") && class_of(a).contains("i-notes"))
                {
                    rec.notes = flatten_text(el);
                }
            }
            "div" if class == "caption" && rec.description.is_empty() => {
                if leading_text(el).map(str::trim) == Some(DESCRIPTION_CAPTION) {
                    rec.description = description_after(el);
                }
            }
            "table" if class.contains("table-single") => read_table(el, &mut rec, root),
            _ => {}
        }
    }
    rec
}

fn read_title(h4: ElementRef<'_>, rec: &mut GameRecord, root: &Url) {
    if class_of(h4) != "game-title" {
        // nested listings carry their own headings
        if has_ancestor(h4, |a| matches!(class_of(a), "event-xs" | "info")) {
            return;
        }
        if let Some(text) = leading_text(h4) {
            rec.title = s!(text.trim());
        }
    }
    let link = subtree(h4).skip(1).find(|a| is_tag(*a, "a") && leading_text(*a).is_some());
    if let Some(a) = link {
        rec.title = leading_text(a).map(|t| s!(t.trim())).unwrap_or_default();
        let href = attr(a, "href").trim();
        if !href.is_empty() {
            rec.url = absolutize(root, href);
        }
    }
}

fn read_table(table: ElementRef<'_>, rec: &mut GameRecord, root: &Url) {
    for td in subtree(table).filter(|e| is_tag(*e, "td")) {
        let Some(label) = leading_text(td).map(str::trim) else { continue };
        if !matches!(label, SETTING | SYSTEM | GENRE | HOST | SEATS_LABEL) {
            continue;
        }
        // label, spacer, value
        let Some(value) = following_elements(td).nth(1) else { continue };
        match label {
            SETTING => rec.setting = text_content(value),
            SYSTEM => rec.system = text_content(value),
            GENRE => rec.genre = text_content(value),
            HOST => {
                if let Some(a) = subtree(value).find(|e| is_tag(*e, "a")) {
                    rec.host_name = text_content(a);
                    let href = attr(a, "href").trim();
                    if !href.is_empty() {
                        rec.host_link = absolutize(root, href);
                    }
                }
            }
            _ => {
                if let Some((free, total)) = parse_seats(&text_content(value)) {
                    rec.seats_free = free;
                    rec.seats_total = total;
                }
            }
        }
    }
}

fn description_after(caption: ElementRef<'_>) -> String {
    following_elements(caption)
        .next()
        .and_then(|sib| subtree(sib).find(|e| class_of(*e) == "game-description"))
        .map(flatten_text)
        .unwrap_or_default()
}
