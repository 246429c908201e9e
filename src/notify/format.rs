// src/notify/format.rs
use chrono::{DateTime, Datelike, FixedOffset};

use crate::core::time::{msk, weekday_caps};
use crate::model::{GameRecord, Transition};

pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// `<b>СУББОТА</b> (19.04, 10:00)`
pub fn when_header(at: Option<DateTime<FixedOffset>>) -> String {
    match at {
        Some(at) => {
            let local = at.with_timezone(&msk());
            format!(
                "<b>{}</b> ({}, {})",
                weekday_caps(local.weekday()),
                local.format("%d.%m"),
                local.format("%H:%M")
            )
        }
        None => s!("<b>ДАТА НЕ УКАЗАНА</b>"),
    }
}

/// `3/6 <a href="…">Title</a> [System; Setting]`
pub fn game_line(r: &GameRecord) -> String {
    format!("{} [{}; {}]", linked_title(r, &r.title), escape(&r.system), escape(&r.setting))
}

fn linked_title(r: &GameRecord, title: &str) -> String {
    format!(
        "{}/{} <a href=\"{}\">{}</a>",
        r.seats_free,
        r.seats_total,
        html_escape::encode_double_quoted_attribute(&r.url),
        escape(title),
    )
}

/// [`game_line`] in at most `max` bytes. Too long a line loses its
/// `[System; Setting]` tag and gets a shortened title, then loses the link.
/// Cuts happen before escaping, so markup stays whole.
pub fn game_line_within(r: &GameRecord, max: usize) -> String {
    let full = game_line(r);
    if full.len() <= max {
        return full;
    }
    let chars: Vec<char> = r.title.chars().collect();
    let linked = |t: &str| linked_title(r, t);
    let plain = |t: &str| format!("{}/{} {}", r.seats_free, r.seats_total, escape(t));
    let forms: [&dyn Fn(&str) -> String; 2] = [&linked, &plain];
    for form in forms {
        for keep in (0..=chars.len()).rev() {
            let mut title: String = chars[..keep].iter().collect();
            if keep < chars.len() {
                title.push('…');
            }
            let line = form(&title);
            if line.len() <= max {
                return line;
            }
        }
    }
    format!("{}/{}", r.seats_free, r.seats_total)
}

pub fn headline(t: Transition) -> &'static str {
    match t {
        Transition::New => "🆕 Новая игра",
        Transition::BecameJoinable => "🎲 Освободились места",
        Transition::Cancelled => "❌ Игра отменена",
    }
}

pub fn transition_message(r: &GameRecord, t: Transition) -> String {
    format!("{}\n\n{}\n{}", headline(t), when_header(r.scheduled_at), game_line(r))
}
