// src/notify/digest.rs
use std::cmp::Reverse;

use super::format::{game_line_within, when_header};
use crate::config::DigestSort;
use crate::model::GameRecord;

pub const FULL_HEADER: &str = "Игры, на которые можно записаться:";
pub const DELTA_HEADER: &str = "Новые игры, на которые можно записаться:";

/// Timestamp order; ties broken per `sort`. Stable.
pub fn sort_games(games: &mut [GameRecord], sort: DigestSort) {
    match sort {
        DigestSort::Chronological => games.sort_by_key(|g| g.scheduled_at),
        DigestSort::FreeSeatsThenTitle => games.sort_by(|a, b| {
            (a.scheduled_at, Reverse(a.seats_free), &a.title).cmp(&(b.scheduled_at, Reverse(b.seats_free), &b.title))
        }),
    }
}

/// Render games grouped under day/time headers, split into messages of at
/// most `limit` bytes. A group cut by a split repeats its header, every
/// message carries at least one game, and lines too long to fit are cut.
pub fn render(header: &str, games: &[GameRecord], limit: usize) -> Vec<String> {
    const BULLET: &str = "🔸 ";

    let mut parts = Vec::new();
    let mut current = s!(header);
    let mut group = s!();
    let mut has_game = false;
    for g in games {
        let when = when_header(g.scheduled_at);
        // room left after the digest header, a fresh group header and the bullet
        let room = limit.saturating_sub(header.len() + 3 + when.len() + BULLET.len());
        let line = format!("{BULLET}{}", game_line_within(g, room));

        let mut piece = String::new();
        if when != group {
            piece.push_str("\n\n");
            piece.push_str(&when);
            group = when;
        }
        piece.push('\n');
        piece.push_str(&line);

        if has_game && current.len() + piece.len() > limit {
            parts.push(current);
            current = if piece.starts_with("\n\n") { s!() } else { group.clone() };
        }
        current.push_str(&piece);
        has_game = true;
    }
    if has_game {
        parts.push(current);
    }

    parts.into_iter().map(|p| p.trim_start().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::msk;
    use chrono::TimeZone;

    fn game(id: &str, title: &str, day: u32, hour: u32, free: u32) -> GameRecord {
        let mut r = GameRecord::new(id, format!("https://rolecon.ru/game/{id}"));
        r.title = s!(title);
        r.scheduled_at = Some(msk().with_ymd_and_hms(2025, 4, day, hour, 0, 0).unwrap());
        r.seats_total = 6;
        r.seats_free = free;
        r
    }

    fn ids(games: &[GameRecord]) -> Vec<&str> {
        games.iter().map(|g| g.external_id.as_str()).collect()
    }

    #[test]
    fn sort_ties_by_free_seats_then_title() {
        let mut games = vec![
            game("late", "А", 20, 10, 1),
            game("b", "Б", 19, 10, 2),
            game("few", "В", 19, 10, 1),
            game("a", "А", 19, 10, 2),
        ];
        sort_games(&mut games, DigestSort::FreeSeatsThenTitle);
        assert_eq!(ids(&games), vec!["a", "b", "few", "late"]);

        let mut games = vec![game("late", "А", 20, 10, 1), game("x", "Я", 19, 10, 1), game("y", "А", 19, 10, 5)];
        sort_games(&mut games, DigestSort::Chronological);
        assert_eq!(ids(&games), vec!["x", "y", "late"]);
    }

    #[test]
    fn groups_by_header() {
        let games = vec![game("a", "Раз", 19, 10, 2), game("b", "Два", 19, 10, 1), game("c", "Три", 20, 16, 4)];
        let parts = render(FULL_HEADER, &games, 4000);
        assert_eq!(parts.len(), 1);
        let text = &parts[0];
        assert!(text.starts_with("Игры, на которые можно записаться:\n\n<b>СУББОТА</b> (19.04, 10:00)\n🔸 2/6"));
        assert_eq!(text.matches("<b>СУББОТА</b>").count(), 1);
        assert!(text.contains("\n\n<b>ВОСКРЕСЕНЬЕ</b> (20.04, 16:00)\n🔸 4/6"));
    }

    #[test]
    fn splits_under_limit_and_repeats_group_header() {
        let games: Vec<GameRecord> = (0..40).map(|i| game(&format!("g{i}"), "Длинное название игры", 19, 10, 1)).collect();
        let parts = render(FULL_HEADER, &games, 1000);
        assert!(parts.len() > 1);
        for p in &parts {
            assert!(p.len() <= 1000, "{} bytes", p.len());
            assert!(p.contains("<b>СУББОТА</b> (19.04, 10:00)"));
        }
        let lines: usize = parts.iter().map(|p| p.matches("🔸").count()).sum();
        assert_eq!(lines, 40);
    }

    #[test]
    fn oversized_game_is_cut_to_fit() {
        let mut huge = game("huge", &"Бесконечная кампания ".repeat(40), 19, 10, 3);
        huge.system = s!("Mothership RPG");
        let games = vec![huge, game("small", "Ваншот", 19, 10, 1)];

        let parts = render(FULL_HEADER, &games, 300);
        for p in &parts {
            assert!(p.len() <= 300, "{} bytes", p.len());
            assert!(p.contains("🔸"), "part without a game: {p}");
        }
        assert!(parts[0].starts_with(FULL_HEADER));
        assert!(parts[0].contains("…</a>"));
        let lines: usize = parts.iter().map(|p| p.matches("🔸").count()).sum();
        assert_eq!(lines, 2);
    }

    #[test]
    fn nothing_to_report() {
        assert!(render(DELTA_HEADER, &[], 4000).is_empty());
    }
}
