// benches/extract.rs
use chrono::TimeZone;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

use rolecon_scrape::{
    core::time::msk,
    engine::Extractor,
    scrape::{EventMetadata, Page},
};

const SUMMARY: &str = include_str!("../tests/fixtures/summary_page.html");
const SINGLE: &str = include_str!("../tests/fixtures/single_page.html");

/// Summary page with `days` day headers, each carrying three slots and
/// four blocks.
fn synthetic_summary(days: u32) -> String {
    let mut html = String::from("<html><body><div class=\"container\">");
    for d in 0..days {
        let day = 1 + d % 28;
        html.push_str(&format!(
            "<div class=\"event-day\"><div class=\"caption\">Суббота — {day:02}.05.2025</div>\
             <div class=\"tabs-caption\">\
             <div class=\"tab-caption\" data-timeslot=\"{a}\">Утро (10:00 - 14:00)</div>\
             <div class=\"tab-caption\" data-timeslot=\"{b}\">День (14:00 - 18:00)</div>\
             <div class=\"tab-caption\" data-timeslot=\"{c}\">Вечер (18:00 - 22:00)</div>\
             </div></div>",
            a = d * 3 + 1,
            b = d * 3 + 2,
            c = d * 3 + 3,
        ));
        for g in 0..4 {
            let id = d * 4 + g;
            let slot = d * 3 + 1 + g % 3;
            html.push_str(&format!(
                "<div class=\"event-single\" id=\"game{id}\" data-timeslot=\"{slot}\">\
                 <h4 class=\"game-title\"><a href=\"/game/{id}\">Игра {id}</a></h4>\
                 <table class=\"table-single\"><tbody>\
                 <tr><td>Система:</td><td></td><td>Mothership RPG</td></tr>\
                 <tr><td>Игру проводит:</td><td></td><td><a href=\"/user/{id}\">Мастер {id}</a></td></tr>\
                 <tr><td>Места:</td><td></td><td>Осталось {free} мест из 6</td></tr>\
                 </tbody></table></div>",
                free = id % 4,
            ));
        }
    }
    html.push_str("</div></body></html>");
    html
}

fn bench_extract(c: &mut Criterion) {
    let ex = Extractor::new(Url::parse("https://rolecon.ru").unwrap());
    let now = msk().with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let meta = EventMetadata { start: "2025-04-19".into(), ..Default::default() };

    let summary = Page { url: "https://rolecon.ru/lw1".into(), html: SUMMARY.into() };
    let single = Page { url: "https://rolecon.ru/game/999".into(), html: SINGLE.into() };
    let large = Page { url: "https://rolecon.ru/lw2".into(), html: synthetic_summary(30) };

    c.bench_function("extract_summary_fixture", |b| {
        b.iter(|| {
            let records = ex.extract_with(black_box(&summary), Some(&meta), now).unwrap();
            black_box(records.len())
        })
    });

    c.bench_function("extract_single_fixture", |b| {
        b.iter(|| {
            let records = ex.extract_with(black_box(&single), None, now).unwrap();
            black_box(records.len())
        })
    });

    c.bench_function("extract_summary_120_blocks", |b| {
        b.iter(|| {
            let records = ex.extract_with(black_box(&large), None, now).unwrap();
            black_box(records.len())
        })
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
