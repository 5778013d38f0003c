// Integration tests (native) for the `comic-reader-policy` crate.
// These tests avoid wasm-specific functionality and drive the policies the way
// the reader UI does, against an in-memory store and a manual clock.

use comic_reader_policy::{
    ad_limiter, trigger, Clock, HistoryEntry, LayoutMode, ManualClock, MemoryStore, PolicyConfig,
    ScrollTracker,
};

const MINUTE: i64 = 60 * 1000;

fn visit(comic: &str, chapter: &str, at: i64) -> HistoryEntry {
    HistoryEntry {
        comic_id: comic.into(),
        title: format!("Comic {comic}"),
        cover_url: Some(format!("https://cdn.example/{comic}.webp")),
        chapter_id: chapter.into(),
        chapter_title: Some(format!("Chapter {chapter}")),
        read_at: at,
    }
}

// A reader opens the site, reads six chapters five minutes apart and then
// comes back an hour later. Ads show on every other chapter, the affiliate
// link opens once after 15 minutes and again after the repeat window.
#[test]
fn reading_session_end_to_end() {
    let cfg = PolicyConfig::default();
    let store = MemoryStore::new();
    let clock = ManualClock::new(1_700_000_000_000);
    let history = cfg.history();
    let delays = cfg.affiliate_delays;

    trigger::initialize(&store, &clock, &cfg.affiliate_key);

    let mut ads = Vec::new();
    let mut opened_at = Vec::new();
    for chapter in 1..=6 {
        clock.advance(5 * MINUTE);
        ads.push(ad_limiter::should_show(&store, &cfg.ad_counter_key));
        if trigger::try_trigger(&store, &clock, &cfg.affiliate_key, delays.first_ms, delays.repeat_ms) {
            opened_at.push(chapter);
        }
        history
            .record(&store, visit("solo-leveling", &chapter.to_string(), clock.now_ms()))
            .unwrap();
    }

    assert_eq!(ads, vec![true, false, true, false, true, false]);
    // 5, 10, 15 minutes: fires on the third chapter only.
    assert_eq!(opened_at, vec![3]);

    clock.advance(60 * MINUTE);
    assert!(trigger::try_trigger(&store, &clock, &cfg.affiliate_key, delays.first_ms, delays.repeat_ms));

    let last = history.last_read(&store, "solo-leveling").unwrap();
    assert_eq!(last.chapter_id, "6");
    assert_eq!(history.entries(&store).len(), 1);
}

#[test]
fn resize_walks_through_tiers() {
    let cfg = PolicyConfig::default();
    let home = cfg.table(LayoutMode::Home);
    let limits: Vec<u32> = [375.0, 820.0, 1280.0, 600.0]
        .iter()
        .map(|w| home.classify_px(*w).limit)
        .collect();
    assert_eq!(limits, vec![34, 32, 35, 34]);

    let list = cfg.table(LayoutMode::List);
    assert_eq!(list.classify_px(1440.0).limit, 30);
}

#[test]
fn navbar_follows_reader_scrolling() {
    let mut navbar = ScrollTracker::new(PolicyConfig::default().navbar);
    let states: Vec<bool> = [0.0, 120.0, 900.0, 1800.0, 1700.0, 40.0]
        .iter()
        .map(|y| navbar.on_scroll(*y))
        .collect();
    assert_eq!(states, vec![true, false, false, false, true, true]);
}
