//! Property tests for typing into the app's search box.
//!
//! 1. A burst with gaps below the window commits once, with the final text.
//! 2. The list never changes before the window has passed after the last key.
//! 3. Any key sequence renders without panicking, at any terminal size.

use std::time::{Duration, Instant};

use marklens::app::{App, AppConfig, Clock};
use marklens::cli::StartView;
use marklens::event::{Event, KeyCode};
use marklens::runtime::{Model, Simulator};
use marklens_core::{BookmarkRecord, Dataset};
use marklens_render::Capabilities;
use proptest::prelude::*;

const WINDOW: Duration = Duration::from_millis(300);

fn app_with(clock: &Clock, dir: &tempfile::TempDir) -> Simulator<App> {
    let ds = Dataset::from_records(vec![
        BookmarkRecord::new("Serde", "https://serde.rs", "serde.rs", "Rust"),
        BookmarkRecord::new("Flask", "https://flask.palletsprojects.com", "flask.palletsprojects.com", "Python"),
        BookmarkRecord::new("Gin", "https://gin-gonic.com", "gin-gonic.com", "Go"),
        BookmarkRecord::new("Axum", "https://docs.rs/axum", "docs.rs", "Rust"),
    ]);
    let path = dir.path().join("bookmarks_data.json");
    std::fs::write(&path, serde_json::to_string(&ds).unwrap()).unwrap();
    let config = AppConfig {
        data_path: path,
        start_view: StartView::Cards,
        caps: Capabilities::default(),
        debounce: WINDOW,
    };
    let mut sim = Simulator::new(App::new(config, clock.clone()));
    sim.init();
    sim
}

// ── Strategies ────────────────────────────────────────────────────────────

fn burst_strategy() -> impl Strategy<Value = Vec<(char, u64)>> {
    proptest::collection::vec((proptest::char::range('a', 'z'), 0u64..300), 1..12)
}

fn key_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::char::range(' ', '~').prop_map(Event::from),
        Just(Event::from(KeyCode::Tab)),
        Just(Event::from(KeyCode::Escape)),
        Just(Event::from(KeyCode::Enter)),
        Just(Event::from(KeyCode::Backspace)),
        Just(Event::from(KeyCode::Down)),
        Just(Event::from(KeyCode::PageDown)),
    ]
}

// ─── 1–2. Debounced bursts ───────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn burst_commits_once_after_last_key(burst in burst_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        let clock = Clock::manual(Instant::now());
        let mut sim = app_with(&clock, &dir);
        sim.inject_event(Event::from('/'));
        let before = sim.model().controller().recompute_count();

        let mut typed = String::new();
        for (c, gap) in &burst {
            clock.advance(Duration::from_millis(*gap));
            prop_assert!(!sim.tick_if_due());
            sim.inject_event(Event::from(*c));
            typed.push(*c);
        }
        prop_assert_eq!(sim.model().controller().recompute_count(), before);

        clock.advance(WINDOW - Duration::from_millis(1));
        prop_assert!(!sim.tick_if_due());
        prop_assert_eq!(sim.model().controller().state().search_term.as_str(), "");

        clock.advance(Duration::from_millis(1));
        prop_assert!(sim.tick_if_due());
        prop_assert_eq!(sim.model().controller().recompute_count(), before + 1);
        prop_assert_eq!(&sim.model().controller().state().search_term, &typed);

        clock.advance(WINDOW * 4);
        prop_assert!(!sim.tick_if_due());
        prop_assert_eq!(sim.model().controller().recompute_count(), before + 1);
    }
}

// ─── 3. Arbitrary input renders ──────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arbitrary_keys_render(
        keys in proptest::collection::vec(key_strategy(), 0..40),
        w in 0u16..140,
        h in 0u16..50,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let clock = Clock::manual(Instant::now());
        let mut sim = app_with(&clock, &dir);
        for key in keys {
            sim.inject_event(key);
            clock.advance(Duration::from_millis(40));
            sim.tick_if_due();
            sim.capture_frame(w, h);
        }
        let buf = sim.capture_frame(w, h);
        prop_assert_eq!(buf.area().width, w);
        prop_assert!(sim.model().next_tick().is_none_or(|d| d <= Duration::from_secs(2)));
    }
}
