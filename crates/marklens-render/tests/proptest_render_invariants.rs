//! Property-based invariant tests for text shaping and the cell buffer.
//!
//! Text (1–3):
//! 1. Titles of at most 40 graphemes come back unchanged.
//! 2. Longer titles become their first 40 graphemes plus `...`.
//! 3. `fit_width` never exceeds the requested width.
//!
//! Buffer (4–5):
//! 4. Every continuation cell follows a wide head, whatever is printed where.
//! 5. Nothing is written outside the clip rectangle.
//!
//! Cards (6):
//! 6. Every visible card has a copy target inside its own card target.

use marklens_core::BookmarkRecord;
use marklens_render::text::{fit_width, truncate_with_ellipsis};
use marklens_render::{Buffer, CardGrid, CardRenderer, CellContent, HitGrid, HitTarget, Rect, Style};
use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

// ── Strategies ────────────────────────────────────────────────────────────

fn mixed_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-z ]{1,4}",
            Just("日本".to_string()),
            Just("🦀".to_string()),
            Just("👩‍💻".to_string()),
            Just("é".to_string()),
        ],
        0..30,
    )
    .prop_map(|parts| parts.concat())
}

// ─── 1–2. Title truncation ───────────────────────────────────────────────

proptest! {
    #[test]
    fn title_truncation_is_exact(text in mixed_text()) {
        let count = text.graphemes(true).count();
        let out = truncate_with_ellipsis(&text, 40, "...");
        if count <= 40 {
            prop_assert_eq!(out, text);
        } else {
            let head: String = text.graphemes(true).take(40).collect();
            prop_assert_eq!(out, format!("{head}..."));
        }
    }
}

// ─── 3. fit_width bound ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn fit_width_respects_bound(text in mixed_text(), width in 0usize..50) {
        let out = fit_width(&text, width, "...");
        prop_assert!(out.width() <= width, "{:?} is wider than {}", out, width);
    }
}

// ─── 4. Wide glyph pairing ───────────────────────────────────────────────

proptest! {
    #[test]
    fn continuations_follow_heads(
        writes in proptest::collection::vec((0u16..20, 0u16..4, mixed_text()), 1..12),
    ) {
        let mut buf = Buffer::new(20, 4);
        for (x, y, text) in &writes {
            buf.print(*x, *y, text, Style::new());
        }
        for y in 0..4 {
            for x in 0..20 {
                let cell = buf.get(x, y).unwrap();
                if cell.is_continuation() {
                    prop_assert!(x > 0);
                    let head = buf.get(x - 1, y).unwrap();
                    prop_assert!(matches!(head.symbol, CellContent::Grapheme(_)));
                    prop_assert_eq!(head.symbol.width(), 2);
                }
            }
        }
    }
}

// ─── 5. Clipping ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn writes_stay_in_clip(
        cx in 0u16..10, cy in 0u16..4, cw in 0u16..10, ch in 0u16..4,
        writes in proptest::collection::vec((0u16..20, 0u16..8, mixed_text()), 1..8),
    ) {
        let clip = Rect::new(cx, cy, cw, ch);
        let mut buf = Buffer::new(20, 8);
        buf.push_clip(clip);
        for (x, y, text) in &writes {
            buf.print(*x, *y, text, Style::new());
        }
        buf.pop_clip();
        for y in 0..8 {
            for x in 0..20 {
                if !clip.contains(x, y) {
                    prop_assert_eq!(&buf.get(x, y).unwrap().symbol, &CellContent::Empty);
                }
            }
        }
    }
}

// ─── 6. Card hit regions ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn copy_targets_sit_inside_cards(
        titles in proptest::collection::vec(mixed_text(), 0..12),
        width in 20u16..140,
        height in 5u16..30,
    ) {
        let records: Vec<BookmarkRecord> = titles
            .iter()
            .map(|t| BookmarkRecord::new(t.clone(), "https://x.dev", "x.dev", "Rust"))
            .collect();
        let refs: Vec<&BookmarkRecord> = records.iter().collect();
        let area = Rect::from_size(width, height);
        let grid = CardGrid::default();
        let mut buf = Buffer::new(width, height);
        let mut hits = HitGrid::new(width, height);
        grid.render_cards(&refs, area, &mut buf, &mut hits);

        for i in 0..records.len() {
            match grid.card_rect(area, i) {
                Some(rect) => {
                    let (x, y) = hits.locate(HitTarget::Copy(i)).unwrap();
                    prop_assert!(rect.contains(x, y));
                }
                None => prop_assert!(hits.locate(HitTarget::Card(i)).is_none()),
            }
        }
    }
}
