#![forbid(unsafe_code)]

//! Bookmark card grid.
//!
//! ```text
//! ╭──────────────────────────────────────────────╮
//! │🦀 The Rust Programming Language              │
//! │doc.rust-lang.org                             │
//! │[Rust]                                  [copy]│
//! ╰──────────────────────────────────────────────╯
//! ```
//!
//! Cards flow left to right in as many columns as fit, then top to bottom.
//! When the focused card would fall below the area, whole rows scroll off
//! the top.

use marklens_core::BookmarkRecord;
use marklens_core::palette;

use crate::buffer::{BorderChars, Buffer};
use crate::geometry::Rect;
use crate::hit::{HitGrid, HitTarget};
use crate::message::render_message;
use crate::style::{Style, theme};
use crate::text::{card_title, display_width, fit_width};

/// Preferred card width, borders included.
pub const CARD_WIDTH: u16 = 48;
/// Card height, borders included.
pub const CARD_HEIGHT: u16 = 5;
const GAP: u16 = 1;

/// Copy affordance label.
pub const COPY_LABEL: &str = "[copy]";
/// Copy affordance label while the acknowledgment is showing.
pub const COPIED_LABEL: &str = "[ok]";

/// Placeholder for an empty result.
pub const EMPTY_PLACEHOLDER: &str = "No bookmarks found";

/// Draws the visible bookmark list.
pub trait CardRenderer {
    fn render_cards(
        &self,
        records: &[&BookmarkRecord],
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitGrid,
    );
}

/// Default card renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardGrid {
    /// Index of the card with keyboard focus.
    pub focused: Option<usize>,
    /// Index of the card whose copy acknowledgment is showing.
    pub copied: Option<usize>,
    /// Emit OSC 8 links on titles.
    pub hyperlinks: bool,
}

impl CardGrid {
    /// Cards per row for an area.
    #[must_use]
    pub fn columns(area: Rect) -> usize {
        (((area.width + GAP) / (CARD_WIDTH + GAP)).max(1)) as usize
    }

    fn card_width(area: Rect, columns: usize) -> u16 {
        let cols = columns as u16;
        ((area.width + GAP) / cols).saturating_sub(GAP).max(1).min(area.width)
    }

    /// First visible row so that `focused` is on screen.
    #[must_use]
    pub fn first_row(area: Rect, focused: Option<usize>) -> usize {
        let cols = Self::columns(area);
        let visible = (area.height / CARD_HEIGHT).max(1) as usize;
        match focused {
            Some(f) => {
                let row = f / cols;
                row.saturating_sub(visible - 1)
            }
            None => 0,
        }
    }

    /// Screen rectangle of card `index`, if visible.
    #[must_use]
    pub fn card_rect(&self, area: Rect, index: usize) -> Option<Rect> {
        let cols = Self::columns(area);
        let w = Self::card_width(area, cols);
        let first = Self::first_row(area, self.focused);
        let row = index / cols;
        if row < first {
            return None;
        }
        let dy = (row - first) as u32 * CARD_HEIGHT as u32;
        if dy + CARD_HEIGHT as u32 > area.height as u32 {
            return None;
        }
        let col = (index % cols) as u16;
        Some(Rect::new(
            area.x + col * (w + GAP),
            area.y + dy as u16,
            w,
            CARD_HEIGHT,
        ))
    }

    fn render_card(&self, record: &BookmarkRecord, index: usize, rect: Rect, buf: &mut Buffer, hits: &mut HitGrid) {
        let focused = self.focused == Some(index);
        let (chars, border) = if focused {
            (BorderChars::DOUBLE, Style::new().fg(theme::ACCENT).bold())
        } else {
            (BorderChars::ROUNDED, Style::new().fg(theme::MUTED))
        };
        buf.fill(rect, Style::new());
        buf.draw_border(rect, chars, border);
        hits.register(rect, HitTarget::Card(index));

        let inner = rect.inset(1);
        if inner.is_empty() {
            return;
        }
        buf.push_clip(inner);

        let icon = palette::icon(&record.cluster);
        let x = buf.print(inner.x, inner.y, icon, Style::new());
        let x = buf.print(x, inner.y, " ", Style::new());
        let room = inner.right().saturating_sub(x) as usize;
        let title = fit_width(&card_title(&record.title), room, "...");
        let link = if self.hyperlinks {
            buf.register_link(&record.url)
        } else {
            0
        };
        buf.print_linked(x, inner.y, &title, Style::new().bold(), link);

        if inner.height > 1 {
            buf.print(inner.x, inner.y + 1, &record.domain, Style::new().fg(theme::MUTED));
        }

        if inner.height > 2 {
            let y = inner.y + 2;
            let label = if self.copied == Some(index) {
                COPIED_LABEL
            } else {
                COPY_LABEL
            };
            let label_style = if self.copied == Some(index) {
                Style::new().fg(theme::SUCCESS).bold()
            } else {
                Style::new().fg(theme::MUTED)
            };
            let lw = display_width(label) as u16;
            let lx = inner.right().saturating_sub(lw).max(inner.x);
            let badge_room = lx.saturating_sub(inner.x + 1) as usize;
            let badge = fit_width(&format!("[{}]", record.cluster), badge_room, "...]");
            let badge_color = palette::color(&record.cluster).unwrap_or(theme::ACCENT);
            buf.print(inner.x, y, &badge, Style::new().fg(badge_color));
            buf.print(lx, y, label, label_style);
            hits.register(Rect::new(lx, y, lw.min(inner.width), 1), HitTarget::Copy(index));
        }

        buf.pop_clip();
    }
}

impl CardRenderer for CardGrid {
    fn render_cards(
        &self,
        records: &[&BookmarkRecord],
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitGrid,
    ) {
        if area.is_empty() {
            return;
        }
        if records.is_empty() {
            render_message(area, buf, EMPTY_PLACEHOLDER);
            return;
        }
        buf.fill(area, Style::new());
        buf.push_clip(area);
        for (i, record) in records.iter().enumerate() {
            if let Some(rect) = self.card_rect(area, i) {
                self.render_card(record, i, rect, buf, hits);
            }
        }
        buf.pop_clip();
    }
}
