#![forbid(unsafe_code)]

//! Category detail overlay.
//!
//! ```text
//! ╭─────────────────────────────────────────[x]╮
//! │🦀 Rust                                     │
//! │12 bookmarks (42.9% of total)               │
//! │                                            │
//! │All Bookmarks in Rust:                      │
//! │1. The Rust Programming Language            │
//! │   doc.rust-lang.org                        │
//! │2. Rustonomicon                             │
//! │   doc.rust-lang.org                        │
//! ╰────────────────────── Esc close · j/k scroll╯
//! ```
//!
//! # Invariants
//!
//! - The whole box maps to [`HitTarget::Modal`] except the close button,
//!   which maps to [`HitTarget::ModalClose`]. Clicks outside the box hit
//!   whatever the caller registered underneath.
//! - `scroll` is clamped at draw time, so callers may overshoot freely.

use marklens_core::CategoryDetail;
use marklens_core::palette;

use crate::buffer::{BorderChars, Buffer};
use crate::geometry::Rect;
use crate::hit::{HitGrid, HitTarget};
use crate::style::{Style, theme};
use crate::text::fit_width;

const MAX_WIDTH: u16 = 72;
const CLOSE_LABEL: &str = "[x]";
const FOOTER: &str = " Esc close · j/k scroll ";
// Name, summary, blank, list heading.
const HEADER_ROWS: u16 = 4;
const ROWS_PER_ITEM: u16 = 2;

/// Modal listing every bookmark of one category.
#[derive(Debug, Clone, Copy)]
pub struct DetailModal<'a> {
    pub detail: CategoryDetail<'a>,
    /// First list item shown.
    pub scroll: usize,
    /// Emit OSC 8 links on titles.
    pub hyperlinks: bool,
}

impl<'a> DetailModal<'a> {
    #[must_use]
    pub fn new(detail: CategoryDetail<'a>) -> Self {
        Self {
            detail,
            scroll: 0,
            hyperlinks: true,
        }
    }

    /// Box placement inside `area`.
    #[must_use]
    pub fn frame(&self, area: Rect) -> Rect {
        let list_rows = (self.detail.count() as u16).saturating_mul(ROWS_PER_ITEM);
        let want_h = HEADER_ROWS.saturating_add(list_rows).saturating_add(2);
        let w = area.width.saturating_sub(4).min(MAX_WIDTH);
        let h = want_h.min(area.height.saturating_sub(2));
        area.centered(w, h)
    }

    fn list_area(&self, area: Rect) -> Rect {
        self.frame(area).inset(1).split_top(HEADER_ROWS).1
    }

    /// List items that fit at once.
    #[must_use]
    pub fn visible_items(&self, area: Rect) -> usize {
        (self.list_area(area).height / ROWS_PER_ITEM) as usize
    }

    /// Largest useful `scroll` for `area`.
    #[must_use]
    pub fn max_scroll(&self, area: Rect) -> usize {
        self.detail.count().saturating_sub(self.visible_items(area))
    }

    /// Draw over whatever is already in `buf`.
    pub fn render(&self, area: Rect, buf: &mut Buffer, hits: &mut HitGrid) {
        let frame = self.frame(area);
        if frame.width < 3 || frame.height < 3 {
            return;
        }
        let accent = palette::color(self.detail.name()).unwrap_or(theme::ACCENT);
        buf.fill(frame, Style::new());
        buf.draw_border(frame, BorderChars::ROUNDED, Style::new().fg(accent));
        hits.register(frame, HitTarget::Modal);

        let close_w = CLOSE_LABEL.len() as u16;
        let close_x = frame.right().saturating_sub(close_w + 1).max(frame.x);
        buf.print(close_x, frame.y, CLOSE_LABEL, Style::new().fg(theme::ERROR).bold());
        hits.register(Rect::new(close_x, frame.y, close_w, 1), HitTarget::ModalClose);

        let footer_w = crate::text::display_width(FOOTER) as u16;
        if footer_w + 2 < frame.width {
            let fx = frame.right() - 1 - footer_w;
            buf.print(fx, frame.bottom() - 1, FOOTER, Style::new().fg(theme::MUTED));
        }

        let inner = frame.inset(1);
        buf.push_clip(inner);
        let width = inner.width as usize;

        let title = format!("{} {}", palette::icon(self.detail.name()), self.detail.name());
        buf.print(inner.x, inner.y, &fit_width(&title, width, "..."), Style::new().bold());
        if inner.height > 1 {
            buf.print(inner.x, inner.y + 1, &self.detail.summary(), Style::new().fg(theme::MUTED));
        }
        if inner.height > 3 {
            let heading = format!("All Bookmarks in {}:", self.detail.name());
            buf.print(inner.x, inner.y + 3, &fit_width(&heading, width, "..."), Style::new().bold());
        }

        let list = self.list_area(area);
        let scroll = self.scroll.min(self.max_scroll(area));
        let mut y = list.y;
        for (n, record) in self.detail.numbered().skip(scroll) {
            if y + ROWS_PER_ITEM > list.bottom() {
                break;
            }
            let prefix = format!("{n}. ");
            let x = buf.print(list.x, y, &prefix, Style::new().fg(theme::MUTED));
            let room = list.right().saturating_sub(x) as usize;
            let link = if self.hyperlinks {
                buf.register_link(&record.url)
            } else {
                0
            };
            buf.print_linked(
                x,
                y,
                &fit_width(&record.title, room, "..."),
                Style::new().fg(accent).underline(),
                link,
            );
            buf.print(x, y + 1, &fit_width(&record.domain, room, "..."), Style::new().fg(theme::MUTED));
            y += ROWS_PER_ITEM;
        }

        buf.pop_clip();
    }
}
