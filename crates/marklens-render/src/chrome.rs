#![forbid(unsafe_code)]

//! Category sidebar, search box, and status line.

use marklens_core::palette;
use marklens_core::{CategorySelection, Dataset};

use crate::bars::INFO_LABEL;
use crate::buffer::{BorderChars, Buffer};
use crate::geometry::Rect;
use crate::hit::{HitGrid, HitTarget};
use crate::style::{Style, theme};
use crate::text::{display_width, fit_width};

/// Search box placeholder.
pub const SEARCH_PLACEHOLDER: &str = "Search bookmarks...";

/// Preferred sidebar width, border included.
pub const SIDEBAR_WIDTH: u16 = 30;

/// Lines each sidebar entry takes: label, then count and share.
const ENTRY_HEIGHT: u16 = 2;

/// Category list. Row 0 is "All Bookmarks"; row `i + 1` is
/// `dataset.clusters[i]`. Category rows carry an [`INFO_LABEL`] button.
#[derive(Debug, Clone, Copy)]
pub struct Sidebar<'a> {
    pub selected: &'a CategorySelection,
    /// Highlighted row.
    pub cursor: usize,
    /// Keyboard focus is in the list.
    pub focused: bool,
}

impl<'a> Sidebar<'a> {
    #[must_use]
    pub fn new(selected: &'a CategorySelection) -> Self {
        Self {
            selected,
            cursor: 0,
            focused: false,
        }
    }

    /// Number of rows for `dataset`.
    #[must_use]
    pub fn rows(dataset: &Dataset) -> usize {
        dataset.clusters.len() + 1
    }

    /// Selection represented by `row`.
    #[must_use]
    pub fn selection_for(dataset: &Dataset, row: usize) -> Option<CategorySelection> {
        match row {
            0 => Some(CategorySelection::All),
            r => dataset
                .clusters
                .get(r - 1)
                .map(|c| CategorySelection::Named(c.name.clone())),
        }
    }

    pub fn render(&self, dataset: &Dataset, area: Rect, buf: &mut Buffer, hits: &mut HitGrid) {
        if area.is_empty() {
            return;
        }
        buf.fill(area, Style::new());
        let border = if self.focused {
            Style::new().fg(theme::ACCENT)
        } else {
            Style::new().fg(theme::MUTED)
        };
        buf.draw_border(area, BorderChars::SQUARE, border);
        buf.print(area.x + 1, area.y, " Categories ", Style::new().bold());

        let inner = area.inset(1);
        if inner.is_empty() {
            return;
        }
        buf.push_clip(inner);
        let visible = (inner.height / ENTRY_HEIGHT).max(1) as usize;
        let first = self.cursor.saturating_sub(visible - 1);
        let width = inner.width as usize;
        let info_w = display_width(INFO_LABEL) as u16;
        let show_info = inner.width > info_w + 4;

        for (slot, row) in (first..Self::rows(dataset)).enumerate() {
            let y = inner.y + (slot as u16) * ENTRY_HEIGHT;
            if y >= inner.bottom() {
                break;
            }
            let (label, detail, is_selected, target) = if row == 0 {
                (
                    "All Bookmarks".to_string(),
                    format!("{} bookmarks", dataset.total_bookmarks),
                    self.selected.is_all(),
                    HitTarget::AllCategories,
                )
            } else {
                let cat = &dataset.clusters[row - 1];
                (
                    format!("{} {}", palette::icon(&cat.name), cat.name),
                    format!(
                        "{} bookmarks ({:.1}%)",
                        cat.count,
                        dataset.category_share(cat) * 100.0
                    ),
                    self.selected.name() == Some(cat.name.as_str()),
                    HitTarget::Category(row - 1),
                )
            };
            let marker = if is_selected { "▸ " } else { "  " };
            let mut style = if is_selected {
                Style::new().fg(theme::ACCENT).bold()
            } else {
                Style::new()
            };
            let mut detail_style = Style::new().fg(theme::MUTED);
            if self.focused && row == self.cursor {
                style = style.reverse();
                detail_style = detail_style.reverse();
            }
            let has_info = show_info && row > 0;
            let label_room = if has_info {
                width - info_w as usize - 1
            } else {
                width
            };
            let line = fit_width(&format!("{marker}{label}"), label_room, "...");
            let pad = width.saturating_sub(display_width(&line));
            buf.print(inner.x, y, &format!("{line}{}", " ".repeat(pad)), style);
            let height = ENTRY_HEIGHT.min(inner.bottom() - y);
            if height > 1 {
                let detail = fit_width(&format!("    {detail}"), width, "...");
                let pad = width.saturating_sub(display_width(&detail));
                buf.print(inner.x, y + 1, &format!("{detail}{}", " ".repeat(pad)), detail_style);
            }
            hits.register(Rect::new(inner.x, y, inner.width, height), target);
            if has_info {
                let info_x = inner.right() - info_w;
                buf.print(info_x, y, INFO_LABEL, style.fg(theme::ACCENT));
                hits.register(Rect::new(info_x, y, info_w, 1), HitTarget::CategoryInfo(row - 1));
            }
        }
        buf.pop_clip();
    }
}

/// One-line search input.
#[derive(Debug, Clone, Copy)]
pub struct SearchBar<'a> {
    pub input: &'a str,
    pub focused: bool,
    /// A keystroke is waiting for the debounce to commit.
    pub pending: bool,
}

impl SearchBar<'_> {
    pub fn render(&self, area: Rect, buf: &mut Buffer, hits: &mut HitGrid) {
        if area.is_empty() {
            return;
        }
        buf.fill(area, Style::new());
        hits.register(area, HitTarget::SearchBox);
        buf.push_clip(area);

        let prompt = if self.focused { "/ " } else { "  " };
        let x = buf.print(area.x, area.y, prompt, Style::new().fg(theme::ACCENT).bold());
        let room = area.right().saturating_sub(x).saturating_sub(2) as usize;
        if self.input.is_empty() {
            buf.print(x, area.y, SEARCH_PLACEHOLDER, Style::new().fg(theme::MUTED).italic());
        } else {
            // Keep the tail (where the cursor is) visible.
            let mut shown = self.input;
            while display_width(shown) > room {
                let Some(c) = shown.chars().next() else { break };
                shown = &shown[c.len_utf8()..];
            }
            let end = buf.print(x, area.y, shown, Style::new());
            if self.focused {
                buf.print(end, area.y, "▏", Style::new().fg(theme::ACCENT));
            }
        }
        if self.pending {
            let dot_x = area.right().saturating_sub(1);
            buf.print(dot_x, area.y, "…", Style::new().fg(theme::MUTED));
        }
        buf.pop_clip();
    }
}

/// Bottom line: result summary on the left, key hints on the right.
pub fn render_status(area: Rect, buf: &mut Buffer, status: &str, hints: &str) {
    if area.is_empty() {
        return;
    }
    let row = area.row(0);
    buf.fill(row, Style::new().bg(theme::BAR_EMPTY));
    let style = Style::new().bg(theme::BAR_EMPTY);
    let hint_w = display_width(hints) as u16;
    let left_room = if hint_w + 2 < row.width {
        row.width - hint_w - 2
    } else {
        row.width
    };
    buf.push_clip(row);
    buf.print(row.x, row.y, &fit_width(status, left_room as usize, "..."), style.bold());
    if hint_w + 2 < row.width {
        buf.print(row.right() - hint_w, row.y, hints, style.fg(theme::MUTED));
    }
    buf.pop_clip();
}
