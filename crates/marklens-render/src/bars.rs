#![forbid(unsafe_code)]

//! Grid of proportional category bars.
//!
//! The dependency-free aggregate view. One tile per category, largest first:
//!
//! ```text
//! ╭──────────────────────────────────╮
//! │🦀 Rust                        [i]│
//! │██████████████░░░░░░░░░░░░░░░░░░░░│
//! │12 bookmarks (42.9%)              │
//! │• The Rust Programming Language   │
//! │• Rustonomicon                    │
//! │... and 10 more                   │
//! ╰──────────────────────────────────╯
//! ```
//!
//! The bar length is twice the category's percentage, held between 8% and
//! 95% of the bar so that tiny categories stay visible and large ones never
//! fill it.

use marklens_core::palette;
use marklens_core::{Dataset, RenderError};

use crate::buffer::{BorderChars, Buffer};
use crate::geometry::Rect;
use crate::hit::{HitGrid, HitTarget};
use crate::renderer::{AggregateKind, AggregateRenderer};
use crate::style::{Style, theme};
use crate::text::{display_width, fit_width};

pub const TILE_WIDTH: u16 = 36;
pub const TILE_HEIGHT: u16 = 8;
const GAP: u16 = 1;
const HEADER_ROWS: u16 = 3;
const SAMPLE_TITLES: usize = 2;

/// Detail affordance label.
pub const INFO_LABEL: &str = "[i]";

/// Category indices ordered by descending count; ties keep dataset order.
#[must_use]
pub fn sorted_categories(dataset: &Dataset) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dataset.clusters.len()).collect();
    order.sort_by(|&a, &b| dataset.clusters[b].count.cmp(&dataset.clusters[a].count));
    order
}

/// Filled cells of a bar `width` cells long for a category holding `share`
/// of all bookmarks.
#[must_use]
pub fn bar_fill(share: f64, width: u16) -> u16 {
    let percent = (share * 200.0).clamp(8.0, 95.0);
    ((f64::from(width) * percent / 100.0).round() as u16).min(width)
}

/// Bar-grid aggregate renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarGrid {
    /// Category index (into `Dataset::clusters`) with keyboard focus.
    pub highlighted: Option<usize>,
}

impl BarGrid {
    fn columns(area: Rect) -> usize {
        (((area.width + GAP) / (TILE_WIDTH + GAP)).max(1)) as usize
    }

    fn render_tile(
        &self,
        dataset: &Dataset,
        cat_idx: usize,
        position: usize,
        rect: Rect,
        buf: &mut Buffer,
        hits: &mut HitGrid,
    ) {
        let category = &dataset.clusters[cat_idx];
        let accent = palette::tile_accent(position);
        let focused = self.highlighted == Some(cat_idx);
        let border = if focused {
            Style::new().fg(accent).bold()
        } else {
            Style::new().fg(accent)
        };
        let chars = if focused {
            BorderChars::DOUBLE
        } else {
            BorderChars::ROUNDED
        };
        buf.fill(rect, Style::new());
        buf.draw_border(rect, chars, border);
        hits.register(rect, HitTarget::Category(cat_idx));

        let inner = rect.inset(1);
        if inner.is_empty() {
            return;
        }
        buf.push_clip(inner);

        // Name row with the detail affordance on the right.
        let info_w = display_width(INFO_LABEL) as u16;
        let info_x = inner.right().saturating_sub(info_w).max(inner.x);
        let x = buf.print(inner.x, inner.y, palette::icon(&category.name), Style::new());
        let x = buf.print(x, inner.y, " ", Style::new());
        let room = info_x.saturating_sub(x + 1) as usize;
        buf.print(x, inner.y, &fit_width(&category.name, room, "..."), Style::new().bold());
        buf.print(info_x, inner.y, INFO_LABEL, Style::new().fg(theme::ACCENT));
        hits.register(
            Rect::new(info_x, inner.y, info_w.min(inner.width), 1),
            HitTarget::CategoryInfo(cat_idx),
        );

        let share = dataset.category_share(category);
        let mut rows = (1..inner.height).map(|dy| inner.y + dy);

        if let Some(y) = rows.next() {
            let filled = bar_fill(share, inner.width);
            buf.hline(inner.x, y, filled, '█', Style::new().fg(accent));
            buf.hline(inner.x + filled, y, inner.width - filled, '░', Style::new().fg(theme::BAR_EMPTY));
        }
        if let Some(y) = rows.next() {
            let line = format!("{} bookmarks ({:.1}%)", category.count, share * 100.0);
            buf.print(inner.x, y, &line, Style::new());
        }
        for sample in category.samples(SAMPLE_TITLES) {
            let Some(y) = rows.next() else { break };
            let line = fit_width(&format!("• {}", sample.title), inner.width as usize, "...");
            buf.print(inner.x, y, &line, Style::new().fg(theme::MUTED));
        }
        if category.count > SAMPLE_TITLES {
            if let Some(y) = rows.next() {
                let line = format!("... and {} more", category.count - SAMPLE_TITLES);
                buf.print(inner.x, y, &line, Style::new().fg(theme::MUTED).dim());
            }
        }

        buf.pop_clip();
    }
}

impl AggregateRenderer for BarGrid {
    fn kind(&self) -> AggregateKind {
        AggregateKind::Bars
    }

    fn render_aggregate(
        &self,
        dataset: &Dataset,
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitGrid,
    ) -> Result<(), RenderError> {
        if area.is_empty() {
            return Ok(());
        }
        buf.fill(area, Style::new());
        buf.push_clip(area);

        let title = format!("All {} Bookmark Categories", dataset.total_clusters);
        buf.print(area.x, area.y, &title, Style::new().bold());
        if area.height > 1 {
            let sub = format!("{} total bookmarks", dataset.total_bookmarks);
            buf.print(area.x, area.y + 1, &sub, Style::new().fg(theme::MUTED));
        }
        let (_, body) = area.split_top(HEADER_ROWS);

        let order = sorted_categories(dataset);
        let cols = Self::columns(body);
        let tile_w = ((body.width + GAP) / cols as u16).saturating_sub(GAP).max(1).min(body.width);
        let visible_rows = (body.height / TILE_HEIGHT).max(1) as usize;
        let focus_pos = self
            .highlighted
            .and_then(|h| order.iter().position(|&i| i == h));
        let first_row = focus_pos.map_or(0, |p| (p / cols).saturating_sub(visible_rows - 1));

        for (pos, &cat_idx) in order.iter().enumerate() {
            let row = pos / cols;
            if row < first_row {
                continue;
            }
            let dy = (row - first_row) as u32 * TILE_HEIGHT as u32;
            if dy + TILE_HEIGHT as u32 > body.height as u32 {
                break;
            }
            let col = (pos % cols) as u16;
            let rect = Rect::new(body.x + col * (tile_w + GAP), body.y + dy as u16, tile_w, TILE_HEIGHT);
            self.render_tile(dataset, cat_idx, pos, rect, buf, hits);
        }

        buf.pop_clip();
        Ok(())
    }
}
