#![forbid(unsafe_code)]

//! Single-message regions: load errors, empty results, "Loading...".

use crate::buffer::Buffer;
use crate::geometry::Rect;
use crate::style::{Style, theme};
use crate::text::fit_width;

/// Blank `area` and centre `text` in it.
pub fn render_message(area: Rect, buf: &mut Buffer, text: &str) {
    render_message_styled(area, buf, text, Style::new().fg(theme::MUTED));
}

/// Error variant of [`render_message`].
pub fn render_error(area: Rect, buf: &mut Buffer, text: &str) {
    render_message_styled(area, buf, text, Style::new().fg(theme::ERROR).bold());
}

pub fn render_message_styled(area: Rect, buf: &mut Buffer, text: &str, style: Style) {
    if area.is_empty() {
        return;
    }
    buf.fill(area, Style::new());
    let line = fit_width(text, area.width as usize, "...");
    let w = crate::text::display_width(&line) as u16;
    let row = area.centered(w, 1);
    buf.push_clip(area);
    buf.print(row.x, row.y, &line, style);
    buf.pop_clip();
}
