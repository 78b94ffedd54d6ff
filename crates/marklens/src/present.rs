#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! Compares the next frame against the previous one cell by cell and writes
//! only the changes, grouping adjacent changed cells into runs so the cursor
//! moves once per run. Style and hyperlink state are tracked so SGR and
//! OSC 8 sequences are emitted only when they change.
//!
//! Link ids are per-buffer, so two cells are equal only when their resolved
//! URLs match, not their ids.

use std::io::{self, BufWriter, Write};

use marklens_render::{Buffer, Cell, CellContent, Style, StyleFlags};
use tracing::trace;

const BUFFER_CAPACITY: usize = 64 * 1024;
const SGR_RESET: &[u8] = b"\x1b[0m";

const FLAG_CODES: [(StyleFlags, u8); 5] = [
    (StyleFlags::BOLD, 1),
    (StyleFlags::DIM, 2),
    (StyleFlags::ITALIC, 3),
    (StyleFlags::UNDERLINE, 4),
    (StyleFlags::REVERSE, 7),
];

/// Writes frames to a terminal (or any writer in tests).
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    current_style: Option<Style>,
    current_link: Option<String>,
    cursor: Option<(u16, u16)>,
    hyperlinks: bool,
}

impl<W: Write> Presenter<W> {
    #[must_use]
    pub fn new(writer: W, hyperlinks: bool) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            current_link: None,
            cursor: None,
            hyperlinks,
        }
    }

    /// Emit the cells of `next` that differ from `prev`. With no previous
    /// frame (first draw, or after a resize) the screen is cleared and every
    /// cell is written.
    pub fn present(&mut self, prev: Option<&Buffer>, next: &Buffer) -> io::Result<()> {
        let prev = prev.filter(|p| p.width() == next.width() && p.height() == next.height());
        if prev.is_none() {
            self.writer.write_all(b"\x1b[2J")?;
            self.cursor = None;
        }

        let mut runs = 0usize;
        for y in 0..next.height() {
            let mut x = 0;
            while x < next.width() {
                if !self.changed(prev, next, x, y) {
                    x += 1;
                    continue;
                }
                runs += 1;
                self.move_cursor_to(x, y)?;
                while x < next.width() && self.changed(prev, next, x, y) {
                    self.emit_cell(next, x, y)?;
                    x += 1;
                }
            }
        }

        self.writer.write_all(SGR_RESET)?;
        self.current_style = None;
        if self.current_link.take().is_some() {
            self.writer.write_all(b"\x1b]8;;\x1b\\")?;
        }
        trace!(runs, "frame presented");
        self.writer.flush()
    }

    fn changed(&self, prev: Option<&Buffer>, next: &Buffer, x: u16, y: u16) -> bool {
        let Some(prev) = prev else {
            return true;
        };
        match (prev.get(x, y), next.get(x, y)) {
            (Some(a), Some(b)) => {
                a.symbol != b.symbol
                    || a.style != b.style
                    || prev.links().get(a.link) != next.links().get(b.link)
            }
            _ => true,
        }
    }

    fn emit_cell(&mut self, buf: &Buffer, x: u16, y: u16) -> io::Result<()> {
        let Some(cell) = buf.get(x, y) else {
            return Ok(());
        };
        if cell.is_continuation() {
            // The head already advanced the cursor past this column.
            return Ok(());
        }
        self.emit_style(cell.style)?;
        let url = if self.hyperlinks {
            buf.links().get(cell.link)
        } else {
            None
        };
        self.emit_link(url)?;
        self.emit_content(cell)?;
        let width = cell.symbol.width().max(1) as u16;
        self.cursor = self.cursor.map(|(cx, cy)| (cx + width, cy));
        Ok(())
    }

    fn emit_style(&mut self, style: Style) -> io::Result<()> {
        if self.current_style == Some(style) {
            return Ok(());
        }
        self.writer.write_all(SGR_RESET)?;
        if let Some(fg) = style.fg {
            write!(self.writer, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
        }
        if let Some(bg) = style.bg {
            write!(self.writer, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
        }
        let codes: Vec<String> = FLAG_CODES
            .iter()
            .filter(|(flag, _)| style.flags.contains(*flag))
            .map(|(_, code)| code.to_string())
            .collect();
        if !codes.is_empty() {
            write!(self.writer, "\x1b[{}m", codes.join(";"))?;
        }
        self.current_style = Some(style);
        Ok(())
    }

    fn emit_link(&mut self, url: Option<&str>) -> io::Result<()> {
        if self.current_link.as_deref() == url {
            return Ok(());
        }
        if self.current_link.is_some() {
            self.writer.write_all(b"\x1b]8;;\x1b\\")?;
        }
        self.current_link = match url {
            Some(url) => {
                let clean = sanitize(url);
                write!(self.writer, "\x1b]8;;{clean}\x1b\\")?;
                Some(url.to_string())
            }
            None => None,
        };
        Ok(())
    }

    fn emit_content(&mut self, cell: &Cell) -> io::Result<()> {
        match &cell.symbol {
            CellContent::Grapheme(g) if !g.chars().any(char::is_control) => {
                self.writer.write_all(g.as_bytes())
            }
            _ => self.writer.write_all(b" "),
        }
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        write!(
            self.writer,
            "\x1b[{};{}H",
            y.saturating_add(1),
            x.saturating_add(1)
        )?;
        self.cursor = Some((x, y));
        Ok(())
    }

    /// Forget tracked terminal state.
    pub fn reset(&mut self) {
        self.current_style = None;
        self.current_link = None;
        self.cursor = None;
    }

    /// Write raw bytes (e.g. an OSC 52 sequence) between frames.
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    /// The underlying writer.
    pub fn writer_mut(&mut self) -> &mut BufWriter<W> {
        &mut self.writer
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

// Strip C0/C1 controls so a URL cannot terminate the OSC early.
fn sanitize(url: &str) -> String {
    url.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marklens_render::Rgb;

    fn output(prev: Option<&Buffer>, next: &Buffer) -> String {
        let mut p = Presenter::new(Vec::new(), true);
        p.present(prev, next).unwrap();
        String::from_utf8(p.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn first_frame_clears_and_writes_everything() {
        let mut buf = Buffer::new(3, 1);
        buf.print(0, 0, "abc", Style::new());
        let out = output(None, &buf);
        assert!(out.starts_with("\x1b[2J"));
        assert!(out.contains("\x1b[1;1Habc"));
        assert!(out.ends_with(std::str::from_utf8(SGR_RESET).unwrap()));
    }

    #[test]
    fn unchanged_frame_emits_only_reset() {
        let mut buf = Buffer::new(5, 2);
        buf.print(0, 0, "hello", Style::new());
        let out = output(Some(&buf.clone()), &buf);
        assert_eq!(out, "\x1b[0m");
    }

    #[test]
    fn single_change_moves_cursor_once() {
        let mut prev = Buffer::new(10, 3);
        prev.print(0, 1, "abcdef", Style::new());
        let mut next = prev.clone();
        next.print(2, 1, "XY", Style::new());
        let out = output(Some(&prev), &next);
        assert!(out.contains("\x1b[2;3H"), "{out:?}");
        assert!(out.contains("XY"));
        assert!(!out.contains('a'));
    }

    #[test]
    fn style_is_emitted_once_per_run() {
        let mut buf = Buffer::new(3, 1);
        buf.print(0, 0, "abc", Style::new().fg(Rgb(255, 0, 0)).bold());
        let out = output(None, &buf);
        assert_eq!(out.matches("\x1b[38;2;255;0;0m").count(), 1);
        assert_eq!(out.matches("\x1b[1m").count(), 1);
    }

    #[test]
    fn hyperlinks_open_and_close() {
        let mut buf = Buffer::new(6, 1);
        let id = buf.register_link("https://example.com");
        buf.print_linked(0, 0, "link", Style::new(), id);
        let out = output(None, &buf);
        assert!(out.contains("\x1b]8;;https://example.com\x1b\\link"));
        assert_eq!(out.matches("\x1b]8;;\x1b\\").count(), 1);
    }

    #[test]
    fn hyperlinks_can_be_disabled() {
        let mut buf = Buffer::new(6, 1);
        let id = buf.register_link("https://example.com");
        buf.print_linked(0, 0, "link", Style::new(), id);
        let mut p = Presenter::new(Vec::new(), false);
        p.present(None, &buf).unwrap();
        let out = String::from_utf8(p.into_inner().unwrap()).unwrap();
        assert!(!out.contains("\x1b]8;"));
    }

    #[test]
    fn same_cell_different_url_is_redrawn() {
        let mut prev = Buffer::new(4, 1);
        let a = prev.register_link("https://a");
        prev.print_linked(0, 0, "x", Style::new(), a);
        let mut next = Buffer::new(4, 1);
        let b = next.register_link("https://b");
        next.print_linked(0, 0, "x", Style::new(), b);
        assert_eq!(a, b);
        let out = output(Some(&prev), &next);
        assert!(out.contains("https://b"));
    }

    #[test]
    fn wide_glyph_advances_cursor_by_two() {
        let mut prev = Buffer::new(6, 1);
        prev.print(0, 0, "......", Style::new());
        let mut next = Buffer::new(6, 1);
        next.print(0, 0, "日本..", Style::new());
        let out = output(Some(&prev), &next);
        // One run covers both wide glyphs; no extra cursor move between them.
        assert_eq!(out.matches('H').count(), 1);
        assert!(out.contains("日本"));
    }

    #[test]
    fn control_characters_are_not_emitted() {
        let mut p = Presenter::new(Vec::new(), true);
        let mut buf = Buffer::new(4, 1);
        let id = buf.register_link("https://evil\x07\x1b]0;x");
        buf.print_linked(0, 0, "ok", Style::new(), id);
        p.present(None, &buf).unwrap();
        let out = String::from_utf8(p.into_inner().unwrap()).unwrap();
        assert!(!out.contains('\x07'));
        assert!(out.contains("https://evil]0;x"));
    }
}
