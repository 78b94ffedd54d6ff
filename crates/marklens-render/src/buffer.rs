#![forbid(unsafe_code)]

//! Cell grid.
//!
//! A [`Buffer`] is a row-major grid of [`Cell`]s (`index = y * width + x`)
//! plus a clip stack and the frame's [`LinkRegistry`].
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. A wide glyph's head is always followed by a `Continuation` cell, and a
//!    `Continuation` never appears without its head
//! 3. Writes outside the current clip are dropped; a wide glyph is written
//!    whole or not at all
//! 4. The clip stack always has at least one element

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::geometry::Rect;
use crate::links::LinkRegistry;
use crate::style::Style;

/// What a cell displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellContent {
    #[default]
    Empty,
    /// Trailing column of a wide glyph.
    Continuation,
    /// One grapheme cluster.
    Grapheme(Box<str>),
}

impl CellContent {
    /// Columns occupied when drawn.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Empty => 1,
            Self::Continuation => 0,
            Self::Grapheme(g) => g.width(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Grapheme(g) => Some(g),
            _ => None,
        }
    }
}

/// One terminal cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub symbol: CellContent,
    pub style: Style,
    /// Hyperlink id into the buffer's [`LinkRegistry`]; 0 for none.
    pub link: u32,
}

impl Cell {
    #[must_use]
    pub fn new(grapheme: &str, style: Style) -> Self {
        Self {
            symbol: CellContent::Grapheme(grapheme.into()),
            style,
            link: 0,
        }
    }

    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.symbol == CellContent::Continuation
    }
}

/// Characters for box borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    pub const DOUBLE: Self = Self {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
    };
}

/// A 2D grid of cells.
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    clip_stack: Vec<Rect>,
    links: LinkRegistry,
}

impl Buffer {
    /// A blank buffer. Zero-sized buffers are allowed and ignore all writes.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
            clip_stack: vec![Rect::from_size(width, height)],
            links: LinkRegistry::new(),
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    /// Register a URL for OSC 8 output; returns the id to put on cells.
    pub fn register_link(&mut self, url: &str) -> u32 {
        self.links.register(url)
    }

    /// Reset every cell and drop registered links.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
        self.links.clear();
        self.clip_stack.truncate(1);
    }

    /// Narrow the writable region to `rect` intersected with the current clip.
    pub fn push_clip(&mut self, rect: Rect) {
        let next = self.clip().intersection(&rect);
        self.clip_stack.push(next);
    }

    pub fn pop_clip(&mut self) {
        if self.clip_stack.len() > 1 {
            self.clip_stack.pop();
        }
    }

    #[must_use]
    pub fn clip(&self) -> Rect {
        self.clip_stack
            .last()
            .copied()
            .unwrap_or_else(|| Rect::from_size(self.width, self.height))
    }

    // If (x, y) is part of a wide glyph, blank the other half.
    fn clear_overlap(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if self.cells[idx].is_continuation() && x > 0 {
            if let Some(head) = self.index(x - 1, y) {
                self.cells[head] = Cell::default();
            }
        } else if self.cells[idx].symbol.width() > 1 {
            if let Some(tail) = self.index(x + 1, y) {
                if self.cells[tail].is_continuation() {
                    self.cells[tail] = Cell::default();
                }
            }
        }
    }

    /// Write one grapheme at `(x, y)`. Returns the columns it occupies, or 0
    /// when clipped.
    pub fn set_grapheme(&mut self, x: u16, y: u16, grapheme: &str, style: Style, link: u32) -> u16 {
        let width = grapheme.width();
        if width == 0 {
            return 0;
        }
        let clip = self.clip();
        for dx in 0..width as u16 {
            if !clip.contains(x.saturating_add(dx), y) {
                return 0;
            }
        }

        self.clear_overlap(x, y);
        if width > 1 {
            self.clear_overlap(x + 1, y);
        }
        let Some(idx) = self.index(x, y) else {
            return 0;
        };
        self.cells[idx] = Cell {
            symbol: CellContent::Grapheme(grapheme.into()),
            style,
            link,
        };
        for dx in 1..width as u16 {
            if let Some(tail) = self.index(x + dx, y) {
                self.cells[tail] = Cell {
                    symbol: CellContent::Continuation,
                    style,
                    link,
                };
            }
        }
        width as u16
    }

    /// Print `text` starting at `(x, y)` without wrapping. Stops at the clip
    /// edge. Returns the column after the last glyph written.
    pub fn print(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.print_linked(x, y, text, style, 0)
    }

    /// Like [`Buffer::print`] but tags every cell with `link`.
    pub fn print_linked(&mut self, x: u16, y: u16, text: &str, style: Style, link: u32) -> u16 {
        let right = self.clip().right();
        let mut cx = x;
        for g in text.graphemes(true) {
            let w = g.width() as u16;
            if w == 0 {
                continue;
            }
            if cx.saturating_add(w) > right {
                break;
            }
            self.set_grapheme(cx, y, g, style, link);
            cx += w;
        }
        cx
    }

    /// Fill `rect` with blank cells in `style`.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        let area = rect.intersection(&self.clip());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if let Some(idx) = self.index(x, y) {
                    self.cells[idx] = Cell {
                        symbol: CellContent::Empty,
                        style,
                        link: 0,
                    };
                }
            }
        }
        // Wide glyphs straddling either edge lose their other half.
        for y in area.y..area.bottom() {
            if area.x > 0 {
                if let Some(idx) = self.index(area.x - 1, y) {
                    if self.cells[idx].symbol.width() > 1 {
                        self.cells[idx] = Cell::default();
                    }
                }
            }
            if let Some(idx) = self.index(area.right(), y) {
                if self.cells[idx].is_continuation() {
                    self.cells[idx] = Cell::default();
                }
            }
        }
    }

    /// Replace the style of every cell in `rect`, keeping symbols.
    pub fn set_style(&mut self, rect: Rect, style: Style) {
        let area = rect.intersection(&self.clip());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if let Some(idx) = self.index(x, y) {
                    self.cells[idx].style = style;
                }
            }
        }
    }

    /// Horizontal run of `ch`.
    pub fn hline(&mut self, x: u16, y: u16, width: u16, ch: char, style: Style) {
        let mut tmp = [0u8; 4];
        let s = ch.encode_utf8(&mut tmp);
        for dx in 0..width {
            self.set_grapheme(x.saturating_add(dx), y, s, style, 0);
        }
    }

    /// Border drawn on the edge cells of `rect`.
    pub fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Style) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (l, t) = (rect.x, rect.y);
        let (r, b) = (rect.right() - 1, rect.bottom() - 1);
        self.hline(l + 1, t, rect.width - 2, chars.horizontal, style);
        self.hline(l + 1, b, rect.width - 2, chars.horizontal, style);
        let mut tmp = [0u8; 4];
        let v = &*chars.vertical.encode_utf8(&mut tmp);
        for y in (t + 1)..b {
            self.set_grapheme(l, y, v, style, 0);
            self.set_grapheme(r, y, v, style, 0);
        }
        for (x, y, ch) in [
            (l, t, chars.top_left),
            (r, t, chars.top_right),
            (l, b, chars.bottom_left),
            (r, b, chars.bottom_right),
        ] {
            let mut tmp = [0u8; 4];
            self.set_grapheme(x, y, ch.encode_utf8(&mut tmp), style, 0);
        }
    }

    /// Plain text of row `y`: continuation cells skipped, blanks as spaces.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::with_capacity(self.width as usize);
        for x in 0..self.width {
            let Some(cell) = self.get(x, y) else {
                break;
            };
            match &cell.symbol {
                CellContent::Empty => out.push(' '),
                CellContent::Continuation => {}
                CellContent::Grapheme(g) => out.push_str(g),
            }
        }
        out
    }

    /// Whole buffer as plain text, rows separated by `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
