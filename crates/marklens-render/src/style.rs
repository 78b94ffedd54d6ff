#![forbid(unsafe_code)]

//! Cell styling.

pub use marklens_core::palette::Rgb;

bitflags::bitflags! {
    /// Text attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        /// Swap foreground and background.
        const REVERSE   = 0b0001_0000;
    }
}

/// Foreground, background, and attributes. `None` colours use the terminal
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub flags: StyleFlags,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.flags |= StyleFlags::BOLD;
        self
    }

    #[must_use]
    pub fn dim(mut self) -> Self {
        self.flags |= StyleFlags::DIM;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.flags |= StyleFlags::ITALIC;
        self
    }

    #[must_use]
    pub fn underline(mut self) -> Self {
        self.flags |= StyleFlags::UNDERLINE;
        self
    }

    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.flags |= StyleFlags::REVERSE;
        self
    }
}

/// Shared colours.
pub mod theme {
    use super::Rgb;

    pub const ACCENT: Rgb = Rgb(0x4f, 0x46, 0xe5);
    pub const MUTED: Rgb = Rgb(0x6b, 0x72, 0x80);
    pub const ERROR: Rgb = Rgb(0xef, 0x44, 0x44);
    pub const SUCCESS: Rgb = Rgb(0x16, 0x65, 0x34);
    pub const LINK_LINE: Rgb = Rgb(0x99, 0x99, 0x99);
    pub const BAR_EMPTY: Rgb = Rgb(0xe5, 0xe7, 0xeb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_compose() {
        let s = Style::new().fg(theme::ACCENT).bold().underline();
        assert_eq!(s.fg, Some(theme::ACCENT));
        assert!(s.flags.contains(StyleFlags::BOLD | StyleFlags::UNDERLINE));
        assert!(!s.flags.contains(StyleFlags::DIM));
        assert_eq!(Style::default(), Style::new());
    }
}
