#![forbid(unsafe_code)]

//! Per-category icons and colours.
//!
//! Unknown categories get [`FALLBACK_ICON`] and the node-kind default colour.

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// Icon for categories without an entry.
pub const FALLBACK_ICON: &str = "📌";

/// Default colour for a category node.
pub const DEFAULT_CATEGORY_COLOR: Rgb = Rgb::from_hex(0x4f46e5);

/// Default colour for a sample node.
pub const DEFAULT_SAMPLE_COLOR: Rgb = Rgb::from_hex(0x10b981);

const ICONS: &[(&str, &str)] = &[
    ("JavaScript", "🟨"),
    ("Python", "🐍"),
    ("Java/Kotlin", "☕"),
    ("Rust", "🦀"),
    ("Go", "🐹"),
    ("C++", "⚡"),
    ("C#/.NET", "🔷"),
    ("PHP", "🐘"),
    ("Ruby", "💎"),
    ("Swift/iOS", "🍎"),
    ("Web Design", "🎨"),
    ("APIs", "🔌"),
    ("Containers", "📦"),
    ("Cloud", "☁️"),
    ("DevOps", "⚙️"),
    ("Databases", "🗄️"),
    ("AI/ML", "🤖"),
    ("Dev Tools", "🔧"),
    ("Testing", "🧪"),
    ("Work Tools", "💼"),
    ("Project Management", "📊"),
    ("Documentation", "📖"),
    ("Learning", "🎓"),
    ("BuildingMinds", "🏢"),
    ("HR/Admin", "👥"),
    ("Microsoft", "🪟"),
    ("Entertainment", "🎭"),
    ("Other", "📌"),
];

const COLORS: &[(&str, u32)] = &[
    ("JavaScript", 0xf7df1e),
    ("Python", 0x3776ab),
    ("Java/Kotlin", 0xed8b00),
    ("Go", 0x00add8),
    ("Rust", 0xce422b),
    ("AI/ML", 0xff6b6b),
    ("Cloud", 0x4ecdc4),
    ("BuildingMinds", 0x1a73e8),
    ("APIs", 0x34a853),
    ("Dev Tools", 0xea4335),
    ("Documentation", 0x9c27b0),
    ("Learning", 0xff9800),
    ("Testing", 0x607d8b),
    ("Databases", 0x795548),
    ("Web Design", 0xe91e63),
    ("Containers", 0x00bcd4),
    ("DevOps", 0xffeb3b),
    ("Work Tools", 0x673ab7),
    ("Project Management", 0x009688),
    ("Other", 0x95a5a6),
    ("Entertainment", 0xf44336),
    ("Microsoft", 0x0078d4),
];

/// Icon shown next to a category name.
#[must_use]
pub fn icon(category: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(name, _)| *name == category)
        .map_or(FALLBACK_ICON, |(_, icon)| icon)
}

/// Colour assigned to a category, if it has one.
#[must_use]
pub fn color(category: &str) -> Option<Rgb> {
    COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, hex)| Rgb::from_hex(*hex))
}

/// Accent for the `index`-th tile of the bar grid: hues step by the golden
/// angle (137.5 degrees) at 60% saturation and 70% lightness.
#[must_use]
pub fn tile_accent(index: usize) -> Rgb {
    let hue = (index as f64 * 137.5) % 360.0;
    hsl_to_rgb(hue, 0.6, 0.7)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(to_u8(r), to_u8(g), to_u8(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_icons() {
        assert_eq!(icon("Rust"), "🦀");
        assert_eq!(icon("Basket Weaving"), FALLBACK_ICON);
    }

    #[test]
    fn hex_unpacks() {
        assert_eq!(Rgb::from_hex(0xce422b), Rgb(0xce, 0x42, 0x2b));
        assert_eq!(color("Rust"), Some(Rgb(0xce, 0x42, 0x2b)));
        assert_eq!(color("HR/Admin"), None);
    }

    #[test]
    fn tile_accents_follow_golden_angle() {
        // Hue 0 at 60% saturation, 70% lightness.
        assert_eq!(tile_accent(0), Rgb(224, 133, 133));
        assert_ne!(tile_accent(1), tile_accent(0));
        assert_eq!(tile_accent(0), tile_accent(0));
    }
}
