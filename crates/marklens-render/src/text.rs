#![forbid(unsafe_code)]

//! Grapheme-aware text helpers.
//!
//! Nothing here splits an emoji, ZWJ sequence, or combining sequence.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Longest card title shown before the ellipsis.
pub const TITLE_MAX_GRAPHEMES: usize = 40;

/// Ellipsis appended to shortened titles.
pub const ELLIPSIS: &str = "...";

/// Keep the first `max_graphemes` graphemes and append `ellipsis` when
/// `text` is longer; return it unchanged otherwise.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_graphemes: usize, ellipsis: &str) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(max_graphemes) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ellipsis.len());
            out.push_str(&text[..cut]);
            out.push_str(ellipsis);
            out
        }
    }
}

/// Card title form: 40 graphemes, then `...`.
#[must_use]
pub fn card_title(title: &str) -> String {
    truncate_with_ellipsis(title, TITLE_MAX_GRAPHEMES, ELLIPSIS)
}

/// Longest prefix of `text` whose display width fits in `max_width` columns.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (idx, g) in text.grapheme_indices(true) {
        let w = g.width();
        if width + w > max_width {
            return &text[..idx];
        }
        width += w;
    }
    text
}

/// Fit `text` into `max_width` columns, ending with `ellipsis` when cut.
#[must_use]
pub fn fit_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let ew = ellipsis.width();
    if ew >= max_width {
        return truncate_to_width(text, max_width).to_string();
    }
    let mut out = truncate_to_width(text, max_width - ew).to_string();
    out.push_str(ellipsis);
    out
}

/// Display width in columns.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.width()
}
