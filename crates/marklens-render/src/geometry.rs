#![forbid(unsafe_code)]

//! Cell-space rectangles.

/// A rectangle in terminal cells (origin top-left, edges exclusive on the
/// right and bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles; empty when they do not touch.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if x < right && y < bottom {
            Rect::new(x, y, right - x, bottom - y)
        } else {
            Rect::default()
        }
    }

    /// Shrink by `n` cells on every side.
    #[must_use]
    pub fn inset(&self, n: u16) -> Rect {
        Rect::new(
            self.x.saturating_add(n),
            self.y.saturating_add(n),
            self.width.saturating_sub(n.saturating_mul(2)),
            self.height.saturating_sub(n.saturating_mul(2)),
        )
    }

    /// Split off `width` columns on the left; returns `(left, rest)`.
    #[must_use]
    pub fn split_left(&self, width: u16) -> (Rect, Rect) {
        let w = width.min(self.width);
        (
            Rect::new(self.x, self.y, w, self.height),
            Rect::new(self.x + w, self.y, self.width - w, self.height),
        )
    }

    /// Split off `height` rows at the top; returns `(top, rest)`.
    #[must_use]
    pub fn split_top(&self, height: u16) -> (Rect, Rect) {
        let h = height.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, h),
            Rect::new(self.x, self.y + h, self.width, self.height - h),
        )
    }

    /// Split off `height` rows at the bottom; returns `(rest, bottom)`.
    #[must_use]
    pub fn split_bottom(&self, height: u16) -> (Rect, Rect) {
        let h = height.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, self.height - h),
            Rect::new(self.x, self.bottom() - h, self.width, h),
        )
    }

    /// A `width x height` rectangle centred in `self`, clamped to fit.
    #[must_use]
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let w = width.min(self.width);
        let h = height.min(self.height);
        Rect::new(
            self.x + (self.width - w) / 2,
            self.y + (self.height - h) / 2,
            w,
            h,
        )
    }

    /// The single row `dy` rows below the top.
    #[must_use]
    pub fn row(&self, dy: u16) -> Rect {
        if dy >= self.height {
            return Rect::new(self.x, self.bottom(), self.width, 0);
        }
        Rect::new(self.x, self.y + dy, self.width, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_disjoint_is_empty() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(10, 10, 5, 5);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.intersection(&Rect::new(3, 3, 5, 5)), Rect::new(3, 3, 2, 2));
    }

    #[test]
    fn splits_partition() {
        let r = Rect::new(2, 3, 40, 10);
        let (l, rest) = r.split_left(12);
        assert_eq!(l.width + rest.width, 40);
        assert_eq!(rest.x, 14);
        let (top, body) = r.split_top(100);
        assert_eq!(top, r);
        assert!(body.is_empty());
        let (body, bottom) = r.split_bottom(1);
        assert_eq!(bottom.y, 12);
        assert_eq!(body.height, 9);
    }

    #[test]
    fn centered_fits() {
        let r = Rect::new(0, 0, 80, 24);
        assert_eq!(r.centered(40, 10), Rect::new(20, 7, 40, 10));
        assert_eq!(r.centered(200, 200), r);
    }

    #[test]
    fn inset_saturates() {
        assert!(Rect::new(0, 0, 1, 1).inset(1).is_empty());
        assert_eq!(Rect::new(0, 0, 10, 6).inset(1), Rect::new(1, 1, 8, 4));
    }
}
