#![forbid(unsafe_code)]

//! Mouse hit regions.
//!
//! Renderers register rectangles tagged with a [`HitTarget`] while drawing.
//! The app resolves a click by looking up the cell under the pointer. Later
//! registrations win on overlap, so anything drawn on top (the modal) also
//! captures the clicks.

use crate::geometry::Rect;

/// What a region of the screen stands for.
///
/// Category and record indices refer to `Dataset::clusters` and to the
/// controller's current filtered list respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// Sidebar "All Bookmarks" entry.
    AllCategories,
    /// A category: sidebar entry, bar tile, or graph hub.
    Category(usize),
    /// The detail affordance of a category.
    CategoryInfo(usize),
    /// A bookmark card body.
    Card(usize),
    /// A bookmark card's copy affordance.
    Copy(usize),
    /// A graph node, by node index; used to start drags.
    GraphNode(usize),
    SearchBox,
    ModalClose,
    /// Modal body; swallows clicks so they do not reach the view beneath.
    Modal,
}

/// Per-cell map from screen position to [`HitTarget`].
#[derive(Debug, Clone)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<Option<HitTarget>>,
}

impl HitGrid {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
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

    /// Map every cell of `rect` (clamped to the grid) to `target`.
    pub fn register(&mut self, rect: Rect, target: HitTarget) {
        let x_end = (rect.x as usize + rect.width as usize).min(self.width as usize);
        let y_end = (rect.y as usize + rect.height as usize).min(self.height as usize);
        if rect.x as usize >= x_end || rect.y as usize >= y_end {
            return;
        }
        for y in rect.y as usize..y_end {
            let row = y * self.width as usize;
            self.cells[row + rect.x as usize..row + x_end].fill(Some(target));
        }
    }

    #[must_use]
    pub fn hit_test(&self, x: u16, y: u16) -> Option<HitTarget> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Distinct targets registered anywhere, in first-seen scan order.
    #[must_use]
    pub fn targets(&self) -> Vec<HitTarget> {
        let mut out: Vec<HitTarget> = Vec::new();
        for t in self.cells.iter().flatten() {
            if !out.contains(t) {
                out.push(*t);
            }
        }
        out
    }

    /// Top-left cell of the first region registered for `target`.
    #[must_use]
    pub fn locate(&self, target: HitTarget) -> Option<(u16, u16)> {
        let idx = self.cells.iter().position(|c| *c == Some(target))?;
        let w = self.width as usize;
        Some(((idx % w) as u16, (idx / w) as u16))
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}
