#![forbid(unsafe_code)]

//! World-to-cell projection.
//!
//! The simulation works in world units on a [`Canvas`]. A [`Viewport`] fits
//! that canvas into a cell area, then applies zoom and pan. Terminal cells
//! are about twice as tall as they are wide, so one row covers two world
//! units for every one a column covers.

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 3.0;

const MIN_CANVAS_WIDTH: f64 = 1200.0;
const MIN_CANVAS_HEIGHT: f64 = 800.0;
const CELL_ASPECT: f64 = 2.0;

/// World extent of the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Canvas for a display of the given size, never smaller than 1200 x 800.
    #[must_use]
    pub fn for_display(width: f64, height: f64) -> Self {
        Self::new(width.max(MIN_CANVAS_WIDTH), height.max(MIN_CANVAS_HEIGHT))
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(MIN_CANVAS_WIDTH, MIN_CANVAS_HEIGHT)
    }
}

/// Zoom and pan state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    /// World offset of the view centre from the canvas centre.
    pan: (f64, f64),
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl Viewport {
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn pan(&self) -> (f64, f64) {
        self.pan
    }

    /// Set the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() {
            scale.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
    }

    /// Multiply the zoom by `factor`.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_scale(self.scale * factor);
    }

    /// Shift the view by world units.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    /// Back to scale 1, no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Columns per world unit for an area of `cols x rows`.
    #[must_use]
    pub fn units_to_cols(&self, canvas: Canvas, cols: u16, rows: u16) -> f64 {
        let fit_x = f64::from(cols) / canvas.width;
        let fit_y = f64::from(rows) * CELL_ASPECT / canvas.height;
        fit_x.min(fit_y) * self.scale
    }

    /// Project a world point to fractional `(col, row)` relative to the area origin.
    #[must_use]
    pub fn project(&self, canvas: Canvas, cols: u16, rows: u16, x: f64, y: f64) -> (f64, f64) {
        let k = self.units_to_cols(canvas, cols, rows);
        let (cx, cy) = canvas.center();
        let col = (x - cx - self.pan.0) * k + f64::from(cols) / 2.0;
        let row = (y - cy - self.pan.1) * k / CELL_ASPECT + f64::from(rows) / 2.0;
        (col, row)
    }

    /// Inverse of [`Viewport::project`].
    #[must_use]
    pub fn unproject(&self, canvas: Canvas, cols: u16, rows: u16, col: f64, row: f64) -> (f64, f64) {
        let k = self.units_to_cols(canvas, cols, rows);
        let (cx, cy) = canvas.center();
        if k <= 0.0 {
            return (cx, cy);
        }
        let x = (col - f64::from(cols) / 2.0) / k + cx + self.pan.0;
        let y = (row - f64::from(rows) / 2.0) * CELL_ASPECT / k + cy + self.pan.1;
        (x, y)
    }

    /// Radius in columns of a world circle of radius `r`.
    #[must_use]
    pub fn radius_cols(&self, canvas: Canvas, cols: u16, rows: u16, r: f64) -> f64 {
        r * self.units_to_cols(canvas, cols, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut v = Viewport::default();
        v.zoom_by(100.0);
        assert_eq!(v.scale(), MAX_ZOOM);
        v.zoom_by(0.0001);
        assert_eq!(v.scale(), MIN_ZOOM);
        v.set_scale(f64::NAN);
        assert_eq!(v.scale(), 1.0);
    }

    #[test]
    fn canvas_has_minimum_extent() {
        assert_eq!(Canvas::for_display(80.0, 24.0), Canvas::new(1200.0, 800.0));
        assert_eq!(Canvas::for_display(2000.0, 900.0), Canvas::new(2000.0, 900.0));
    }

    #[test]
    fn center_projects_to_middle() {
        let v = Viewport::default();
        let canvas = Canvas::default();
        let (cx, cy) = canvas.center();
        assert_eq!(v.project(canvas, 120, 40, cx, cy), (60.0, 20.0));
    }

    #[test]
    fn rows_are_half_as_dense() {
        let v = Viewport::default();
        let canvas = Canvas::default();
        let (cx, cy) = canvas.center();
        let (c0, r0) = v.project(canvas, 120, 40, cx, cy);
        let (c1, _) = v.project(canvas, 120, 40, cx + 100.0, cy);
        let (_, r1) = v.project(canvas, 120, 40, cx, cy + 100.0);
        assert!(((c1 - c0) - 2.0 * (r1 - r0)).abs() < 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let mut v = Viewport::default();
        v.zoom_by(1.7);
        v.pan_by(-40.0, 25.0);
        let canvas = Canvas::default();
        let (col, row) = v.project(canvas, 100, 30, 321.0, 456.0);
        let (x, y) = v.unproject(canvas, 100, 30, col, row);
        assert!((x - 321.0).abs() < 1e-9);
        assert!((y - 456.0).abs() < 1e-9);
    }

    #[test]
    fn pan_moves_view_not_world() {
        let mut v = Viewport::default();
        let canvas = Canvas::default();
        let (cx, cy) = canvas.center();
        v.pan_by(100.0, 0.0);
        let (col, _) = v.project(canvas, 120, 40, cx, cy);
        assert!(col < 60.0);
        v.reset();
        assert_eq!(v, Viewport::default());
    }
}
