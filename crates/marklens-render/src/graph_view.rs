#![forbid(unsafe_code)]

//! Force-directed category graph.
//!
//! [`GraphScene`] owns the simulation and viewport and survives across
//! frames; the app ticks it while it is still cooling and routes drags, zoom,
//! and pan into it. [`GraphView`] borrows a scene for one frame and draws it.
//!
//! Hub node `i` corresponds to `Dataset::clusters[i]`: hubs are created in
//! dataset order ahead of every sample node.

use marklens_core::palette;
use marklens_core::{Dataset, RenderError};
use marklens_layout::{Canvas, ForceParams, ForceSimulation, GraphModel, NodeKind, Viewport};
use tracing::debug;

use crate::buffer::Buffer;
use crate::geometry::Rect;
use crate::hit::{HitGrid, HitTarget};
use crate::renderer::{AggregateKind, AggregateRenderer};
use crate::style::{Style, theme};
use crate::text::{display_width, fit_width};

/// Sample leaves drawn per category.
pub const SAMPLES_PER_CATEGORY: usize = 3;

const HINT: &str = "drag nodes · +/- zoom · arrows pan · 0 reset";

/// Persistent graph state.
#[derive(Debug, Clone)]
pub struct GraphScene {
    sim: ForceSimulation,
    viewport: Viewport,
    dragging: Option<usize>,
}

impl GraphScene {
    /// Build the graph for `dataset` laid out on `canvas`.
    #[must_use]
    pub fn new(dataset: &Dataset, canvas: Canvas) -> Self {
        let graph = GraphModel::from_dataset(dataset, SAMPLES_PER_CATEGORY);
        Self {
            sim: ForceSimulation::new(graph, canvas, ForceParams::default()),
            viewport: Viewport::default(),
            dragging: None,
        }
    }

    #[must_use]
    pub fn simulation(&self) -> &ForceSimulation {
        &self.sim
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Run up to `ticks` simulation steps. Returns `true` if anything moved.
    pub fn step(&mut self, ticks: usize) -> bool {
        let mut ran = 0;
        while ran < ticks && !self.sim.is_stable() {
            self.sim.tick();
            ran += 1;
        }
        ran > 0
    }

    /// Still cooling (or held warm by a drag).
    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.sim.is_stable()
    }

    /// World point under cell `(col, row)` of `area`.
    #[must_use]
    pub fn cell_to_world(&self, area: Rect, col: u16, row: u16) -> (f64, f64) {
        let canvas_area = canvas_area(area);
        self.viewport.unproject(
            self.sim.canvas(),
            canvas_area.width,
            canvas_area.height,
            f64::from(col.saturating_sub(canvas_area.x)) + 0.5,
            f64::from(row.saturating_sub(canvas_area.y)) + 0.5,
        )
    }

    /// Node index under a screen cell, if any.
    #[must_use]
    pub fn node_at_cell(&self, area: Rect, col: u16, row: u16) -> Option<usize> {
        let (x, y) = self.cell_to_world(area, col, row);
        self.sim.node_at(x, y)
    }

    /// Start dragging node `idx`.
    pub fn begin_drag(&mut self, idx: usize) -> bool {
        if self.sim.drag_start(idx) {
            self.dragging = Some(idx);
            true
        } else {
            false
        }
    }

    /// Move the dragged node to the world point under a screen cell.
    pub fn drag_to_cell(&mut self, area: Rect, col: u16, row: u16) -> bool {
        let Some(idx) = self.dragging else {
            return false;
        };
        let (x, y) = self.cell_to_world(area, col, row);
        self.sim.drag_to(idx, x, y)
    }

    /// Release the dragged node. Returns its index.
    pub fn end_drag(&mut self) -> Option<usize> {
        let idx = self.dragging.take()?;
        self.sim.drag_end(idx);
        debug!(node = idx, "drag released");
        Some(idx)
    }

    #[must_use]
    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }
}

// Area below the header rows.
fn canvas_area(area: Rect) -> Rect {
    area.split_top(2).1
}

/// Graph aggregate renderer for one frame.
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    scene: Option<&'a GraphScene>,
    /// Category index with keyboard focus.
    pub highlighted: Option<usize>,
}

impl<'a> GraphView<'a> {
    /// `None` means the layout engine is unavailable.
    #[must_use]
    pub fn new(scene: Option<&'a GraphScene>) -> Self {
        Self {
            scene,
            highlighted: None,
        }
    }

    #[must_use]
    pub fn with_highlight(mut self, highlighted: Option<usize>) -> Self {
        self.highlighted = highlighted;
        self
    }
}

// Bresenham between two cells, clipped by the buffer.
fn draw_line(buf: &mut Buffer, from: (i32, i32), to: (i32, i32), style: Style) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut steps = 0;
    loop {
        if x0 >= 0 && y0 >= 0 && x0 <= i32::from(u16::MAX) && y0 <= i32::from(u16::MAX) {
            buf.set_grapheme(x0 as u16, y0 as u16, "·", style, 0);
        }
        if (x0 == x1 && y0 == y1) || steps > 4096 {
            break;
        }
        steps += 1;
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

impl AggregateRenderer for GraphView<'_> {
    fn kind(&self) -> AggregateKind {
        AggregateKind::Graph
    }

    fn render_aggregate(
        &self,
        dataset: &Dataset,
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitGrid,
    ) -> Result<(), RenderError> {
        let scene = self.scene.ok_or(RenderError::DependencyMissing)?;
        if dataset.clusters.is_empty() || scene.sim.graph().is_empty() {
            return Err(RenderError::NoData);
        }
        if area.is_empty() {
            return Ok(());
        }

        buf.fill(area, Style::new());
        buf.push_clip(area);

        let graph = scene.sim.graph();
        buf.print(area.x, area.y, &graph.header(), Style::new().bold());
        if area.height > 1 {
            buf.print(area.x, area.y + 1, HINT, Style::new().fg(theme::MUTED));
        }

        let body = canvas_area(area);
        if body.is_empty() {
            buf.pop_clip();
            return Ok(());
        }
        buf.push_clip(body);

        let canvas = scene.sim.canvas();
        let project = |idx: usize| -> (i32, i32) {
            let (x, y) = scene.sim.position(idx).unwrap_or(canvas.center());
            let (c, r) = scene
                .viewport
                .project(canvas, body.width, body.height, x, y);
            (
                i32::from(body.x) + c.floor() as i32,
                i32::from(body.y) + r.floor() as i32,
            )
        };

        let link_style = Style::new().fg(theme::LINK_LINE).dim();
        for link in graph.links() {
            draw_line(buf, project(link.source), project(link.target), link_style);
        }

        let to_cell = |(c, r): (i32, i32)| -> Option<(u16, u16)> {
            (c >= 0 && r >= 0 && c <= i32::from(u16::MAX) && r <= i32::from(u16::MAX))
                .then_some((c as u16, r as u16))
        };

        // Samples under hubs so hubs and their labels stay readable.
        for (idx, node) in graph.nodes().iter().enumerate() {
            let NodeKind::Sample { .. } = node.kind else {
                continue;
            };
            let Some((c, r)) = to_cell(project(idx)) else {
                continue;
            };
            let color = palette::color(&node.category).unwrap_or(palette::DEFAULT_SAMPLE_COLOR);
            if buf.set_grapheme(c, r, "•", Style::new().fg(color), 0) > 0 {
                hits.register(Rect::new(c, r, 1, 1), HitTarget::GraphNode(idx));
            }
        }

        for (idx, node) in graph.nodes().iter().enumerate() {
            if !node.is_category() {
                continue;
            }
            let Some((c, r)) = to_cell(project(idx)) else {
                continue;
            };
            let color = palette::color(&node.id).unwrap_or(palette::DEFAULT_CATEGORY_COLOR);
            let rc = scene
                .viewport
                .radius_cols(canvas, body.width, body.height, node.radius)
                .max(0.5);
            let rr = rc / 2.0;
            let (ri, rj) = (rc.ceil() as i32, rr.ceil() as i32);
            for dy in -rj..=rj {
                for dx in -ri..=ri {
                    let nx = f64::from(dx) / rc;
                    let ny = f64::from(dy) / rr.max(0.5);
                    if nx * nx + ny * ny > 1.0 {
                        continue;
                    }
                    let Some((cx, cy)) = to_cell((i32::from(c) + dx, i32::from(r) + dy)) else {
                        continue;
                    };
                    if buf.set_grapheme(cx, cy, "●", Style::new().fg(color), 0) > 0 {
                        hits.register(Rect::new(cx, cy, 1, 1), HitTarget::GraphNode(idx));
                    }
                }
            }

            let label = format!("{} {}", palette::icon(&node.id), node.id);
            let label = fit_width(&label, 24, "...");
            let lw = display_width(&label) as u16;
            let ly = r.saturating_add(rj as u16 + 1);
            let lx = c.saturating_sub(lw / 2);
            let mut style = Style::new().bold();
            if self.highlighted == Some(idx) {
                style = style.reverse();
            }
            let end = buf.print(lx, ly, &label, style);
            if end > lx {
                hits.register(Rect::new(lx, ly, end - lx, 1), HitTarget::GraphNode(idx));
            }
        }

        buf.pop_clip();
        buf.pop_clip();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marklens_core::BookmarkRecord;

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for (cluster, n) in [("Rust", 4), ("Go", 2)] {
            for i in 0..n {
                records.push(BookmarkRecord::new(
                    format!("{cluster} {i}"),
                    format!("https://{cluster}.dev/{i}"),
                    "dev",
                    cluster,
                ));
            }
        }
        Dataset::from_records(records)
    }

    fn settled_scene(ds: &Dataset) -> GraphScene {
        let mut scene = GraphScene::new(ds, Canvas::default());
        scene.step(1000);
        scene
    }

    #[test]
    fn missing_scene_reports_dependency() {
        let ds = dataset();
        let mut buf = Buffer::new(80, 24);
        let mut hits = HitGrid::new(80, 24);
        let err = GraphView::new(None)
            .render_aggregate(&ds, buf.area(), &mut buf, &mut hits)
            .unwrap_err();
        assert_eq!(err, RenderError::DependencyMissing);
        assert!(hits.targets().is_empty());
    }

    #[test]
    fn empty_dataset_reports_no_data() {
        let ds = Dataset::empty();
        let scene = GraphScene::new(&ds, Canvas::default());
        let mut buf = Buffer::new(80, 24);
        let mut hits = HitGrid::new(80, 24);
        let err = GraphView::new(Some(&scene))
            .render_aggregate(&ds, buf.area(), &mut buf, &mut hits)
            .unwrap_err();
        assert_eq!(err, RenderError::NoData);
    }

    #[test]
    fn draws_header_and_labels() {
        let ds = dataset();
        let scene = settled_scene(&ds);
        assert!(!scene.is_animating());
        let mut buf = Buffer::new(120, 40);
        let mut hits = HitGrid::new(120, 40);
        GraphView::new(Some(&scene))
            .render_aggregate(&ds, buf.area(), &mut buf, &mut hits)
            .unwrap();
        let text = buf.to_text();
        assert!(text.starts_with("Network Graph: 2 Categories, 6 Bookmarks"));
        assert!(text.contains("🦀 Rust"), "{text}");
        assert!(text.contains("Go"));
        assert!(hits.locate(HitTarget::GraphNode(0)).is_some());
        assert!(hits.locate(HitTarget::GraphNode(1)).is_some());
    }

    #[test]
    fn hub_cell_maps_back_to_node() {
        let ds = dataset();
        let scene = settled_scene(&ds);
        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::new(120, 40);
        let mut hits = HitGrid::new(120, 40);
        GraphView::new(Some(&scene))
            .render_aggregate(&ds, area, &mut buf, &mut hits)
            .unwrap();

        let (x, y) = scene.simulation().position(0).unwrap();
        let body = canvas_area(area);
        let (c, r) = scene
            .viewport()
            .project(scene.simulation().canvas(), body.width, body.height, x, y);
        let (col, row) = (body.x + c.floor() as u16, body.y + r.floor() as u16);
        assert_eq!(hits.hit_test(col, row), Some(HitTarget::GraphNode(0)));
        assert_eq!(scene.node_at_cell(area, col, row), Some(0));
    }

    #[test]
    fn drag_through_scene() {
        let ds = dataset();
        let mut scene = settled_scene(&ds);
        let area = Rect::new(0, 0, 120, 40);
        assert!(!scene.begin_drag(usize::MAX));
        assert!(scene.begin_drag(1));
        assert!(scene.simulation().is_pinned(1));
        assert!(scene.is_animating());
        assert!(scene.drag_to_cell(area, 10, 10));
        scene.step(5);
        let (x, y) = scene.simulation().position(1).unwrap();
        let expected = scene.cell_to_world(area, 10, 10);
        assert!((x - expected.0).abs() < 1e-9 && (y - expected.1).abs() < 1e-9);
        assert_eq!(scene.end_drag(), Some(1));
        assert_eq!(scene.end_drag(), None);
        assert!(!scene.drag_to_cell(area, 0, 0));
    }
}
