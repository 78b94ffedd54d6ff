#![forbid(unsafe_code)]

//! Aggregate renderer interface and capability-based selection.
//!
//! Two implementations draw the category overview: the force-directed
//! [`GraphView`](crate::graph_view::GraphView) and the dependency-free
//! [`BarGrid`](crate::bars::BarGrid). Selection prefers the graph when the
//! layout engine is enabled and there is something to lay out; a graph that
//! fails at draw time falls back to the bar grid for that frame.

use marklens_core::{Dataset, RenderError};
use tracing::debug;

use crate::bars::BarGrid;
use crate::buffer::Buffer;
use crate::geometry::Rect;
use crate::graph_view::GraphView;
use crate::hit::HitGrid;

/// Which aggregate renderer drew a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Graph,
    Bars,
}

/// Features detected or configured at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Force layout available.
    pub layout_engine: bool,
    /// Terminal renders OSC 8 hyperlinks.
    pub hyperlinks: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            layout_engine: true,
            hyperlinks: true,
        }
    }
}

/// Draws the category overview.
pub trait AggregateRenderer {
    fn kind(&self) -> AggregateKind;

    fn render_aggregate(
        &self,
        dataset: &Dataset,
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitGrid,
    ) -> Result<(), RenderError>;
}

/// Graph when the layout engine is on and the dataset has categories,
/// otherwise bars.
#[must_use]
pub fn select_aggregate_renderer(caps: &Capabilities, dataset: &Dataset) -> AggregateKind {
    if caps.layout_engine && !dataset.clusters.is_empty() {
        AggregateKind::Graph
    } else {
        AggregateKind::Bars
    }
}

/// Draw with the preferred renderer, falling back to bars on failure.
///
/// Returns the renderer that actually drew.
pub fn render_aggregate(
    preferred: AggregateKind,
    graph: &GraphView<'_>,
    bars: &BarGrid,
    dataset: &Dataset,
    area: Rect,
    buf: &mut Buffer,
    hits: &mut HitGrid,
) -> AggregateKind {
    if preferred == AggregateKind::Graph {
        match graph.render_aggregate(dataset, area, buf, hits) {
            Ok(()) => return AggregateKind::Graph,
            Err(err) => debug!(error = %err, "graph renderer unavailable; using bar grid"),
        }
    }
    if let Err(err) = bars.render_aggregate(dataset, area, buf, hits) {
        debug!(error = %err, "bar grid failed");
    }
    AggregateKind::Bars
}
