#![forbid(unsafe_code)]

//! Graph layout for the aggregate view.
//!
//! - [`GraphModel`] turns a dataset into category hubs and sample leaves.
//! - [`ForceSimulation`] positions them with repulsion, springs, centering,
//!   and collision, cooling geometrically until stable.
//! - [`Viewport`] maps world coordinates onto a terminal cell grid with
//!   clamped zoom and pan.

pub mod force;
pub mod graph;
pub mod viewport;

pub use force::{ForceParams, ForceSimulation};
pub use graph::{GraphLink, GraphModel, GraphNode, NodeKind, category_radius};
pub use viewport::{Canvas, MAX_ZOOM, MIN_ZOOM, Viewport};
