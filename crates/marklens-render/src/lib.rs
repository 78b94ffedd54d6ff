#![forbid(unsafe_code)]

//! Render: cell buffer, hit regions, and every widget marklens draws.
//!
//! # Role in marklens
//! Widgets write into a [`Buffer`] and record clickable regions in a
//! [`HitGrid`]. Neither touches the terminal; the binary diffs buffers and
//! emits the escape sequences, and tests read them back with
//! [`Buffer::to_text`].
//!
//! # Key Components
//!
//! - [`CardGrid`] - the bookmark list ([`CardRenderer`])
//! - [`GraphView`] / [`BarGrid`] - the two [`AggregateRenderer`]s, picked by
//!   [`select_aggregate_renderer`]
//! - [`DetailModal`] - per-category overlay
//! - [`Sidebar`] / [`SearchBar`] / [`render_status`] - chrome

pub mod bars;
pub mod buffer;
pub mod cards;
pub mod chrome;
pub mod geometry;
pub mod graph_view;
pub mod hit;
pub mod links;
pub mod message;
pub mod modal;
pub mod renderer;
pub mod style;
pub mod text;

pub use bars::BarGrid;
pub use buffer::{BorderChars, Buffer, Cell, CellContent};
pub use cards::{CardGrid, CardRenderer};
pub use chrome::{SearchBar, Sidebar, render_status};
pub use geometry::Rect;
pub use graph_view::{GraphScene, GraphView};
pub use hit::{HitGrid, HitTarget};
pub use links::LinkRegistry;
pub use message::{render_error, render_message};
pub use modal::DetailModal;
pub use renderer::{
    AggregateKind, AggregateRenderer, Capabilities, render_aggregate, select_aggregate_renderer,
};
pub use style::{Rgb, Style, StyleFlags};
pub use text::truncate_with_ellipsis;
