#![forbid(unsafe_code)]

//! Core: bookmark dataset model, loading, filter derivation, and the view
//! controller.
//!
//! # Role in marklens
//! `marklens-core` owns everything that is independent of presentation. The
//! render crate reads the controller's derived state; the binary feeds it
//! user input and load completions.
//!
//! # Key Components
//!
//! - [`Dataset`] / [`Category`] / [`BookmarkRecord`] - the loaded data
//! - [`filter`](filter::filter) - pure derivation of the visible list
//! - [`Debouncer`] - cancellable latest-wins timer with injected time
//! - [`Controller`] - owns the dataset and [`ViewState`], recomputes on demand

pub mod controller;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod load;
pub mod model;
pub mod palette;

pub use controller::{CategoryDetail, Controller, LoadState};
pub use debounce::{DEFAULT_SEARCH_DEBOUNCE, DebounceStats, Debouncer};
pub use error::{LoadError, RenderError};
pub use filter::{CategorySelection, ViewState};
pub use load::{DEFAULT_DATA_PATH, load_from_path, load_from_reader, parse_dataset};
pub use model::{BookmarkRecord, Category, Dataset};
