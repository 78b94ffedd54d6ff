#![forbid(unsafe_code)]

//! Bookmark view controller.
//!
//! Owns the loaded [`Dataset`], the current [`ViewState`], the search box
//! contents, and the search [`Debouncer`]. The filtered list is cached as
//! indices into the current base list and only recomputed when the
//! committed state changes.
//!
//! # State machine
//!
//! ```text
//! Pending --finish_load(Ok)--> Ready
//! Pending --finish_load(Err)-> Failed
//! ```
//!
//! Every input operation is a no-op unless the controller is `Ready`.
//!
//! # Search
//!
//! Typing updates the visible input immediately ([`Controller::input`]) but
//! the committed [`ViewState::search_term`] only changes when the debounce
//! window elapses ([`Controller::tick_at`]). Selecting a category clears both
//! and cancels the pending commit.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::debounce::{DEFAULT_SEARCH_DEBOUNCE, Debouncer};
use crate::error::LoadError;
use crate::filter::{CategorySelection, ViewState, base_records, filter_indices};
use crate::model::{BookmarkRecord, Category, Dataset};

/// Lifecycle of the dataset.
#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready(Dataset),
    Failed(LoadError),
}

/// Everything the detail modal shows for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryDetail<'a> {
    pub category: &'a Category,
    /// `count / total_bookmarks`.
    pub share: f64,
}

impl<'a> CategoryDetail<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.category.name
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.category.count
    }

    /// Share as a percentage with one decimal, e.g. `"42.9"`.
    #[must_use]
    pub fn percent_label(&self) -> String {
        format!("{:.1}", self.share * 100.0)
    }

    /// `"N bookmarks (P% of total)"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} bookmarks ({}% of total)",
            self.count(),
            self.percent_label()
        )
    }

    /// Members paired with their one-based position.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &'a BookmarkRecord)> + 'a {
        self.category
            .bookmarks
            .iter()
            .enumerate()
            .map(|(i, b)| (i + 1, b))
    }
}

/// View controller.
#[derive(Debug)]
pub struct Controller {
    load: LoadState,
    state: ViewState,
    input: String,
    debounce: Debouncer<String>,
    filtered: Vec<usize>,
    recomputes: u64,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl Controller {
    /// A controller waiting for its dataset.
    #[must_use]
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            load: LoadState::Pending,
            state: ViewState::default(),
            input: String::new(),
            debounce: Debouncer::new(debounce_window),
            filtered: Vec::new(),
            recomputes: 0,
        }
    }

    /// Accept the outcome of the background load.
    ///
    /// Ignored unless the controller is still `Pending`.
    pub fn finish_load(&mut self, result: Result<Dataset, LoadError>) {
        if !matches!(self.load, LoadState::Pending) {
            warn!("load completion arrived twice; ignoring");
            return;
        }
        match result {
            Ok(dataset) => {
                self.load = LoadState::Ready(dataset);
                self.state = ViewState::default();
                self.input.clear();
                self.debounce.cancel();
                self.recompute();
            }
            Err(err) => {
                warn!(error = %err, "dataset load failed");
                self.load = LoadState::Failed(err);
            }
        }
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.load {
            LoadState::Ready(ds) => Some(ds),
            _ => None,
        }
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.load {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.load, LoadState::Ready(_))
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The search box as typed, which may be ahead of the committed term.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Search text waiting for the debounce window.
    #[must_use]
    pub fn pending_search(&self) -> Option<&str> {
        self.debounce.pending().map(String::as_str)
    }

    /// Select a category; clears the search and any pending commit.
    pub fn select_category(&mut self, selection: CategorySelection) {
        if !self.is_ready() {
            return;
        }
        debug!(selection = %selection, "category selected");
        self.state.selected = selection;
        self.state.search_term.clear();
        self.input.clear();
        self.debounce.cancel();
        self.recompute();
    }

    /// Record a change to the search box typed at `now`.
    pub fn search_input_at(&mut self, text: impl Into<String>, now: Instant) {
        if !self.is_ready() {
            return;
        }
        let text = text.into();
        self.input.clone_from(&text);
        self.debounce.arm_at(text, now);
    }

    /// Commit the pending search if its window has elapsed.
    ///
    /// Returns `true` when a recompute happened.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if !self.is_ready() {
            return false;
        }
        match self.debounce.tick_at(now) {
            Some(term) => {
                self.state.search_term = term;
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Time until the pending search commits.
    #[must_use]
    pub fn time_until_commit(&self, now: Instant) -> Option<Duration> {
        self.debounce.time_until_fire(now)
    }

    /// Cached indices into the base list for the current selection.
    #[must_use]
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    /// The visible records, in order.
    #[must_use]
    pub fn filtered_records(&self) -> Vec<&BookmarkRecord> {
        let Some(ds) = self.dataset() else {
            return Vec::new();
        };
        let base = base_records(ds, &self.state.selected);
        self.filtered.iter().filter_map(|&i| base.get(i)).collect()
    }

    /// `"Showing N bookmarks in <category>"`.
    #[must_use]
    pub fn status_line(&self) -> String {
        let scope = match &self.state.selected {
            CategorySelection::All => "all categories",
            CategorySelection::Named(name) => name.as_str(),
        };
        format!("Showing {} bookmarks in {scope}", self.filtered.len())
    }

    /// Modal data for a category.
    #[must_use]
    pub fn category_detail(&self, name: &str) -> Option<CategoryDetail<'_>> {
        let ds = self.dataset()?;
        let category = ds.category(name)?;
        Some(CategoryDetail {
            category,
            share: ds.category_share(category),
        })
    }

    /// How many times the filtered list has been derived.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    fn recompute(&mut self) {
        let Some(ds) = self.dataset() else {
            return;
        };
        self.filtered = filter_indices(ds, &self.state);
        self.recomputes += 1;
        debug!(
            visible = self.filtered.len(),
            term = %self.state.search_term,
            "filter recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            BookmarkRecord::new("Rust Book", "https://doc.rust-lang.org/book", "doc.rust-lang.org", "Rust"),
            BookmarkRecord::new("Clippy", "https://github.com/rust-lang/rust-clippy", "github.com", "Rust"),
            BookmarkRecord::new("Flask", "https://flask.palletsprojects.com", "flask.palletsprojects.com", "Python"),
        ])
    }

    fn ready() -> Controller {
        let mut c = Controller::default();
        c.finish_load(Ok(dataset()));
        c
    }

    #[test]
    fn pending_controller_is_inert() {
        let mut c = Controller::default();
        let t0 = Instant::now();
        c.select_category(CategorySelection::parse("Rust"));
        c.search_input_at("x", t0);
        assert!(!c.tick_at(t0 + ms(1000)));
        assert_eq!(c.recompute_count(), 0);
        assert!(c.filtered_records().is_empty());
    }

    #[test]
    fn failed_load_is_inert() {
        let mut c = Controller::default();
        c.finish_load(Err(LoadError::Invalid("bad".into())));
        assert!(c.load_error().is_some());
        c.select_category(CategorySelection::All);
        assert_eq!(c.recompute_count(), 0);
    }

    #[test]
    fn load_resets_and_shows_everything() {
        let c = ready();
        assert_eq!(c.state(), &ViewState::default());
        assert_eq!(c.filtered().len(), 3);
        assert_eq!(c.status_line(), "Showing 3 bookmarks in all categories");
        assert_eq!(c.recompute_count(), 1);
    }

    #[test]
    fn second_completion_is_ignored() {
        let mut c = ready();
        c.finish_load(Ok(Dataset::empty()));
        assert_eq!(c.filtered().len(), 3);
    }

    #[test]
    fn select_category_clears_search() {
        let mut c = ready();
        let t0 = Instant::now();
        c.search_input_at("flask", t0);
        assert!(c.tick_at(t0 + ms(300)));
        assert_eq!(c.filtered().len(), 1);

        c.search_input_at("fla", t0 + ms(400));
        c.select_category(CategorySelection::parse("Rust"));
        assert_eq!(c.input(), "");
        assert_eq!(c.state().search_term, "");
        assert!(c.pending_search().is_none());
        assert!(!c.tick_at(t0 + ms(2000)));
        assert_eq!(c.status_line(), "Showing 2 bookmarks in Rust");
    }

    #[test]
    fn debounced_search_recomputes_once() {
        let mut c = ready();
        let t0 = Instant::now();
        let base = c.recompute_count();

        for (offset, text) in [(0, "c"), (50, "cl"), (100, "cli"), (140, "clip")] {
            c.search_input_at(text, t0 + ms(offset));
            assert!(!c.tick_at(t0 + ms(offset)));
        }
        assert_eq!(c.input(), "clip");
        assert_eq!(c.state().search_term, "");
        assert!(!c.tick_at(t0 + ms(439)));
        assert!(c.tick_at(t0 + ms(440)));
        assert_eq!(c.recompute_count(), base + 1);
        assert_eq!(c.state().search_term, "clip");
        let titles: Vec<&str> = c.filtered_records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Clippy"]);
    }

    #[test]
    fn unknown_category_shows_nothing() {
        let mut c = ready();
        c.select_category(CategorySelection::parse("Haskell"));
        assert!(c.filtered().is_empty());
        assert_eq!(c.status_line(), "Showing 0 bookmarks in Haskell");
    }

    #[test]
    fn detail_numbers_members() {
        let c = ready();
        let detail = c.category_detail("Rust").unwrap();
        assert_eq!(detail.summary(), "2 bookmarks (66.7% of total)");
        let numbered: Vec<(usize, &str)> = detail
            .numbered()
            .map(|(n, b)| (n, b.title.as_str()))
            .collect();
        assert_eq!(numbered, [(1, "Rust Book"), (2, "Clippy")]);
        assert!(c.category_detail("Nope").is_none());
    }
}
