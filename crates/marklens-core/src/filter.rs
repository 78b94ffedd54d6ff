#![forbid(unsafe_code)]

//! Filter derivation.
//!
//! The visible list is a pure function of the dataset and a [`ViewState`]:
//!
//! 1. Base list: every bookmark for [`CategorySelection::All`], otherwise the
//!    named category's members. An unknown name gives an empty base.
//! 2. Empty search term: the base list, in order.
//! 3. Otherwise: records whose lowercased title, url, or cluster contains the
//!    lowercased term. Order is preserved.

use std::fmt;

use crate::model::{BookmarkRecord, Dataset};

/// Which category the sidebar has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategorySelection {
    #[default]
    All,
    Named(String),
}

impl CategorySelection {
    /// Parse a selection key; `"all"` is the sentinel for every category.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        if key == "all" {
            Self::All
        } else {
            Self::Named(key.to_string())
        }
    }

    /// The category name, if one is selected.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name),
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Selection plus committed search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selected: CategorySelection,
    pub search_term: String,
}

impl ViewState {
    #[must_use]
    pub fn new(selected: CategorySelection, search_term: impl Into<String>) -> Self {
        Self {
            selected,
            search_term: search_term.into(),
        }
    }
}

/// Whether `record` matches an already-lowercased search term.
#[must_use]
pub fn matches_term(record: &BookmarkRecord, lowered_term: &str) -> bool {
    record.title.to_lowercase().contains(lowered_term)
        || record.url.to_lowercase().contains(lowered_term)
        || record.cluster.to_lowercase().contains(lowered_term)
}

fn base<'a>(dataset: &'a Dataset, selected: &CategorySelection) -> &'a [BookmarkRecord] {
    match selected {
        CategorySelection::All => &dataset.all_bookmarks,
        CategorySelection::Named(name) => dataset
            .category(name)
            .map(|c| c.bookmarks.as_slice())
            .unwrap_or(&[]),
    }
}

/// Derive the visible records for `state`.
#[must_use]
pub fn filter<'a>(dataset: &'a Dataset, state: &ViewState) -> Vec<&'a BookmarkRecord> {
    let base = base(dataset, &state.selected);
    if state.search_term.is_empty() {
        return base.iter().collect();
    }
    let term = state.search_term.to_lowercase();
    base.iter().filter(|r| matches_term(r, &term)).collect()
}

/// Like [`filter`] but yields indices into the base list, which is what the
/// controller caches.
#[must_use]
pub fn filter_indices(dataset: &Dataset, state: &ViewState) -> Vec<usize> {
    let base = base(dataset, &state.selected);
    if state.search_term.is_empty() {
        return (0..base.len()).collect();
    }
    let term = state.search_term.to_lowercase();
    base.iter()
        .enumerate()
        .filter(|(_, r)| matches_term(r, &term))
        .map(|(i, _)| i)
        .collect()
}

/// The base list `filter_indices` indexes into.
#[must_use]
pub fn base_records<'a>(dataset: &'a Dataset, selected: &CategorySelection) -> &'a [BookmarkRecord] {
    base(dataset, selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            BookmarkRecord::new("Tokio Tutorial", "https://tokio.rs/tokio/tutorial", "tokio.rs", "Rust"),
            BookmarkRecord::new("Serde", "https://serde.rs", "serde.rs", "Rust"),
            BookmarkRecord::new("Django", "https://djangoproject.com", "djangoproject.com", "Python"),
            BookmarkRecord::new("Rustacean Station", "https://rustacean-station.org", "rustacean-station.org", "Podcasts"),
        ])
    }

    fn titles(records: &[&BookmarkRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn all_with_empty_term_is_everything() {
        let ds = dataset();
        let out = filter(&ds, &ViewState::default());
        assert_eq!(out.len(), ds.all_bookmarks.len());
        assert!(out.iter().zip(&ds.all_bookmarks).all(|(a, b)| *a == b));
    }

    #[test]
    fn named_category_with_empty_term() {
        let ds = dataset();
        let out = filter(&ds, &ViewState::new(CategorySelection::parse("Rust"), ""));
        assert_eq!(titles(&out), ["Tokio Tutorial", "Serde"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_url_cluster() {
        let ds = dataset();
        let out = filter(&ds, &ViewState::new(CategorySelection::All, "RUST"));
        // "Rust" cluster twice, title "Rustacean Station" once.
        assert_eq!(
            titles(&out),
            ["Tokio Tutorial", "Serde", "Rustacean Station"]
        );

        let by_url = filter(&ds, &ViewState::new(CategorySelection::All, "djangoproject"));
        assert_eq!(titles(&by_url), ["Django"]);
    }

    #[test]
    fn rust_guide_matches_on_each_field() {
        let ds = Dataset::from_records(vec![
            BookmarkRecord::new("Rust Guide", "https://rust-lang.org", "rust-lang.org", "Rust"),
            BookmarkRecord::new("Flask", "https://flask.palletsprojects.com", "flask.palletsprojects.com", "Web"),
        ]);
        for term in ["GUIDE", "rust-lang", "rust"] {
            let out = filter(&ds, &ViewState::new(CategorySelection::All, term));
            assert_eq!(titles(&out), ["Rust Guide"], "term {term:?}");
        }
        let out = filter(&ds, &ViewState::new(CategorySelection::All, "python"));
        assert!(out.is_empty());
    }

    #[test]
    fn search_within_category() {
        let ds = dataset();
        let out = filter(&ds, &ViewState::new(CategorySelection::parse("Rust"), "tok"));
        assert_eq!(titles(&out), ["Tokio Tutorial"]);
    }

    #[test]
    fn unknown_category_is_empty() {
        let ds = dataset();
        let out = filter(&ds, &ViewState::new(CategorySelection::parse("Nope"), ""));
        assert!(out.is_empty());
    }

    #[test]
    fn no_tokenization() {
        let ds = dataset();
        let out = filter(&ds, &ViewState::new(CategorySelection::All, "tokio serde"));
        assert!(out.is_empty());
    }

    #[test]
    fn indices_agree_with_records() {
        let ds = dataset();
        let state = ViewState::new(CategorySelection::All, "s");
        let base = base_records(&ds, &state.selected);
        let via_idx: Vec<&BookmarkRecord> =
            filter_indices(&ds, &state).into_iter().map(|i| &base[i]).collect();
        assert_eq!(via_idx, filter(&ds, &state));
    }

    #[test]
    fn all_sentinel_parses() {
        assert_eq!(CategorySelection::parse("all"), CategorySelection::All);
        assert_eq!(
            CategorySelection::parse("All"),
            CategorySelection::Named("All".into())
        );
        assert_eq!(CategorySelection::All.to_string(), "all");
    }
}
