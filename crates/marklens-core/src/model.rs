#![forbid(unsafe_code)]

//! Bookmark dataset types.
//!
//! The on-disk shape is a single JSON object:
//!
//! ```json
//! {
//!   "total_bookmarks": 2,
//!   "total_clusters": 1,
//!   "clusters": [{ "name": "Rust", "count": 2, "bookmarks": [ ... ] }],
//!   "all_bookmarks": [ ... ]
//! }
//! ```
//!
//! # Invariants
//!
//! 1. `total_bookmarks == all_bookmarks.len()`
//! 2. `total_clusters == clusters.len()`
//! 3. `category.count == category.bookmarks.len()` for every category
//! 4. Every record in `all_bookmarks` belongs to the category named by its
//!    `cluster` field, and every category member carries that name
//! 5. The category members, taken together, are exactly `all_bookmarks`
//!    (as a multiset; order may differ)
//!
//! [`Dataset::validate`] checks all five. A dataset is read-only once loaded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// A single bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub title: String,
    pub url: String,
    pub domain: String,
    /// Name of the category this record belongs to.
    pub cluster: String,
}

impl BookmarkRecord {
    /// Create a record.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        domain: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            domain: domain.into(),
            cluster: cluster.into(),
        }
    }
}

/// A named group of bookmarks sharing a classification label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Number of member records; always equals `bookmarks.len()`.
    pub count: usize,
    pub bookmarks: Vec<BookmarkRecord>,
}

impl Category {
    /// Build a category from its members, deriving `count`.
    #[must_use]
    pub fn new(name: impl Into<String>, bookmarks: Vec<BookmarkRecord>) -> Self {
        Self {
            name: name.into(),
            count: bookmarks.len(),
            bookmarks,
        }
    }

    /// First `n` members, in dataset order.
    #[must_use]
    pub fn samples(&self, n: usize) -> &[BookmarkRecord] {
        &self.bookmarks[..self.bookmarks.len().min(n)]
    }
}

/// The full loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub all_bookmarks: Vec<BookmarkRecord>,
    pub clusters: Vec<Category>,
    pub total_bookmarks: usize,
    pub total_clusters: usize,
}

impl Dataset {
    /// Group records by their `cluster` field.
    ///
    /// Members keep first-seen order. Categories are sorted by descending
    /// `count`; the sort is stable, so ties keep first-seen order.
    #[must_use]
    pub fn from_records(records: Vec<BookmarkRecord>) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<BookmarkRecord>> = HashMap::new();

        for record in &records {
            let members = groups.entry(record.cluster.clone()).or_insert_with(|| {
                order.push(record.cluster.clone());
                Vec::new()
            });
            members.push(record.clone());
        }

        let mut clusters: Vec<Category> = order
            .into_iter()
            .map(|name| {
                let members = groups.remove(&name).unwrap_or_default();
                Category::new(name, members)
            })
            .collect();
        clusters.sort_by(|a, b| b.count.cmp(&a.count));

        Self {
            total_bookmarks: records.len(),
            total_clusters: clusters.len(),
            all_bookmarks: records,
            clusters,
        }
    }

    /// An empty dataset.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_records(Vec::new())
    }

    /// Look up a category by exact name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.clusters.iter().find(|c| c.name == name)
    }

    /// Fraction of all bookmarks that belong to `category`, in `[0, 1]`.
    #[must_use]
    pub fn category_share(&self, category: &Category) -> f64 {
        if self.total_bookmarks == 0 {
            0.0
        } else {
            category.count as f64 / self.total_bookmarks as f64
        }
    }

    /// Sum of all category counts.
    #[must_use]
    pub fn count_sum(&self) -> usize {
        self.clusters.iter().map(|c| c.count).sum()
    }

    /// Check the dataset invariants listed in the module docs.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.total_bookmarks != self.all_bookmarks.len() {
            return Err(LoadError::Invalid(format!(
                "total_bookmarks is {} but all_bookmarks has {} entries",
                self.total_bookmarks,
                self.all_bookmarks.len()
            )));
        }
        if self.total_clusters != self.clusters.len() {
            return Err(LoadError::Invalid(format!(
                "total_clusters is {} but clusters has {} entries",
                self.total_clusters,
                self.clusters.len()
            )));
        }

        let mut names: HashMap<&str, usize> = HashMap::with_capacity(self.clusters.len());
        for (idx, category) in self.clusters.iter().enumerate() {
            if category.count != category.bookmarks.len() {
                return Err(LoadError::Invalid(format!(
                    "category {:?} declares count {} but lists {} bookmarks",
                    category.name,
                    category.count,
                    category.bookmarks.len()
                )));
            }
            if names.insert(category.name.as_str(), idx).is_some() {
                return Err(LoadError::Invalid(format!(
                    "category {:?} appears more than once",
                    category.name
                )));
            }
            if let Some(stray) = category.bookmarks.iter().find(|b| b.cluster != category.name) {
                return Err(LoadError::Invalid(format!(
                    "bookmark {:?} is listed under {:?} but names cluster {:?}",
                    stray.title, category.name, stray.cluster
                )));
            }
        }

        if let Some(orphan) = self
            .all_bookmarks
            .iter()
            .find(|b| !names.contains_key(b.cluster.as_str()))
        {
            return Err(LoadError::Invalid(format!(
                "bookmark {:?} names unknown cluster {:?}",
                orphan.title, orphan.cluster
            )));
        }

        // Members minus all_bookmarks must come out empty in both directions.
        let mut balance: HashMap<RecordKey<'_>, isize> = HashMap::new();
        for member in self.clusters.iter().flat_map(|c| &c.bookmarks) {
            *balance.entry(RecordKey::of(member)).or_default() += 1;
        }
        for record in &self.all_bookmarks {
            *balance.entry(RecordKey::of(record)).or_default() -= 1;
        }
        let unbalanced = |r: &&BookmarkRecord| balance.get(&RecordKey::of(r)).is_some_and(|d| *d != 0);
        let extra = self.clusters.iter().flat_map(|c| &c.bookmarks).find(unbalanced);
        if let Some(record) = extra.or_else(|| self.all_bookmarks.iter().find(unbalanced)) {
            return Err(LoadError::Invalid(format!(
                "bookmark {:?} ({}) is not listed the same number of times in \
                 all_bookmarks and in category {:?}",
                record.title, record.url, record.cluster
            )));
        }

        Ok(())
    }
}

// Identity of a record for the partition check.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RecordKey<'a> {
    title: &'a str,
    url: &'a str,
    domain: &'a str,
    cluster: &'a str,
}

impl<'a> RecordKey<'a> {
    fn of(record: &'a BookmarkRecord) -> Self {
        Self {
            title: &record.title,
            url: &record.url,
            domain: &record.domain,
            cluster: &record.cluster,
        }
    }
}
