#![forbid(unsafe_code)]

//! Graph model derived from a dataset.
//!
//! One hub node per category, followed by up to `samples_per_category` leaf
//! nodes per category, each leaf linked to its hub. Node order is stable:
//! hubs in dataset order, then each category's samples in member order.

use std::collections::HashMap;

use marklens_core::Dataset;

/// Radius of a sample leaf.
pub const SAMPLE_RADIUS: f64 = 6.0;

/// Hub radius for a category with `count` members: `clamp(sqrt(count) * 3, 15, 40)`.
#[must_use]
pub fn category_radius(count: usize) -> f64 {
    ((count as f64).sqrt() * 3.0).clamp(15.0, 40.0)
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Category { count: usize },
    Sample { title: String, url: String },
}

/// A node with its static attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    /// Owning category; equal to `id` for hubs.
    pub category: String,
    pub kind: NodeKind,
    pub radius: f64,
}

impl GraphNode {
    #[must_use]
    pub fn is_category(&self) -> bool {
        matches!(self.kind, NodeKind::Category { .. })
    }
}

/// Undirected spring between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
}

/// Nodes and links for the aggregate graph.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    index: HashMap<String, usize>,
    total_bookmarks: usize,
}

impl GraphModel {
    /// Build the graph for `dataset`.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset, samples_per_category: usize) -> Self {
        let mut model = Self {
            total_bookmarks: dataset.total_bookmarks,
            ..Self::default()
        };

        for category in &dataset.clusters {
            model.push(GraphNode {
                id: category.name.clone(),
                category: category.name.clone(),
                kind: NodeKind::Category {
                    count: category.count,
                },
                radius: category_radius(category.count),
            });
        }

        for (hub, category) in dataset.clusters.iter().enumerate() {
            for (i, sample) in category.samples(samples_per_category).iter().enumerate() {
                let idx = model.push(GraphNode {
                    id: format!("{}-bookmark-{i}", category.name),
                    category: category.name.clone(),
                    kind: NodeKind::Sample {
                        title: sample.title.clone(),
                        url: sample.url.clone(),
                    },
                    radius: SAMPLE_RADIUS,
                });
                model.links.push(GraphLink {
                    source: hub,
                    target: idx,
                });
            }
        }

        model
    }

    fn push(&mut self, node: GraphNode) -> usize {
        let idx = self.nodes.len();
        // Hubs are pushed first and keep their id when a sample id repeats it.
        self.index.entry(node.id.clone()).or_insert(idx);
        self.nodes.push(node);
        idx
    }

    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }

    /// First node with `id`. Sample ids are not unique across categories
    /// (`"X-bookmark-0"` may also name a category), so anything that must
    /// address one exact node uses its index.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Number of hub nodes.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_category()).count()
    }

    /// Bookmarks in the source dataset (not the number of sample nodes).
    #[must_use]
    pub fn total_bookmarks(&self) -> usize {
        self.total_bookmarks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `"Network Graph: C Categories, B Bookmarks"`.
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "Network Graph: {} Categories, {} Bookmarks",
            self.category_count(),
            self.total_bookmarks
        )
    }
}
