#![forbid(unsafe_code)]

//! OSC 8 hyperlink registry.
//!
//! Cells store a small link id; the registry owns the URLs. Id 0 means "no
//! link". Registering the same URL twice returns the same id.

use std::collections::HashMap;

/// Maps link ids to URLs for one frame.
#[derive(Debug, Clone)]
pub struct LinkRegistry {
    urls: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl Default for LinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            urls: vec![String::new()],
            lookup: HashMap::new(),
        }
    }

    /// Id for `url`, registering it if new. Empty URLs get 0.
    pub fn register(&mut self, url: &str) -> u32 {
        if url.is_empty() {
            return 0;
        }
        if let Some(&id) = self.lookup.get(url) {
            return id;
        }
        let id = self.urls.len() as u32;
        self.urls.push(url.to_string());
        self.lookup.insert(url.to_string(), id);
        id
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.urls.get(id as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.urls.truncate(1);
        self.lookup.clear();
    }
}
