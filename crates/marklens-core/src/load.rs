#![forbid(unsafe_code)]

//! Dataset loading.
//!
//! Every entry point parses, then validates. A dataset that parses but breaks
//! an invariant is rejected as [`LoadError::Invalid`] so that nothing
//! downstream has to re-check counts.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info, info_span};

use crate::error::LoadError;
use crate::model::Dataset;

/// Relative path read when no override is configured.
pub const DEFAULT_DATA_PATH: &str = "bookmarks_data.json";

/// Read and validate a dataset from disk.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let _span = info_span!("load", path = %path.display()).entered();
    let file = File::open(path)?;
    let dataset = load_from_reader(BufReader::new(file))?;
    info!(
        bookmarks = dataset.total_bookmarks,
        categories = dataset.total_clusters,
        "dataset loaded"
    );
    Ok(dataset)
}

/// Read and validate a dataset from any reader.
pub fn load_from_reader(reader: impl Read) -> Result<Dataset, LoadError> {
    let dataset: Dataset = serde_json::from_reader(reader)?;
    dataset.validate()?;
    Ok(dataset)
}

/// Parse and validate a dataset held in memory.
pub fn parse_dataset(text: &str) -> Result<Dataset, LoadError> {
    let dataset: Dataset = serde_json::from_str(text)?;
    dataset.validate()?;
    debug!(bookmarks = dataset.total_bookmarks, "dataset parsed");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "total_bookmarks": 2,
        "total_clusters": 1,
        "clusters": [
            {
                "name": "Rust",
                "count": 2,
                "bookmarks": [
                    {"title": "The Book", "url": "https://doc.rust-lang.org/book/", "domain": "doc.rust-lang.org", "cluster": "Rust"},
                    {"title": "Crates", "url": "https://crates.io", "domain": "crates.io", "cluster": "Rust"}
                ]
            }
        ],
        "all_bookmarks": [
            {"title": "The Book", "url": "https://doc.rust-lang.org/book/", "domain": "doc.rust-lang.org", "cluster": "Rust"},
            {"title": "Crates", "url": "https://crates.io", "domain": "crates.io", "cluster": "Rust"}
        ]
    }"#;

    #[test]
    fn parses_valid_payload() {
        let ds = parse_dataset(SAMPLE).unwrap();
        assert_eq!(ds.total_bookmarks, 2);
        assert_eq!(ds.clusters[0].name, "Rust");
    }

    #[test]
    fn reader_and_str_agree() {
        let a = parse_dataset(SAMPLE).unwrap();
        let b = load_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_dataset("{\"total_bookmarks\": ").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn missing_field_is_parse_error() {
        let err = parse_dataset(r#"{"total_bookmarks": 0, "clusters": []}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn count_mismatch_is_invalid() {
        let broken = SAMPLE.replace("\"count\": 2", "\"count\": 3");
        let err = parse_dataset(&broken).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn category_listing_other_records_is_invalid() {
        // Same count and cluster name, different member.
        let broken = SAMPLE.replacen("\"title\": \"Crates\"", "\"title\": \"Cargo\"", 1);
        let err = parse_dataset(&broken).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
        assert!(err.to_string().contains("Cargo"), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_path("/definitely/not/here/bookmarks_data.json").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
