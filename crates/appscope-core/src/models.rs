use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

/// Placeholder for textual fields no extraction tier could resolve.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a missing long description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Upper bound on collected screenshot URLs.
pub const MAX_SCREENSHOTS: usize = 5;

/// A normalized storefront listing.
///
/// Always whole: `title` is non-empty and every other text field carries
/// either a real value or a sentinel ([`NOT_AVAILABLE`], [`NO_DESCRIPTION`]).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AppRecord {
    /// Storefront package id (e.g. `com.example.app`)
    pub identifier: String,
    pub title: String,
    pub icon: String,
    pub developer: String,
    pub developer_email: Option<String>,
    pub developer_website: Option<String>,
    pub category: String,
    /// Average rating, 0.0 when unknown
    pub rating: f64,
    /// Number of ratings, 0 when unknown
    pub rating_count: u64,
    /// Free-text install descriptor such as "50M+"
    pub installs: String,
    pub free: bool,
    pub ad_supported: bool,
    pub in_app_purchases: bool,
    pub last_updated: String,
    pub current_version: String,
    pub min_platform_version: String,
    pub summary: String,
    pub description: String,
    /// Deduplicated, insertion-ordered, at most [`MAX_SCREENSHOTS`]
    pub screenshots: Vec<String>,
}

/// Field values gathered by the extraction chain before normalization.
///
/// Everything is optional here; the normalizer decides what an absent
/// value becomes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    pub identifier: Option<String>,
    pub icon: Option<String>,
    pub developer: Option<String>,
    pub developer_email: Option<String>,
    pub developer_website: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub installs: Option<String>,
    pub free: bool,
    pub ad_supported: bool,
    pub in_app_purchases: bool,
    pub last_updated: Option<String>,
    pub current_version: Option<String>,
    pub min_platform_version: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub screenshots: Vec<String>,
}

/// Where a lookup's record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Cache,
    Fresh,
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupSource::Cache => write!(f, "cache"),
            LookupSource::Fresh => write!(f, "fresh"),
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub record: Arc<AppRecord>,
    pub source: LookupSource,
    /// SHA-256 of the fetched page body; `None` when served from cache
    pub page_hash: Option<String>,
}

impl Lookup {
    pub fn from_cache(&self) -> bool {
        self.source == LookupSource::Cache
    }
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
