//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::AppError;
use crate::models::{AppRecord, NOT_AVAILABLE};
use crate::traits::{Clock, Extractor, Fetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns queued responses and records every call.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times `fetch` has been called.
    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    /// Identifiers passed to `fetch`, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, identifier: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(identifier.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Mock extractor that returns queued records.
#[derive(Clone)]
pub struct MockExtractor {
    responses: Arc<Mutex<Vec<Result<AppRecord, AppError>>>>,
}

impl MockExtractor {
    pub fn new(record: AppRecord) -> Self {
        Self::with_responses(vec![Ok(record)])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<AppRecord, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, identifier: &str, _html: &str) -> Result<AppRecord, AppError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(make_test_record(identifier, "Default App"))
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc::now())),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a minimal, fully populated record.
pub fn make_test_record(identifier: &str, title: &str) -> AppRecord {
    AppRecord {
        identifier: identifier.to_string(),
        title: title.to_string(),
        icon: "https://play-lh.googleusercontent.com/icon".to_string(),
        developer: "Test Developer".to_string(),
        developer_email: Some("dev@example.com".to_string()),
        developer_website: None,
        category: "Tools".to_string(),
        rating: 4.2,
        rating_count: 1000,
        installs: "10K+".to_string(),
        free: true,
        ad_supported: false,
        in_app_purchases: false,
        last_updated: "Jan 1, 2026".to_string(),
        current_version: "1.0.0".to_string(),
        min_platform_version: NOT_AVAILABLE.to_string(),
        summary: "A test app".to_string(),
        description: "A test app used in unit tests".to_string(),
        screenshots: vec![],
    }
}
