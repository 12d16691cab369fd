use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::AppRecord;

/// Fetches the raw listing page for a storefront identifier.
///
/// Implementations perform exactly one outbound request per call; retrying
/// is layered on top by [`RetryingFetcher`](crate::retry::RetryingFetcher).
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, identifier: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Turns a listing page into a normalized record.
pub trait Extractor: Send + Sync + Clone {
    /// Parses `html` and resolves every field.
    ///
    /// `identifier` is the id that was requested; it is used as the last
    /// fallback for the record's own identifier.
    fn extract(&self, identifier: &str, html: &str) -> Result<AppRecord, AppError>;
}

/// Source of wall-clock time, injectable so cache expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
