use std::sync::Arc;

use crate::cache::RecordCache;
use crate::error::AppError;
use crate::identifier;
use crate::models::{Lookup, LookupSource, compute_hash};
use crate::retry::{RetryPolicy, RetryingFetcher};
use crate::traits::{Extractor, Fetcher};

/// Orchestrates a single listing lookup: validate → cache → fetch (with retry) → extract → cache.
///
/// Generic over the fetcher and extractor so tests can run the whole
/// pipeline without network access. The cache is injected, so several
/// services (or several test cases) can share or isolate it as needed.
pub struct LookupService<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    fetcher: RetryingFetcher<F>,
    extractor: E,
    cache: Arc<RecordCache>,
}

impl<F, E> LookupService<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    pub fn new(fetcher: F, extractor: E, cache: Arc<RecordCache>, retry: RetryPolicy) -> Self {
        Self {
            fetcher: RetryingFetcher::new(fetcher, retry),
            extractor,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    /// Look up one listing by identifier.
    ///
    /// 1. Validate the identifier's shape
    /// 2. Serve from cache if a fresh entry exists
    /// 3. Fetch the page, retrying transient failures
    /// 4. Extract and normalize the record
    /// 5. Cache it
    ///
    /// Nothing is cached on error, and no partial record is ever returned.
    pub async fn lookup(&self, raw_identifier: &str) -> Result<Lookup, AppError> {
        // 1. Validate
        let identifier = identifier::validate(raw_identifier)?;

        // 2. Cache
        if let Some(record) = self.cache.get(&identifier) {
            tracing::info!(%identifier, source = %LookupSource::Cache, "Lookup complete");
            return Ok(Lookup {
                record,
                source: LookupSource::Cache,
                page_hash: None,
            });
        }
        tracing::debug!(%identifier, "Cache miss");

        // 3. Fetch
        let html = self.fetcher.fetch(&identifier).await?;
        let page_hash = compute_hash(&html);
        tracing::debug!(
            %identifier,
            bytes = html.len(),
            page_hash = %&page_hash[..8],
            "Fetched listing page"
        );

        // 4. Extract
        let record = match self.extractor.extract(&identifier, &html) {
            Ok(record) => Arc::new(record),
            Err(e) => {
                tracing::warn!(%identifier, page_hash = %&page_hash[..8], error = %e, "Extraction failed");
                return Err(e);
            }
        };

        // 5. Cache
        self.cache.put(&identifier, Arc::clone(&record));
        tracing::info!(
            %identifier,
            source = %LookupSource::Fresh,
            title = %record.title,
            "Lookup complete"
        );

        Ok(Lookup {
            record,
            source: LookupSource::Fresh,
            page_hash: Some(page_hash),
        })
    }
}
