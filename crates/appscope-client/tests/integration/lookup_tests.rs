use std::sync::Arc;
use std::time::Duration;

use appscope_client::ListingExtractor;
use appscope_core::error::{AppError, ExtractionFailure};
use appscope_core::testutil::MockFetcher;
use appscope_core::{LookupService, RecordCache, RetryPolicy};

use crate::integration::common::fixture;

fn service(fetcher: MockFetcher) -> LookupService<MockFetcher, ListingExtractor> {
    LookupService::new(
        fetcher,
        ListingExtractor::new(),
        Arc::new(RecordCache::default()),
        RetryPolicy::new(3, Duration::from_secs(1)),
    )
}

#[tokio::test]
async fn test_lookup_extracts_then_serves_from_cache() -> anyhow::Result<()> {
    let fetcher = MockFetcher::new(&fixture("sample_listing.html"));
    let svc = service(fetcher.clone());

    let fresh = svc.lookup("com.sample.app").await?;
    assert!(!fresh.from_cache());
    assert_eq!(fresh.record.title, "Sample App");
    assert_eq!(fresh.page_hash.as_ref().map(String::len), Some(64));

    let cached = svc.lookup("com.sample.app").await?;
    assert!(cached.from_cache());
    assert!(Arc::ptr_eq(&fresh.record, &cached.record));
    assert_eq!(fetcher.calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() -> anyhow::Result<()> {
    let fetcher = MockFetcher::with_responses(vec![
        Err(AppError::Timeout(3)),
        Err(AppError::HttpError("HTTP 503".into())),
        Ok(fixture("sample_listing.html")),
    ]);
    let svc = service(fetcher.clone());

    let lookup = svc.lookup("com.sample.app").await?;
    assert_eq!(lookup.record.rating_count, 1200);
    assert_eq!(fetcher.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_missing_listing_is_not_cached() {
    let fetcher = MockFetcher::with_responses(vec![
        Ok(fixture("no_title.html")),
        Ok(fixture("no_title.html")),
    ]);
    let svc = service(fetcher.clone());

    for _ in 0..2 {
        let err = svc.lookup("com.missing.app").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionFailure::NotFound)
        ));
    }
    assert_eq!(fetcher.calls(), 2);
    assert!(svc.cache().is_empty());
}

#[tokio::test]
async fn test_blocked_page_is_not_retried() {
    let fetcher = MockFetcher::new(&fixture("captcha.html"));
    let svc = service(fetcher.clone());

    let err = svc.lookup("com.sample.app").await.unwrap_err();
    assert!(matches!(err, AppError::Extraction(ExtractionFailure::Blocked)));
    assert_eq!(fetcher.calls(), 1);
    assert!(svc.cache().is_empty());
}
