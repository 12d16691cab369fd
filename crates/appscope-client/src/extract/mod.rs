//! Listing-page extraction.
//!
//! [`ListingExtractor`] parses a fetched page and resolves every record
//! field through its own ordered strategy chain (see [`chain`]), then hands
//! the draft to the normalizer. The chains themselves are declared in
//! [`plan`].

pub mod chain;
mod context;
mod dom;
mod flags;
mod media;
mod patterns;
pub mod plan;
mod structured;

use std::sync::Arc;

use appscope_core::error::{AppError, ExtractionFailure};
use appscope_core::models::AppRecord;
use appscope_core::normalize::normalize;
use appscope_core::traits::Extractor;
use scraper::Html;

pub use chain::{Field, FieldChain, Strategy, Tier};
pub use context::ExtractionContext;
pub use plan::ExtractionPlan;

/// [`Extractor`] for storefront listing HTML.
#[derive(Clone, Default)]
pub struct ListingExtractor {
    plan: Arc<ExtractionPlan>,
}

impl ListingExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(plan: ExtractionPlan) -> Self {
        Self {
            plan: Arc::new(plan),
        }
    }
}

impl Extractor for ListingExtractor {
    fn extract(&self, identifier: &str, html: &str) -> Result<AppRecord, AppError> {
        let document = Html::parse_document(html);
        let mut ctx = ExtractionContext::new(&document, identifier);

        let Some(title) = self.plan.title().resolve(&ctx) else {
            let failure = if flags::is_blocked(ctx.page_text_lower()) {
                ExtractionFailure::Blocked
            } else {
                ExtractionFailure::NotFound
            };
            tracing::debug!(identifier, %failure, "No title on listing page");
            return Err(failure.into());
        };

        self.plan.fill(&mut ctx);
        ctx.draft.screenshots = media::screenshots(&ctx);
        let flags = flags::detect(&ctx);
        ctx.draft.free = flags.free;
        ctx.draft.ad_supported = flags.ad_supported;
        ctx.draft.in_app_purchases = flags.in_app_purchases;

        let record = normalize(&title, ctx.into_draft());
        tracing::debug!(
            identifier = %record.identifier,
            title = %record.title,
            screenshots = record.screenshots.len(),
            "Listing extracted"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use appscope_core::models::{NO_DESCRIPTION, NOT_AVAILABLE};

    use super::*;

    #[test]
    fn test_minimal_page_gets_sentinels() {
        let html = "<html><body><h1><span>Tiny App</span></h1></body></html>";
        let record = ListingExtractor::new().extract("com.tiny.app", html).unwrap();

        assert_eq!(record.title, "Tiny App");
        assert_eq!(record.identifier, "com.tiny.app");
        assert_eq!(record.icon, NOT_AVAILABLE);
        assert_eq!(record.developer, NOT_AVAILABLE);
        assert_eq!(record.installs, NOT_AVAILABLE);
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.summary, NO_DESCRIPTION);
        assert_eq!(record.rating, 0.0);
        assert_eq!(record.rating_count, 0);
        assert!(record.developer_email.is_none());
        assert!(record.screenshots.is_empty());
    }

    #[test]
    fn test_missing_title_is_not_found() {
        let err = ListingExtractor::new()
            .extract("com.none.app", "<html><body><p>Nothing here</p></body></html>")
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionFailure::NotFound)
        ));
    }

    #[test]
    fn test_bare_storefront_page_is_not_found() {
        let html = r#"<html><head><meta property="og:title" content=" - Apps on Google Play"></head></html>"#;
        let err = ListingExtractor::new()
            .extract("com.none.app", html)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionFailure::NotFound)
        ));
    }

    #[test]
    fn test_interstitial_is_blocked() {
        let html = "<html><body><p>Our systems have detected unusual traffic from your computer network.</p></body></html>";
        let err = ListingExtractor::new()
            .extract("com.none.app", html)
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(ExtractionFailure::Blocked)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_custom_plan_overrides_a_chain() {
        let plan = ExtractionPlan::standard().with_text_chain(
            FieldChain::new(Field::Category).then(Tier::Meta, "fixed", |_| {
                Some("Tools".to_string())
            }),
        );
        let html = r#"<h1><span>App</span></h1><a itemprop="genre" href="/store/apps/category/GAME">Games</a>"#;
        let record = ListingExtractor::with_plan(plan)
            .extract("com.a.b", html)
            .unwrap();
        assert_eq!(record.category, "Tools");
    }

    #[test]
    fn test_title_text_chain_does_not_override_title() {
        let plan = ExtractionPlan::standard().with_text_chain(
            FieldChain::new(Field::Title).then(Tier::Meta, "fixed", |_| {
                Some("Other".to_string())
            }),
        );
        let record = ListingExtractor::with_plan(plan)
            .extract("com.a.b", "<h1><span>Real Name</span></h1>")
            .unwrap();
        assert_eq!(record.title, "Real Name");
    }
}
