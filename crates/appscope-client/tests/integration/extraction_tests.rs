use appscope_client::ListingExtractor;
use appscope_core::error::{AppError, ExtractionFailure};
use appscope_core::models::{MAX_SCREENSHOTS, NOT_AVAILABLE};
use appscope_core::traits::Extractor;

use crate::integration::common::fixture;

#[test]
fn test_sample_listing_end_to_end() {
    let record = ListingExtractor::new()
        .extract("com.sample.app", &fixture("sample_listing.html"))
        .unwrap();

    assert_eq!(record.identifier, "com.sample.app");
    assert_eq!(record.title, "Sample App");
    assert_eq!(record.rating, 4.5);
    assert_eq!(record.rating_count, 1200);
    assert_eq!(record.icon, "https://play-lh.googleusercontent.com/sample-icon");
    assert_eq!(record.developer, "Sample Studio");
    assert_eq!(record.category, "PRODUCTIVITY");
    assert_eq!(record.installs, "100K+");
    assert_eq!(record.summary, "A sample application for testing.");
    assert_eq!(record.description, "Sample App keeps your notes in sync.");
    assert!(record.free);
    assert!(record.ad_supported);
    assert!(record.in_app_purchases);
    assert_eq!(
        record.screenshots,
        vec![
            "https://play-lh.googleusercontent.com/shot-1",
            "https://play-lh.googleusercontent.com/shot-2",
            "https://play-lh.googleusercontent.com/shot-3",
        ]
    );

    // Absent from the fixture.
    assert_eq!(record.last_updated, NOT_AVAILABLE);
    assert_eq!(record.current_version, NOT_AVAILABLE);
    assert_eq!(record.min_platform_version, NOT_AVAILABLE);
    assert!(record.developer_email.is_none());
    assert!(record.developer_website.is_none());
}

#[test]
fn test_no_text_field_is_ever_empty() {
    let extractor = ListingExtractor::new();
    for name in [
        "sample_listing.html",
        "installs_text_only.html",
        "installs_tier_priority.html",
    ] {
        let record = extractor.extract("com.fixture.app", &fixture(name)).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        for (key, value) in json.as_object().unwrap() {
            if let Some(text) = value.as_str() {
                assert!(!text.trim().is_empty(), "{name}: field {key} is empty");
            }
        }
    }
}

#[test]
fn test_page_without_title_is_not_found() {
    let err = ListingExtractor::new()
        .extract("com.missing.app", &fixture("no_title.html"))
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Extraction(ExtractionFailure::NotFound)
    ));
    assert_eq!(err.user_message(), "App not found on the storefront.");
}

#[test]
fn test_interstitial_page_is_blocked() {
    let err = ListingExtractor::new()
        .extract("com.sample.app", &fixture("captcha.html"))
        .unwrap_err();
    assert!(matches!(err, AppError::Extraction(ExtractionFailure::Blocked)));
}

#[test]
fn test_installs_from_text_pattern_only() {
    let record = ListingExtractor::new()
        .extract("com.text.only", &fixture("installs_text_only.html"))
        .unwrap();
    assert_eq!(record.title, "Text Only App");
    assert_eq!(record.installs, "5M+");
    assert_eq!(record.identifier, "com.text.only");
}

#[test]
fn test_higher_tiers_win_over_fallbacks() {
    let record = ListingExtractor::new()
        .extract("com.tiered.app", &fixture("installs_tier_priority.html"))
        .unwrap();

    assert_eq!(record.title, "Tiered App");
    // Details panel beats the script payload and the page-text pattern.
    assert_eq!(record.installs, "1,000,000+");
    // Structured data beats the accessibility label.
    assert_eq!(record.rating, 4.1);
    assert_eq!(record.rating_count, 310);
    assert_eq!(record.last_updated, "March 3, 2024");
    assert_eq!(record.current_version, "3.1.4");
    assert_eq!(record.min_platform_version, "8.0 and up");
}

#[test]
fn test_screenshots_are_capped() {
    let mut html = String::from("<html><body><h1><span>Gallery</span></h1>");
    for i in 0..12 {
        html.push_str(&format!(
            r#"<img src="https://play-lh.googleusercontent.com/shot-{i}">"#
        ));
    }
    html.push_str("</body></html>");

    let record = ListingExtractor::new()
        .extract("com.gallery.app", &html)
        .unwrap();
    assert_eq!(record.screenshots.len(), MAX_SCREENSHOTS);
    assert_eq!(
        record.screenshots[0],
        "https://play-lh.googleusercontent.com/shot-0"
    );
}
