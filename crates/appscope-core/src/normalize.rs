//! Record normalization: trimming, whitespace collapsing, and sentinel defaults.
//!
//! Turns the optional values gathered by the extraction chain into a whole
//! [`AppRecord`]. Text fields never come out empty: they carry either the
//! extracted value or an explicit placeholder.

use crate::models::{AppRecord, MAX_SCREENSHOTS, NO_DESCRIPTION, NOT_AVAILABLE, RecordDraft};

/// Build the final record from a resolved title and the remaining draft.
///
/// The title is passed separately because its absence is a failure the
/// extractor reports before normalization ever runs.
pub fn normalize(title: &str, draft: RecordDraft) -> AppRecord {
    let description =
        clean_long(draft.description).unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let summary = clean_long(draft.summary).unwrap_or_else(|| description.clone());

    AppRecord {
        identifier: or_sentinel(draft.identifier),
        title: collapse_whitespace(title),
        icon: or_sentinel(draft.icon),
        developer: or_sentinel(draft.developer),
        developer_email: clean(draft.developer_email),
        developer_website: clean(draft.developer_website),
        category: or_sentinel(draft.category),
        rating: draft
            .rating
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(0.0),
        rating_count: draft.rating_count.unwrap_or(0),
        installs: or_sentinel(draft.installs),
        free: draft.free,
        ad_supported: draft.ad_supported,
        in_app_purchases: draft.in_app_purchases,
        last_updated: or_sentinel(draft.last_updated),
        current_version: or_sentinel(draft.current_version),
        min_platform_version: or_sentinel(draft.min_platform_version),
        summary,
        description,
        screenshots: dedupe_screenshots(draft.screenshots),
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_long(value: Option<String>) -> Option<String> {
    value
        .map(|v| collapse_whitespace(&v))
        .filter(|v| !v.is_empty())
}

fn or_sentinel(value: Option<String>) -> String {
    clean(value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn dedupe_screenshots(urls: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_SCREENSHOTS);
    for url in urls {
        let url = url.trim();
        if url.is_empty() || out.iter().any(|u| u == url) {
            continue;
        }
        out.push(url.to_string());
        if out.len() == MAX_SCREENSHOTS {
            break;
        }
    }
    out
}
