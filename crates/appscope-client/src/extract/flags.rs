use std::sync::LazyLock;

use scraper::Selector;

use super::context::ExtractionContext;
use super::dom;

const AD_PHRASES: &[&str] = &["contains ads", "contains advertising"];
const IAP_PHRASES: &[&str] = &["in-app purchases", "in-app billing"];

/// Text shown by interstitials served instead of a listing.
const BLOCKED_MARKERS: &[&str] = &[
    "unusual traffic",
    "captcha",
    "not a robot",
    "before you continue",
];

static PRICE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"meta[itemprop="price"]"#]));

/// Boolean listing attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub free: bool,
    pub ad_supported: bool,
    pub in_app_purchases: bool,
}

pub fn detect(ctx: &ExtractionContext<'_>) -> Flags {
    let text = ctx.page_text_lower();
    Flags {
        free: is_free(ctx),
        ad_supported: AD_PHRASES.iter().any(|p| text.contains(p)),
        in_app_purchases: IAP_PHRASES.iter().any(|p| text.contains(p)),
    }
}

/// A declared price decides; the page text is the last resort.
fn is_free(ctx: &ExtractionContext<'_>) -> bool {
    if let Some(price) = dom::first_attr(ctx.document(), &PRICE, "content") {
        return zero_price(&price);
    }
    if let Some(price) = ctx.structured().and_then(|app| app.price()) {
        return zero_price(&price);
    }
    ctx.page_text_lower().contains("free")
}

fn zero_price(price: &str) -> bool {
    let price = price.trim();
    if price.eq_ignore_ascii_case("free") {
        return true;
    }
    let digits: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().is_ok_and(|p| p == 0.0)
}

/// Whether lowercased page text looks like an anti-automation interstitial.
pub fn is_blocked(page_text_lower: &str) -> bool {
    BLOCKED_MARKERS.iter().any(|m| page_text_lower.contains(m))
}
