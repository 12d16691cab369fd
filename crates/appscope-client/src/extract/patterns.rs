//! Free-text fallback patterns, used when no structured or markup source
//! carries a field.

use std::sync::LazyLock;

use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// "10M+ downloads", "1,000,000+ installs", "5 Cr+ downloads"
pub static INSTALLS_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)(\d[\d.,]*(?:\s?(?:[kmb]|cr|lakh))?\+?)\s*(?:downloads|installs)\b")
});

/// Download counters embedded in inline script payloads.
pub static SCRIPT_DOWNLOADS: LazyLock<Regex> = LazyLock::new(|| {
    regex(r#"(?i)["'](?:numDownloads|num_downloads|downloads)["']\s*[:=]\s*"([^"]+)""#)
});

/// "4.5 star", "4.5 stars"
pub static RATING_TEXT: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\b(\d(?:\.\d+)?)\s*stars?\b"));

/// "1.2K reviews", "35,210 ratings"
pub static RATING_COUNT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\b(\d[\d.,]*\s?[kmb]?)\s*(?:reviews|ratings)\b"));

pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| regex(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"));

pub static UPDATED: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)updated\s+(?:on\s+)?([A-Z][a-z]{2,8}\.?\s+\d{1,2},\s+\d{4})")
});

pub static VERSION: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)current version\s*:?\s*(\d+(?:\.[\w-]+)+)"));

pub static REQUIRES: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)requires android\s*:?\s*(\d+(?:\.\d+)*\s+and\s+up|varies with device)")
});

/// First capture group of `re` in `haystack`, trimmed.
pub fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse an abbreviated count such as "1.2K", "35,210" or "3M".
pub fn parse_count(text: &str) -> Option<u64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '+')
        .collect();
    let (number, multiplier) = match compact.chars().last()?.to_ascii_uppercase() {
        'K' => (&compact[..compact.len() - 1], 1_000.0),
        'M' => (&compact[..compact.len() - 1], 1_000_000.0),
        'B' => (&compact[..compact.len() - 1], 1_000_000_000.0),
        _ => (compact.as_str(), 1.0),
    };
    let value = number.parse::<f64>().ok()? * multiplier;
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

/// Parse a rating, accepting only values within (0, 5].
pub fn parse_rating(text: &str) -> Option<f64> {
    let value = text.trim().replace(',', ".").parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0 && value <= 5.0).then_some(value)
}
