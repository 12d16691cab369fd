//! DOM helpers shared by the markup and meta strategies.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// Parse a built-in selector. Panics on a malformed literal.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

pub static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"script[type="application/ld+json"]"#));
static SCRIPT: LazyLock<Selector> = LazyLock::new(|| selector("script"));
static DIV: LazyLock<Selector> = LazyLock::new(|| selector("div"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

// The details panel has been rendered with several class schemes over time.
static DETAIL_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| selector("div.VfPpkd-A7Ei6b, div.VfPpkd-qRZikd, div.UCQdA, div.sMUprd"));
static DETAIL_LABELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["div.BgcNfc", "div.wVqUob", "div.qQjadf", "div.q078ud"]
        .into_iter()
        .map(selector)
        .collect()
});
static DETAIL_VALUES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["span.htlgb", "div.reAt0", "div.Uc9Gjf"]
        .into_iter()
        .map(selector)
        .collect()
});

/// Parse a list of CSS selectors once, for use in a `LazyLock`.
pub fn selectors(css: &[&str]) -> Vec<Selector> {
    css.iter().map(|c| selector(c)).collect()
}

/// Whitespace-normalized text content of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element matching any selector, in selector order.
pub fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        document
            .select(sel)
            .map(element_text)
            .find(|t| !t.is_empty())
    })
}

/// Attribute of the first element matching any selector that carries it.
pub fn first_attr(document: &Html, selectors: &[Selector], attr: &str) -> Option<String> {
    selectors.iter().find_map(|sel| {
        document
            .select(sel)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// One label/value pair from the details panel. `label` is lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

pub fn detail_rows(document: &Html) -> Vec<DetailRow> {
    let mut rows = Vec::new();
    for block in document.select(&DETAIL_BLOCK) {
        let label = first_within(block, &DETAIL_LABELS)
            .or_else(|| block.select(&SPAN).next().map(element_text))
            .unwrap_or_default();
        let value = first_within(block, &DETAIL_VALUES)
            .or_else(|| block.select(&SPAN).last().map(element_text))
            .unwrap_or_default();

        if label.is_empty() || value.is_empty() || label == value {
            continue;
        }
        rows.push(DetailRow {
            label: label.to_lowercase(),
            value,
        });
    }
    rows
}

/// Value of the first row whose label contains one of `include` and none of `exclude`.
pub fn detail_value(rows: &[DetailRow], include: &[&str], exclude: &[&str]) -> Option<String> {
    rows.iter()
        .find(|row| {
            include.iter().any(|k| row.label.contains(k))
                && !exclude.iter().any(|k| row.label.contains(k))
        })
        .map(|row| row.value.clone())
}

fn first_within(block: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        block
            .select(sel)
            .map(element_text)
            .find(|t| !t.is_empty())
    })
}

/// Text of the element that follows a leaf `<div>` reading exactly one of `labels`.
///
/// Covers layouts where a label and its value are bare sibling divs with
/// no stable class names.
pub fn value_after_label(document: &Html, labels: &[&str]) -> Option<String> {
    document
        .select(&DIV)
        .filter(|div| div.children().filter_map(ElementRef::wrap).next().is_none())
        .filter(|div| {
            let text = element_text(*div);
            labels.iter().any(|l| text.eq_ignore_ascii_case(l))
        })
        .find_map(|div| {
            div.next_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
}

/// Text of the element preceding the first `selector` match whose text
/// contains `label` (case-insensitive). Stat badges put the value first.
pub fn value_before(document: &Html, selector: &Selector, label: &str) -> Option<String> {
    document
        .select(selector)
        .filter(|el| element_text(*el).to_lowercase().contains(label))
        .find_map(|el| {
            el.prev_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
}

/// Bodies of inline scripts, excluding JSON-LD blocks.
pub fn script_bodies(document: &Html) -> Vec<String> {
    document
        .select(&SCRIPT)
        .filter(|s| s.value().attr("type") != Some("application/ld+json"))
        .map(|s| s.text().collect::<String>())
        .filter(|body| !body.trim().is_empty())
        .collect()
}
