use std::cell::OnceCell;

use appscope_core::models::RecordDraft;
use appscope_core::normalize::collapse_whitespace;
use scraper::{ElementRef, Html};

use super::dom::{self, DetailRow};
use super::structured::StructuredApp;

/// Request-scoped state for one extraction run.
///
/// Wraps the parsed document and the draft being filled. Views that
/// several strategies share (structured data, page text, the details
/// panel, script bodies) are computed on first use and then reused.
pub struct ExtractionContext<'a> {
    document: &'a Html,
    requested: &'a str,
    structured: OnceCell<Option<StructuredApp>>,
    page_text: OnceCell<String>,
    page_text_lower: OnceCell<String>,
    details: OnceCell<Vec<DetailRow>>,
    scripts: OnceCell<Vec<String>>,
    pub draft: RecordDraft,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(document: &'a Html, requested: &'a str) -> Self {
        Self {
            document,
            requested,
            structured: OnceCell::new(),
            page_text: OnceCell::new(),
            page_text_lower: OnceCell::new(),
            details: OnceCell::new(),
            scripts: OnceCell::new(),
            draft: RecordDraft::default(),
        }
    }

    pub fn document(&self) -> &'a Html {
        self.document
    }

    /// The identifier the caller asked for.
    pub fn requested(&self) -> &'a str {
        self.requested
    }

    /// The embedded application metadata block, if the page has one.
    pub fn structured(&self) -> Option<&StructuredApp> {
        self.structured
            .get_or_init(|| StructuredApp::find(self.document))
            .as_ref()
    }

    /// Visible page text (scripts and styles excluded), whitespace collapsed.
    pub fn page_text(&self) -> &str {
        self.page_text
            .get_or_init(|| collapse_whitespace(&visible_text(self.document)))
    }

    pub fn page_text_lower(&self) -> &str {
        self.page_text_lower
            .get_or_init(|| self.page_text().to_lowercase())
    }

    /// Label/value rows of the "about this app" details panel.
    pub fn details(&self) -> &[DetailRow] {
        self.details
            .get_or_init(|| dom::detail_rows(self.document))
    }

    /// Bodies of inline, non-JSON-LD `<script>` elements.
    pub fn scripts(&self) -> &[String] {
        self.scripts.get_or_init(|| dom::script_bodies(self.document))
    }

    pub fn into_draft(self) -> RecordDraft {
        self.draft
    }
}

const INVISIBLE: &[&str] = &["script", "style", "noscript", "template"];

fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| INVISIBLE.contains(&parent.value().name()));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_skips_scripts_and_collapses_whitespace() {
        let doc = Html::parse_document(
            r#"<html><head><style>.x{}</style></head><body>
                <p>Contains   ads</p>
                <script>var downloads = "hidden";</script>
                <div>In-app
                purchases</div>
            </body></html>"#,
        );
        let ctx = ExtractionContext::new(&doc, "com.test.app");

        assert_eq!(ctx.page_text(), "Contains ads In-app purchases");
        assert_eq!(ctx.page_text_lower(), "contains ads in-app purchases");
    }

    #[test]
    fn test_requested_identifier_is_exposed() {
        let doc = Html::parse_document("<html></html>");
        let ctx = ExtractionContext::new(&doc, "com.test.app");
        assert_eq!(ctx.requested(), "com.test.app");
        assert!(ctx.structured().is_none());
        assert!(ctx.details().is_empty());
    }
}
