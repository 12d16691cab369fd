use std::sync::LazyLock;

use appscope_core::models::MAX_SCREENSHOTS;
use scraper::{ElementRef, Selector};
use url::Url;

use super::context::ExtractionContext;
use super::dom;

/// Image CDN serving listing artwork.
const IMAGE_HOST: &str = "play-lh.googleusercontent.com";

static IMG: LazyLock<Selector> = LazyLock::new(|| dom::selector("img"));

/// Screenshot URLs in document order: deduplicated, capped, CDN-hosted only.
///
/// Each `<img>` is read from `src`, then `data-src`, then the first
/// `srcset` candidate; the first URL on the image CDN wins. The listing
/// icon shares the CDN and is skipped.
pub fn screenshots(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for img in ctx.document().select(&IMG) {
        if is_icon(img) {
            continue;
        }
        let Some(url) = image_candidates(img).find_map(cdn_url) else {
            continue;
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
        if urls.len() == MAX_SCREENSHOTS {
            break;
        }
    }
    urls
}

fn is_icon(img: ElementRef<'_>) -> bool {
    let el = img.value();
    el.has_class("T75of", scraper::CaseSensitivity::CaseSensitive)
        || el.attr("itemprop") == Some("image")
}

fn image_candidates<'a>(img: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    let el = img.value();
    let srcset_first = el
        .attr("srcset")
        .and_then(|set| set.split(',').next())
        .and_then(|candidate| candidate.split_whitespace().next());
    [el.attr("src"), el.attr("data-src"), srcset_first]
        .into_iter()
        .flatten()
}

fn cdn_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };
    let url = Url::parse(&absolute).ok()?;
    (url.host_str() == Some(IMAGE_HOST)).then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    fn shots(html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        let ctx = ExtractionContext::new(&doc, "com.a.b");
        screenshots(&ctx)
    }

    #[test]
    fn test_reads_src_then_data_src_then_srcset() {
        let urls = shots(
            r#"<img src="https://play-lh.googleusercontent.com/a">
               <img src="data:image/gif;base64,R0lGOD" data-src="https://play-lh.googleusercontent.com/b">
               <img srcset="//play-lh.googleusercontent.com/c=w526 2x, //play-lh.googleusercontent.com/c=w1052 3x">"#,
        );
        assert_eq!(
            urls,
            vec![
                "https://play-lh.googleusercontent.com/a",
                "https://play-lh.googleusercontent.com/b",
                "https://play-lh.googleusercontent.com/c=w526",
            ]
        );
    }

    #[test]
    fn test_skips_other_hosts_and_icon() {
        let urls = shots(
            r#"<img class="T75of" src="https://play-lh.googleusercontent.com/icon">
               <img src="https://www.gstatic.com/logo.png">
               <img src="https://evil.example/play-lh.googleusercontent.com/x">
               <img src="https://play-lh.googleusercontent.com/shot">"#,
        );
        assert_eq!(urls, vec!["https://play-lh.googleusercontent.com/shot"]);
    }

    #[test]
    fn test_dedupes_and_caps() {
        let mut html = String::from(r#"<img src="https://play-lh.googleusercontent.com/0">"#);
        for i in 0..8 {
            html.push_str(&format!(
                r#"<img src="https://play-lh.googleusercontent.com/{i}">"#
            ));
        }
        let urls = shots(&html);
        assert_eq!(urls.len(), MAX_SCREENSHOTS);
        assert_eq!(urls[0], "https://play-lh.googleusercontent.com/0");
        assert_eq!(urls[1], "https://play-lh.googleusercontent.com/1");
        assert_eq!(urls[4], "https://play-lh.googleusercontent.com/4");
    }
}
