//! The standard per-field strategy lists for storefront listing pages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use appscope_core::models::RecordDraft;
use scraper::Selector;
use url::Url;

use super::chain::{Field, FieldChain, Tier};
use super::context::ExtractionContext;
use super::dom;
use super::patterns::{self, parse_count, parse_rating};

/// Storefront title suffix appended to `og:title`.
const TITLE_SUFFIX: &str = " - Apps on Google Play";

static CANONICAL: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"link[rel="canonical"]"#]));
static OG_URL: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"meta[property="og:url"]"#]));
static HEADING: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&["h1 span", r#"h1[itemprop="name"]"#]));
static OG_TITLE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"meta[property="og:title"]"#]));
static ICON: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&["img.T75of", r#"img[itemprop="image"]"#]));
static OG_IMAGE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"meta[property="og:image"]"#]));
static DEVELOPER: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    dom::selectors(&[
        "div.Vbfug a span",
        "a.hrTbp",
        r#"a[href*="/store/apps/dev"]"#,
    ])
});
static MAILTO: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"a[href^="mailto:"]"#]));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("a[href]"));
static DEVELOPER_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"a[href*="developer"]"#));
static CATEGORY: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    dom::selectors(&[
        r#"a[itemprop="genre"]"#,
        r#"a[href*="/store/apps/category/"]"#,
    ])
});
static RATED_LABEL: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"[aria-label^="Rated"]"#]));
static RATING_BADGE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&["div.TT9eCd"]));
static STAT_LABEL: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("div.g1rdde"));
static META_DESCRIPTION: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"meta[name="description"]"#]));
static OG_DESCRIPTION: LazyLock<Vec<Selector>> =
    LazyLock::new(|| dom::selectors(&[r#"meta[property="og:description"]"#]));
static DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    dom::selectors(&[r#"div[jsname="sngebd"]"#, r#"div[data-g-id="description"]"#])
});

/// Every field chain used to build a record.
///
/// The title chain is kept apart because a missing title aborts extraction.
/// Text fields live in a map keyed by [`Field`] so callers can swap a chain
/// out with [`ExtractionPlan::with_text_chain`].
pub struct ExtractionPlan {
    title: FieldChain<String>,
    text: BTreeMap<Field, FieldChain<String>>,
    rating: FieldChain<f64>,
    rating_count: FieldChain<u64>,
}

impl ExtractionPlan {
    pub fn standard() -> Self {
        let title = FieldChain::new(Field::Title)
            .then(Tier::Structured, "json_ld_name", |ctx| ctx.structured()?.name())
            .then(Tier::Markup, "heading", |ctx| {
                dom::first_text(ctx.document(), &HEADING)
            })
            .then(Tier::Meta, "og_title", og_title);

        let text = [
            FieldChain::new(Field::Identifier)
                .then(Tier::Structured, "json_ld_url", |ctx| {
                    id_param(&ctx.structured()?.url()?)
                })
                .then(Tier::Meta, "canonical_link", |ctx| {
                    id_param(&dom::first_attr(ctx.document(), &CANONICAL, "href")?)
                })
                .then(Tier::Meta, "og_url", |ctx| {
                    id_param(&dom::first_attr(ctx.document(), &OG_URL, "content")?)
                })
                .then(Tier::Meta, "requested", |ctx| Some(ctx.requested().to_string())),
            FieldChain::new(Field::Icon)
                .then(Tier::Structured, "json_ld_image", |ctx| ctx.structured()?.image())
                .then(Tier::Markup, "icon_img", |ctx| {
                    dom::first_attr(ctx.document(), &ICON, "src")
                })
                .then(Tier::Meta, "og_image", |ctx| {
                    dom::first_attr(ctx.document(), &OG_IMAGE, "content")
                }),
            FieldChain::new(Field::Developer)
                .then(Tier::Structured, "json_ld_author", |ctx| {
                    ctx.structured()?.author_name()
                })
                .then(Tier::Markup, "developer_link", |ctx| {
                    dom::first_text(ctx.document(), &DEVELOPER)
                }),
            FieldChain::new(Field::DeveloperEmail)
                .then(Tier::Markup, "mailto", mailto)
                .then(Tier::Pattern, "email_text", |ctx| {
                    patterns::EMAIL
                        .find(ctx.page_text())
                        .map(|m| m.as_str().to_string())
                }),
            FieldChain::new(Field::DeveloperWebsite)
                .then(Tier::Markup, "website_label", website_label)
                .then(Tier::Markup, "developer_href", |ctx| {
                    offsite_link(ctx, &DEVELOPER_LINK)
                })
                .then(Tier::Markup, "offsite_link", |ctx| offsite_link(ctx, &ANCHOR)),
            FieldChain::new(Field::Category)
                .then(Tier::Structured, "json_ld_category", |ctx| {
                    ctx.structured()?.category()
                })
                .then(Tier::Markup, "genre_link", |ctx| {
                    dom::first_text(ctx.document(), &CATEGORY)
                }),
            FieldChain::new(Field::Installs)
                .then(Tier::Markup, "details_panel", |ctx| {
                    dom::detail_value(ctx.details(), &["installs", "downloads"], &[])
                })
                .then(Tier::Markup, "stat_badge", |ctx| {
                    dom::value_before(ctx.document(), &STAT_LABEL, "downloads")
                })
                .then(Tier::Markup, "label_sibling", |ctx| {
                    dom::value_after_label(ctx.document(), &["Downloads", "Installs"])
                })
                .then(Tier::Pattern, "script_payload", |ctx| {
                    ctx.scripts()
                        .iter()
                        .find_map(|body| patterns::capture(&patterns::SCRIPT_DOWNLOADS, body))
                })
                .then(Tier::Pattern, "installs_text", |ctx| {
                    patterns::capture(&patterns::INSTALLS_TEXT, ctx.page_text())
                }),
            FieldChain::new(Field::LastUpdated)
                .then(Tier::Markup, "details_panel", |ctx| {
                    dom::detail_value(ctx.details(), &["updated"], &[])
                })
                .then(Tier::Markup, "label_sibling", |ctx| {
                    dom::value_after_label(ctx.document(), &["Updated on", "Updated"])
                })
                .then(Tier::Pattern, "updated_text", |ctx| {
                    patterns::capture(&patterns::UPDATED, ctx.page_text())
                }),
            FieldChain::new(Field::CurrentVersion)
                .then(Tier::Markup, "details_panel", |ctx| {
                    dom::detail_value(ctx.details(), &["version"], &["android", "requires"])
                })
                .then(Tier::Markup, "label_sibling", |ctx| {
                    dom::value_after_label(ctx.document(), &["Current Version", "Version"])
                })
                .then(Tier::Pattern, "version_text", |ctx| {
                    patterns::capture(&patterns::VERSION, ctx.page_text())
                }),
            FieldChain::new(Field::MinPlatformVersion)
                .then(Tier::Markup, "details_panel", |ctx| {
                    dom::detail_value(ctx.details(), &["requires"], &[])
                })
                .then(Tier::Markup, "label_sibling", |ctx| {
                    dom::value_after_label(ctx.document(), &["Requires Android"])
                })
                .then(Tier::Pattern, "requires_text", |ctx| {
                    patterns::capture(&patterns::REQUIRES, ctx.page_text())
                }),
            FieldChain::new(Field::Summary)
                .then(Tier::Meta, "meta_description", |ctx| {
                    dom::first_attr(ctx.document(), &META_DESCRIPTION, "content")
                })
                .then(Tier::Meta, "og_description", |ctx| {
                    dom::first_attr(ctx.document(), &OG_DESCRIPTION, "content")
                }),
            FieldChain::new(Field::Description)
                .then(Tier::Structured, "json_ld_description", |ctx| {
                    ctx.structured()?.description()
                })
                .then(Tier::Markup, "description_block", |ctx| {
                    dom::first_text(ctx.document(), &DESCRIPTION)
                }),
        ]
        .into_iter()
        .map(|chain| (chain.field(), chain))
        .collect();

        let rating = FieldChain::new(Field::Rating)
            .then(Tier::Structured, "json_ld_rating", |ctx| {
                ctx.structured()?.rating_value()
            })
            .then(Tier::Accessibility, "aria_rated", |ctx| {
                // "Rated 4.5 stars out of five stars"
                let label = dom::first_attr(ctx.document(), &RATED_LABEL, "aria-label")?;
                parse_rating(label.split_whitespace().nth(1)?)
            })
            .then(Tier::Markup, "rating_badge", |ctx| {
                let text = dom::first_text(ctx.document(), &RATING_BADGE)?;
                parse_rating(leading_number(&text))
            })
            .then(Tier::Pattern, "rating_text", |ctx| {
                parse_rating(&patterns::capture(&patterns::RATING_TEXT, ctx.page_text())?)
            });

        let rating_count = FieldChain::new(Field::RatingCount)
            .then(Tier::Structured, "json_ld_count", |ctx| {
                ctx.structured()?.rating_count()
            })
            .then(Tier::Markup, "review_badge", |ctx| {
                ctx.document()
                    .select(&STAT_LABEL)
                    .map(dom::element_text)
                    .find(|t| t.to_lowercase().contains("review"))
                    .and_then(|t| parse_count(t.split_whitespace().next()?))
            })
            .then(Tier::Pattern, "count_text", |ctx| {
                parse_count(&patterns::capture(
                    &patterns::RATING_COUNT_TEXT,
                    ctx.page_text(),
                )?)
            });

        Self {
            title,
            text,
            rating,
            rating_count,
        }
    }

    /// Replace (or add) the chain for a text field.
    pub fn with_text_chain(mut self, chain: FieldChain<String>) -> Self {
        self.text.insert(chain.field(), chain);
        self
    }

    pub fn title(&self) -> &FieldChain<String> {
        &self.title
    }

    pub fn text_chain(&self, field: Field) -> Option<&FieldChain<String>> {
        self.text.get(&field)
    }

    /// Resolve every non-title field into the context's draft.
    pub fn fill(&self, ctx: &mut ExtractionContext<'_>) {
        for (field, chain) in &self.text {
            let value = chain.resolve(ctx);
            assign(&mut ctx.draft, *field, value);
        }
        ctx.draft.rating = self.rating.resolve(ctx);
        ctx.draft.rating_count = self.rating_count.resolve(ctx);
    }
}

impl Default for ExtractionPlan {
    fn default() -> Self {
        Self::standard()
    }
}

fn assign(draft: &mut RecordDraft, field: Field, value: Option<String>) {
    let slot = match field {
        Field::Identifier => &mut draft.identifier,
        Field::Icon => &mut draft.icon,
        Field::Developer => &mut draft.developer,
        Field::DeveloperEmail => &mut draft.developer_email,
        Field::DeveloperWebsite => &mut draft.developer_website,
        Field::Category => &mut draft.category,
        Field::Installs => &mut draft.installs,
        Field::LastUpdated => &mut draft.last_updated,
        Field::CurrentVersion => &mut draft.current_version,
        Field::MinPlatformVersion => &mut draft.min_platform_version,
        Field::Summary => &mut draft.summary,
        Field::Description => &mut draft.description,
        Field::Title | Field::Rating | Field::RatingCount => {
            tracing::warn!(%field, "Field has a dedicated chain, ignoring text chain");
            return;
        }
    };
    *slot = value;
}

fn og_title(ctx: &ExtractionContext<'_>) -> Option<String> {
    let title = dom::first_attr(ctx.document(), &OG_TITLE, "content")?;
    let name = title
        .strip_suffix(TITLE_SUFFIX.trim_start())
        .unwrap_or(&title)
        .trim();
    // A bare storefront title names no app.
    let storefront = TITLE_SUFFIX.trim_start_matches(|c: char| c == ' ' || c == '-');
    (!name.is_empty() && name != "-" && name != storefront).then(|| name.to_string())
}

/// The `id` query parameter of a listing URL.
fn id_param(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.trim().to_string())
}

fn mailto(ctx: &ExtractionContext<'_>) -> Option<String> {
    let href = dom::first_attr(ctx.document(), &MAILTO, "href")?;
    let address = href.strip_prefix("mailto:")?;
    let address = address.split('?').next().unwrap_or(address);
    Some(address.trim().to_string())
}

fn website_label(ctx: &ExtractionContext<'_>) -> Option<String> {
    ctx.document()
        .select(&ANCHOR)
        .filter(|a| dom::element_text(*a).eq_ignore_ascii_case("website"))
        .filter_map(|a| a.value().attr("href"))
        .find_map(offsite)
}

fn offsite_link(ctx: &ExtractionContext<'_>, selector: &Selector) -> Option<String> {
    ctx.document()
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .find_map(offsite)
}

/// `href` if it is an absolute http(s) link away from the storefront's own hosts.
fn offsite(href: &str) -> Option<String> {
    let url = Url::parse(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if host.contains("google") || host.contains("gstatic") || host.contains("youtube") {
        return None;
    }
    Some(url.to_string())
}

/// Leading numeric part of badge text such as "4.5star".
fn leading_number(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    &text[..end]
}
