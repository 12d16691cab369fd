//! Typed view over the JSON-LD application block embedded in listing pages.

use scraper::Html;
use serde_json::Value;

use super::dom;

const APP_TYPES: &[&str] = &["SoftwareApplication", "MobileApplication", "VideoGame"];

/// The first JSON-LD object on the page describing an application.
#[derive(Debug, Clone)]
pub struct StructuredApp {
    data: Value,
}

impl StructuredApp {
    /// Scan every `application/ld+json` script and return the first
    /// application object. Unparseable blocks are skipped.
    pub fn find(document: &Html) -> Option<Self> {
        document.select(&dom::JSON_LD).find_map(|script| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => find_app(value).map(|data| Self { data }),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed JSON-LD block");
                    None
                }
            }
        })
    }

    pub fn name(&self) -> Option<String> {
        text(self.data.get("name"))
    }

    /// Icon URL. `image` may be a string, an `ImageObject`, or a list of either.
    pub fn image(&self) -> Option<String> {
        match self.data.get("image")? {
            Value::Array(items) => items.iter().find_map(image_url),
            other => image_url(other),
        }
    }

    pub fn url(&self) -> Option<String> {
        text(self.data.get("url"))
    }

    pub fn description(&self) -> Option<String> {
        text(self.data.get("description"))
    }

    pub fn category(&self) -> Option<String> {
        text(self.data.get("applicationCategory"))
    }

    pub fn author_name(&self) -> Option<String> {
        match self.data.get("author")? {
            Value::Array(items) => items.iter().find_map(|a| text(a.get("name"))),
            Value::String(s) => non_blank(s),
            other => text(other.get("name")),
        }
    }

    /// `aggregateRating.ratingValue`, accepted only within (0, 5].
    pub fn rating_value(&self) -> Option<f64> {
        let raw = self.data.get("aggregateRating")?.get("ratingValue")?;
        let value = match raw {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        (value.is_finite() && value > 0.0 && value <= 5.0).then_some(value)
    }

    /// `aggregateRating.ratingCount`, from a number or a digit string.
    pub fn rating_count(&self) -> Option<u64> {
        let raw = self.data.get("aggregateRating")?.get("ratingCount")?;
        match raw {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => {
                let digits: String = s.chars().filter(char::is_ascii_digit).collect();
                digits.parse().ok()
            }
            _ => None,
        }
    }

    /// `offers.price` as text; `offers` may be an object or a list.
    pub fn price(&self) -> Option<String> {
        let offers = self.data.get("offers")?;
        let offer = match offers {
            Value::Array(items) => items.first()?,
            other => other,
        };
        match offer.get("price")? {
            Value::String(s) => non_blank(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn find_app(value: Value) -> Option<Value> {
    match value {
        Value::Array(items) => items.into_iter().find_map(find_app),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                return find_app(graph);
            }
            let value = Value::Object(map);
            is_app(&value).then_some(value)
        }
        _ => None,
    }
}

fn is_app(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => APP_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| APP_TYPES.contains(&t)),
        _ => false,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(non_blank)
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Object(_) => text(value.get("url")).or_else(|| text(value.get("contentUrl"))),
        _ => None,
    }
}
