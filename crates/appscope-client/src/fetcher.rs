use appscope_core::config::LookupConfig;
use appscope_core::error::AppError;
use appscope_core::traits::Fetcher;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, StatusCode};
use url::Url;

/// The storefront rejects requests that carry a default client user-agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Mobile Safari/537.36";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const BROWSER_REFERER: &str = "https://www.google.com/";

/// HTTP fetcher for storefront listing pages, using reqwest.
///
/// Sends one GET per call to the listing URL for an identifier, with
/// browser-like headers and a short fixed timeout. Retrying is not done
/// here; wrap it in [`RetryingFetcher`](appscope_core::retry::RetryingFetcher).
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    base_url: Url,
    locale: String,
    country: String,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::from_config(&LookupConfig::default())
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.storefront_url).map_err(|e| {
            AppError::ConfigError(format!(
                "Invalid storefront URL '{}': {e}",
                config.storefront_url
            ))
        })?;

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(browser_headers())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            locale: config.locale.clone(),
            country: config.country.clone(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Canonical listing URL for an identifier.
    pub fn listing_url(&self, identifier: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("id", identifier)
            .append_pair("hl", &self.locale)
            .append_pair("gl", &self.country);
        url
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(REFERER, HeaderValue::from_static(BROWSER_REFERER));
    headers
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, identifier: &str) -> Result<String, AppError> {
        let url = self.listing_url(identifier);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }
}
