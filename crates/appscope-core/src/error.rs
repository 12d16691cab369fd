use std::fmt;

use thiserror::Error;

/// Why a fetched listing page produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// No strategy tier could resolve a title: the listing does not exist.
    NotFound,
    /// No title, and the page looks like an interstitial (consent wall, CAPTCHA).
    Blocked,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionFailure::NotFound => write!(f, "application not found"),
            ExtractionFailure::Blocked => write!(f, "storefront served an interstitial page"),
        }
    }
}

/// Application-wide error types for appscope.
#[derive(Error, Debug)]
pub enum AppError {
    /// Identifier failed basic shape checks.
    #[error("Invalid identifier: {0}")]
    InvalidInput(String),

    /// Non-success HTTP status, or the request could not be built.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Storefront answered with HTTP 429.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The page was fetched but yielded no record.
    #[error("Extraction failed: {0}")]
    Extraction(ExtractionFailure),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true for transport, timeout, and HTTP status failures.
    ///
    /// These are the only errors the retry orchestrator absorbs.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
                | AppError::RateLimitExceeded
        )
    }

    /// Returns true if trying the same lookup again later may succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_fetch_failure() || matches!(self, AppError::Extraction(ExtractionFailure::Blocked))
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(reason) => format!("Invalid package name: {reason}"),
            e if e.is_fetch_failure() => {
                "The storefront is temporarily unreachable. Try again.".to_string()
            }
            AppError::Extraction(ExtractionFailure::NotFound) => {
                "App not found on the storefront.".to_string()
            }
            AppError::Extraction(ExtractionFailure::Blocked) => {
                "The storefront is refusing automated requests right now. Try again later."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<ExtractionFailure> for AppError {
    fn from(failure: ExtractionFailure) -> Self {
        AppError::Extraction(failure)
    }
}
