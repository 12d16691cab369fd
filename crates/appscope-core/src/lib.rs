pub mod cache;
pub mod config;
pub mod error;
pub mod identifier;
pub mod lookup;
pub mod models;
pub mod normalize;
pub mod retry;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
pub mod traits;

pub use cache::RecordCache;
pub use config::LookupConfig;
pub use error::{AppError, ExtractionFailure};
pub use lookup::LookupService;
pub use models::{AppRecord, Lookup, LookupSource, RecordDraft, compute_hash};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use traits::{Clock, Extractor, Fetcher, SystemClock};
