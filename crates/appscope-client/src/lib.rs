pub mod extract;
pub mod fetcher;

pub use extract::ListingExtractor;
pub use fetcher::ReqwestFetcher;
