//! Loading and caching of the static documentation assets

mod cache;
mod fetch;

pub use cache::{CacheGeneration, Resource, ResourceCache};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{validate_response, DirFetcher, FetchResponse, ResourceFetcher};
