//! AlongTrack Overpass - Geodata queries against Overpass API endpoints
//!
//! This crate builds Overpass QL for query batches, posts them to an ordered
//! list of unreliable endpoints with retry and failover, and turns responses
//! into deduplicated candidates.

pub mod dedup;
pub mod fetcher;
pub mod http;
pub mod query;
pub mod response;

pub use dedup::ResultDeduplicator;
pub use fetcher::{RetryPolicy, RetryingFetcher};
pub use http::ReqwestTransport;
pub use query::build_query;
pub use response::parse_response;
