//! In-memory query cache.
//!
//! Reads are cached per [`QueryKey`]; mutations mark keys stale with
//! [`QueryCache::invalidate`], which refetches the keys that still have a
//! live [`Subscription`].

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::QueryKey;
pub use store::{FetchFuture, Fetcher, QueryCache, QueryError, QueryStatus, Subscription};
