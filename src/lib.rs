//! `streamseek` - stream candidate resolution for movies and TV episodes
//!
//! # Features
//!
//! - **Site adapters**: search-based (HDHub4u), direct-path (HDRezka) and
//!   slug-registry (SerienFans) locators behind one [`SiteAdapter`] trait
//! - **Shared pipeline**: quality/hoster/size classification, episode
//!   filtering, URL deduplication and quality ranking
//! - **Concurrent fan-out**: per-translator and per-language sub-fetches that
//!   tolerate partial failure
//! - **Header replay**: every descriptor carries the request profile the
//!   consumer must send when fetching the stream
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use streamseek::{Config, HttpFetcher, ProviderRegistry, StreamQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let fetcher = Arc::new(HttpFetcher::with_options(config.http_options())?);
//!     let registry = ProviderRegistry::from_config(&config, fetcher)?;
//!
//!     let query = StreamQuery::episode("1405", 1, 5);
//!     for stream in registry.get_all_streams(&query, config.provider_timeout()).await {
//!         println!("{} {}", stream.name, stream.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http_client;
pub mod metadata;
pub mod profile;
pub mod stream;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use http_client::{Fetcher, HttpFetcher, HttpOptions};
pub use metadata::{MetadataSource, TitleInfo, TmdbClient, TmdbOptions};
pub use profile::RequestProfile;
pub use stream::{
    MediaType, ProviderRegistry, Quality, SiteAdapter, StreamDescriptor, StreamProvider,
    StreamQuery,
};

/// Version of streamseek
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
