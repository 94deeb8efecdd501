//! Stream candidate resolution
//!
//! Each site adapter locates the page or API resource for a title and pulls
//! raw candidates from it; the shared [`pipeline`] classifies, filters,
//! deduplicates and ranks them. [`ProviderRegistry`] queries every enabled
//! adapter concurrently.

pub mod aggregate;
pub mod classify;
pub mod extract;
pub mod pipeline;
pub mod provider;
pub mod providers;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

pub use classify::Quality;
pub use provider::{
    Located, MediaType, SiteAdapter, StreamCandidate, StreamDescriptor, StreamProvider,
    StreamQuery,
};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::http_client::Fetcher;
use crate::metadata::{MetadataSource, TmdbClient};
use providers::{Hdhub4uProvider, HdrezkaProvider, SerienfansProvider};

/// Ordered set of providers. Registration order breaks ranking ties.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn StreamProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Build every enabled adapter from configuration, sharing one fetcher.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let metadata: Arc<dyn MetadataSource> =
            Arc::new(TmdbClient::new(fetcher.clone(), config.tmdb_options()));
        let mut registry = Self::new();

        let hdhub4u = config.provider("hdhub4u");
        if hdhub4u.enabled {
            let provider = match hdhub4u.base_url {
                Some(ref base) => {
                    Hdhub4uProvider::with_base_url(fetcher.clone(), metadata.clone(), base)?
                }
                None => Hdhub4uProvider::new(fetcher.clone(), metadata.clone())?,
            };
            registry.register(Arc::new(provider));
        }

        let hdrezka = config.provider("hdrezka");
        if hdrezka.enabled {
            let provider = match hdrezka.base_url {
                Some(ref base) => HdrezkaProvider::with_base_url(fetcher.clone(), base)?,
                None => HdrezkaProvider::new(fetcher.clone())?,
            };
            registry.register(Arc::new(provider));
        }

        let serienfans = config.provider("serienfans");
        if serienfans.enabled {
            let provider = match serienfans.base_url {
                Some(ref base) => SerienfansProvider::with_base_url(fetcher.clone(), base)?,
                None => SerienfansProvider::new(fetcher.clone())?,
            };
            registry.register(Arc::new(
                provider
                    .with_slugs(serienfans.slugs)
                    .with_languages(serienfans.languages),
            ));
        }

        debug!(count = registry.providers.len(), "Registered providers");
        Ok(registry)
    }

    pub fn register(&mut self, provider: Arc<dyn StreamProvider>) {
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Arc<dyn StreamProvider>] {
        &self.providers
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn StreamProvider>> {
        self.providers.iter().find(|p| p.id().eq_ignore_ascii_case(id))
    }

    /// Narrow to the given IDs, keeping registration order. An empty list
    /// keeps everything.
    pub fn select(&self, ids: &[String]) -> Result<Self> {
        if ids.is_empty() {
            return Ok(Self {
                providers: self.providers.clone(),
            });
        }
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(ScrapeError::Config(format!("unknown provider: {unknown}")));
        }
        let providers = self
            .providers
            .iter()
            .filter(|p| ids.iter().any(|id| p.id().eq_ignore_ascii_case(id)))
            .cloned()
            .collect();
        Ok(Self { providers })
    }

    /// Query every provider concurrently and merge the results.
    ///
    /// A provider that misses `deadline` contributes nothing. The merged
    /// list is deduplicated by URL and ranked by quality.
    pub async fn get_all_streams(
        &self,
        query: &StreamQuery,
        deadline: Duration,
    ) -> Vec<StreamDescriptor> {
        let lookups = self.providers.iter().map(|provider| async move {
            match tokio::time::timeout(deadline, provider.get_streams(query)).await {
                Ok(streams) => streams,
                Err(_) => {
                    warn!(provider = provider.id(), timeout = ?deadline, "Provider timed out");
                    Vec::new()
                }
            }
        });

        let merged: Vec<StreamDescriptor> = join_all(lookups).await.into_iter().flatten().collect();
        let streams = pipeline::dedup_and_rank(merged);
        info!(
            catalog_id = %query.catalog_id,
            providers = self.providers.len(),
            count = streams.len(),
            "Resolved streams"
        );
        streams
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
