//! Adapter contract and common types.
//!
//! A [`SiteAdapter`] knows how to find the page or API resource listing
//! streams for one item on one site ([`SiteAdapter::locate`]) and how to
//! pull raw candidates out of it ([`SiteAdapter::extract`]). Every adapter
//! is a [`StreamProvider`] through a blanket impl that runs the shared
//! pipeline: classify, episode filter, dedup, rank.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;

use super::classify::Quality;
use crate::error::Result;
use crate::profile::RequestProfile;

/// Kind of catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "film" => Ok(MediaType::Movie),
            "tv" | "series" | "show" => Ok(MediaType::Tv),
            other => Err(format!("unknown media type '{other}' (expected movie or tv)")),
        }
    }
}

/// What to look up: a catalog ID plus, for TV, season and episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamQuery {
    /// Catalog (TMDB) identifier of the movie or show.
    pub catalog_id: String,
    /// Movie or TV; decides locator paths and whether episodes are filtered.
    pub media_type: MediaType,
    /// Season number, TV only.
    pub season: Option<u32>,
    /// Episode number within the season, TV only.
    pub episode: Option<u32>,
}

impl StreamQuery {
    pub fn movie(catalog_id: impl Into<String>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            media_type: MediaType::Movie,
            season: None,
            episode: None,
        }
    }

    pub fn episode(catalog_id: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            media_type: MediaType::Tv,
            season: Some(season),
            episode: Some(episode),
        }
    }

    /// `(season, episode)` when both are known.
    pub fn episode_pair(&self) -> Option<(u32, u32)> {
        self.season.zip(self.episode)
    }

    /// Episode number the result list must be restricted to, if any.
    pub fn episode_filter(&self) -> Option<u32> {
        match self.media_type {
            MediaType::Tv => self.episode,
            MediaType::Movie => None,
        }
    }
}

/// Raw candidate pulled from a site document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCandidate {
    pub url: String,
    /// Link text plus surrounding container text; drives classification.
    pub label: String,
    /// Server name known to the adapter (translator, hoster anchor text).
    /// When `None` the hoster is classified from the URL.
    pub server: Option<String>,
}

impl StreamCandidate {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            server: None,
        }
    }

    #[must_use]
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

/// Normalized, classified stream record returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    /// `"{Provider} - {server} [{quality}]"`.
    pub name: String,
    /// Human-readable title, e.g. `"Dexter (2006) S01E05"`.
    pub title: String,
    /// Absolute `http(s)` stream or hoster URL; unique within a result list.
    pub url: String,
    /// Quality tier used for ranking.
    pub quality: Quality,
    /// Parsed size such as `"1.4 GB"`, or `"Unknown"`.
    pub size: String,
    /// Headers the consumer must replay when fetching `url`.
    pub headers: BTreeMap<String, String>,
    /// ID of the provider that produced the stream.
    pub provider: String,
}

/// Result of a successful locate step.
#[derive(Debug, Clone)]
pub struct Located<H> {
    /// Adapter-specific resource handle (page URL, series ID, ...).
    pub handle: H,
    /// Display title for descriptors, when the adapter learned one.
    pub title: Option<String>,
    /// Page the streams were found on, replayed as `Referer`.
    pub referer: Option<String>,
}

impl<H> Located<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            title: None,
            referer: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// Site-specific half of a provider.
///
/// Implementors return `Err` freely; the shared pipeline turns every error
/// into an empty contribution and logs it.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Resource handle produced by [`locate`](Self::locate).
    type Handle: Send + Sync;

    /// Stable lowercase identifier (e.g. `"hdhub4u"`).
    fn id(&self) -> &'static str;

    /// Human-readable provider name used in descriptor names.
    fn display_name(&self) -> &'static str;

    /// Request profile sent to the site and replayed by consumers.
    fn profile(&self) -> &RequestProfile;

    /// Whether the query can be served at all. Returning `false`
    /// short-circuits to an empty result before any fetch.
    fn accepts(&self, query: &StreamQuery) -> bool {
        let _ = query;
        true
    }

    /// Find the resource listing streams for the query. `Ok(None)` is the
    /// normal "no content here" outcome.
    async fn locate(&self, query: &StreamQuery) -> Result<Option<Located<Self::Handle>>>;

    /// Pull raw candidates from the located resource.
    async fn extract(
        &self,
        located: &Located<Self::Handle>,
        query: &StreamQuery,
    ) -> Result<Vec<StreamCandidate>>;
}

/// Object-safe provider interface used by callers.
///
/// `get_streams` always resolves: an empty list is the failure signal.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    async fn get_streams(&self, query: &StreamQuery) -> Vec<StreamDescriptor>;
}

#[async_trait]
impl<A> StreamProvider for A
where
    A: SiteAdapter,
{
    fn id(&self) -> &'static str {
        SiteAdapter::id(self)
    }

    fn name(&self) -> &'static str {
        self.display_name()
    }

    async fn get_streams(&self, query: &StreamQuery) -> Vec<StreamDescriptor> {
        super::pipeline::run(self, query).await
    }
}
