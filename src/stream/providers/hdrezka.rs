//! HDRezka provider (direct-path locator)
//!
//! The watch page path is built straight from the catalog ID. The page
//! lists dub/subtitle "translators"; each one needs its own CDN lookup,
//! which are issued concurrently.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::http_client::Fetcher;
use crate::profile::RequestProfile;
use crate::stream::aggregate::fan_in;
use crate::stream::classify::episode_tag;
use crate::stream::extract::{element_text, selector, site_base};
use crate::stream::provider::{
    Located, MediaType, SiteAdapter, StreamCandidate, StreamQuery,
};

pub const HDREZKA_BASE: &str = "https://hdrezka.ag";

const TRANSLATORS: &str = ".translators .item[data-id]";

/// Dub / subtitle channel offered on a watch page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
    pub id: String,
    pub name: String,
}

impl fmt::Display for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

pub struct HdrezkaProvider {
    fetcher: Arc<dyn Fetcher>,
    base: Url,
    profile: RequestProfile,
}

impl HdrezkaProvider {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        Self::with_base_url(fetcher, HDREZKA_BASE)
    }

    pub fn with_base_url(fetcher: Arc<dyn Fetcher>, base_url: &str) -> Result<Self> {
        let base = site_base(base_url)?;
        let profile = RequestProfile::chrome()
            .accept_language("en-US,en;q=0.5")
            .referer(base.origin().ascii_serialization())
            .header("Sec-Fetch-Mode", "navigate");
        Ok(Self {
            fetcher,
            base,
            profile,
        })
    }

    fn watch_url(&self, query: &StreamQuery) -> Option<String> {
        let id = urlencoding::encode(&query.catalog_id);
        let path = match query.media_type {
            MediaType::Movie => format!("films/{id}/watching.html"),
            MediaType::Tv => {
                let (season, episode) = query.episode_pair()?;
                format!("series/{id}-{season}-{episode}/watching.html")
            }
        };
        self.base.join(&path).ok().map(String::from)
    }

    fn cdn_url(&self, translator: &Translator, query: &StreamQuery) -> Result<String> {
        let mut url = self.base.join("ajax/get_cdn_series/")?;
        url.set_query(Some(&format!(
            "translator_id={}&title={}&season={}&episode={}",
            urlencoding::encode(&translator.id),
            urlencoding::encode(&query.catalog_id),
            query.season.unwrap_or(0),
            query.episode.unwrap_or(0),
        )));
        Ok(url.into())
    }

    async fn fetch_translator(
        &self,
        translator: &Translator,
        query: &StreamQuery,
    ) -> Result<Vec<StreamCandidate>> {
        let body = self
            .fetcher
            .get_text(&self.cdn_url(translator, query)?, &self.profile.to_headers())
            .await?;
        let response: CdnResponse = serde_json::from_str(&body)?;

        if !response.ok {
            debug!(provider = "hdrezka", translator = %translator, "CDN lookup returned ok=false");
            return Ok(Vec::new());
        }

        let tag = query
            .episode_pair()
            .map(|(s, e)| format!("{} ", episode_tag(s, e)))
            .unwrap_or_default();

        Ok(response
            .data
            .into_iter()
            .filter_map(|item| {
                let file = item.file.filter(|f| !f.is_empty())?;
                Some(
                    StreamCandidate::new(file, format!("{tag}{}", item.label))
                        .with_server(translator.name.clone()),
                )
            })
            .collect())
    }
}

/// Translators listed on a watch page, in page order.
fn parse_translators(html: &str) -> Result<Vec<Translator>> {
    let document = Html::parse_document(html);
    let selector = selector(TRANSLATORS)?;

    Ok(document
        .select(&selector)
        .filter_map(|element| {
            let id = element.value().attr("data-id")?.trim();
            if id.is_empty() {
                return None;
            }
            let name = element_text(element);
            let name = if name.is_empty() {
                format!("Translator {id}")
            } else {
                name
            };
            Some(Translator {
                id: id.to_string(),
                name,
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CdnResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    data: Vec<CdnItem>,
}

#[derive(Debug, Deserialize)]
struct CdnItem {
    file: Option<String>,
    #[serde(default)]
    label: String,
}

#[async_trait]
impl SiteAdapter for HdrezkaProvider {
    type Handle = Vec<Translator>;

    fn id(&self) -> &'static str {
        "hdrezka"
    }

    fn display_name(&self) -> &'static str {
        "HDRezka"
    }

    fn profile(&self) -> &RequestProfile {
        &self.profile
    }

    /// TV lookups need both season and episode to build the watch path.
    fn accepts(&self, query: &StreamQuery) -> bool {
        query.media_type == MediaType::Movie || query.episode_pair().is_some()
    }

    async fn locate(&self, query: &StreamQuery) -> Result<Option<Located<Vec<Translator>>>> {
        let Some(url) = self.watch_url(query) else {
            return Ok(None);
        };
        debug!(provider = "hdrezka", url = %url, "Fetching watch page");

        let html = self.fetcher.get_text(&url, &self.profile.to_headers()).await?;
        let translators = parse_translators(&html)?;
        if translators.is_empty() {
            debug!(provider = "hdrezka", "No translators found");
            return Ok(None);
        }

        Ok(Some(Located::new(translators).with_referer(url)))
    }

    async fn extract(
        &self,
        located: &Located<Vec<Translator>>,
        query: &StreamQuery,
    ) -> Result<Vec<StreamCandidate>> {
        let tasks = located
            .handle
            .iter()
            .map(|translator| (translator, self.fetch_translator(translator, query)));
        Ok(fan_in(self.id(), tasks).await)
    }
}
