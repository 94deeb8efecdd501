//! SerienFans provider (registry-based locator)
//!
//! TV only. The site addresses shows by slug, so a catalog ID must be
//! present in the slug registry; unknown IDs produce nothing rather than a
//! guessed URL. The show page embeds the internal series ID in an inline
//! `initSeason('...')` call, which is read with a plain text pattern.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::http_client::Fetcher;
use crate::profile::RequestProfile;
use crate::stream::aggregate::fan_in;
use crate::stream::classify::episode_tag;
use crate::stream::extract::{collect_anchors, first_text, site_base};
use crate::stream::provider::{Located, MediaType, SiteAdapter, StreamCandidate, StreamQuery};

pub const SERIENFANS_BASE: &str = "https://serienfans.org";

/// Hoster links in an episode fragment.
const HOSTER_LINKS: &str = r#"a.hoster, .stream-link a, a[href*="voe"], a[href*="mixdrop"], a[href*="dood"]"#;

/// Show heading, used as the descriptor title.
const SHOW_TITLE: &str = "h1";

/// Series ID embedded in the show page script: `initSeason('abc123', ...)`.
static SERIES_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"initSeason\('([a-zA-Z0-9]+)'").expect("series id pattern is valid")
});

/// Catalog IDs known to the site, seeded with shows verified by hand.
pub fn default_slugs() -> HashMap<String, String> {
    HashMap::from([("3916".to_string(), "dexter".to_string())])
}

/// Show resolved from the slug registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesHandle {
    pub series_id: String,
    pub show_url: String,
}

pub struct SerienfansProvider {
    fetcher: Arc<dyn Fetcher>,
    base: Url,
    profile: RequestProfile,
    slugs: HashMap<String, String>,
    languages: Vec<String>,
}

impl SerienfansProvider {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        Self::with_base_url(fetcher, SERIENFANS_BASE)
    }

    pub fn with_base_url(fetcher: Arc<dyn Fetcher>, base_url: &str) -> Result<Self> {
        let base = site_base(base_url)?;
        let origin = base.origin().ascii_serialization();
        let profile = RequestProfile::chrome()
            .accept_language("de-DE,de;q=0.9,en;q=0.8")
            .referer(base.as_str())
            .origin(origin)
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Cache-Control", "max-age=0");
        Ok(Self {
            fetcher,
            base,
            profile,
            slugs: default_slugs(),
            languages: vec!["DE".to_string()],
        })
    }

    /// Add or override catalog ID → slug entries.
    #[must_use]
    pub fn with_slugs(mut self, slugs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.slugs.extend(slugs);
        self
    }

    /// Audio language channels to query; each is one episode lookup.
    #[must_use]
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    async fn fetch_language(
        &self,
        located: &Located<SeriesHandle>,
        season: u32,
        episode: u32,
        lang: &str,
    ) -> Result<Vec<StreamCandidate>> {
        let handle = &located.handle;
        let api_url = self
            .base
            .join(&format!("api/series/{}/episode", handle.series_id))?;

        let mut headers = self.profile.to_headers();
        headers.insert(
            "X-Requested-With",
            reqwest::header::HeaderValue::from_static("XMLHttpRequest"),
        );
        if let Ok(referer) = reqwest::header::HeaderValue::from_str(&handle.show_url) {
            headers.insert(reqwest::header::REFERER, referer);
        }

        let form = [
            ("series_id", handle.series_id.clone()),
            ("season", season.to_string()),
            ("episode", episode.to_string()),
            ("lang", lang.to_string()),
            ("quality", "ALL".to_string()),
        ];
        let html = self
            .fetcher
            .post_form(api_url.as_str(), &headers, &form)
            .await?;

        let tag = episode_tag(season, episode);
        Ok(collect_anchors(&html, &self.base, HOSTER_LINKS)?
            .into_iter()
            .map(|anchor| {
                let label = format!("{tag} [{lang}] {}", anchor.context);
                let candidate = StreamCandidate::new(anchor.url, label);
                if anchor.text.is_empty() {
                    candidate
                } else {
                    candidate.with_server(anchor.text)
                }
            })
            .collect())
    }
}

fn extract_series_id(html: &str) -> Option<String> {
    SERIES_ID.captures(html).map(|caps| caps[1].to_string())
}

#[async_trait]
impl SiteAdapter for SerienfansProvider {
    type Handle = SeriesHandle;

    fn id(&self) -> &'static str {
        "serienfans"
    }

    fn display_name(&self) -> &'static str {
        "SerienFans"
    }

    fn profile(&self) -> &RequestProfile {
        &self.profile
    }

    fn accepts(&self, query: &StreamQuery) -> bool {
        query.media_type == MediaType::Tv && query.episode_pair().is_some()
    }

    async fn locate(&self, query: &StreamQuery) -> Result<Option<Located<SeriesHandle>>> {
        let Some(slug) = self.slugs.get(&query.catalog_id) else {
            debug!(provider = "serienfans", catalog_id = %query.catalog_id, "No slug registered");
            return Ok(None);
        };
        let show_url = self.base.join(slug)?.to_string();
        debug!(provider = "serienfans", url = %show_url, "Fetching show");

        let html = self
            .fetcher
            .get_text(&show_url, &self.profile.to_headers())
            .await?;

        let Some(series_id) = extract_series_id(&html) else {
            debug!(provider = "serienfans", "No series ID on show page");
            return Ok(None);
        };

        let mut located = Located::new(SeriesHandle {
            series_id,
            show_url: show_url.clone(),
        })
        .with_referer(show_url);

        if let (Some(show), Some((s, e))) = (first_text(&html, SHOW_TITLE)?, query.episode_pair()) {
            located = located.with_title(format!("{show} {}", episode_tag(s, e)));
        }
        Ok(Some(located))
    }

    async fn extract(
        &self,
        located: &Located<SeriesHandle>,
        query: &StreamQuery,
    ) -> Result<Vec<StreamCandidate>> {
        let Some((season, episode)) = query.episode_pair() else {
            return Ok(Vec::new());
        };
        let tasks = self
            .languages
            .iter()
            .map(|lang| (lang, self.fetch_language(located, season, episode, lang)));
        Ok(fan_in(self.id(), tasks).await)
    }
}
