//! HDHub4u provider (search-based locator)
//!
//! Resolves the title through the metadata source, searches the site, picks
//! the first plausible result page and scrapes its download links.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::http_client::Fetcher;
use crate::metadata::MetadataSource;
use crate::profile::RequestProfile;
use crate::stream::extract::{collect_anchors, same_origin, site_base};
use crate::stream::provider::{Located, SiteAdapter, StreamCandidate, StreamQuery};

pub const HDHUB4U_BASE: &str = "https://hdhub4u.rehab";

/// Search result anchors, checked in document order.
const SEARCH_RESULTS: &str = "article .entry-header a, .movie-item a, h2 a, h3 a";

/// Download links on a content page: heading anchors, labelled buttons and
/// anchors pointing at known hosters.
const DOWNLOAD_LINKS: &str = r#"h3 a, h4 a, .download-btn a, a[href*="hubcloud"], a[href*="pixeldrain"], a[href*="streamtape"], a[href*="hubdrive"]"#;

/// Result-title markers that make a search hit worth following.
const RESULT_MARKERS: [&str; 3] = ["1080p", "4k", "web-dl"];

pub struct Hdhub4uProvider {
    fetcher: Arc<dyn Fetcher>,
    metadata: Arc<dyn MetadataSource>,
    base: Url,
    profile: RequestProfile,
}

impl Hdhub4uProvider {
    pub fn new(fetcher: Arc<dyn Fetcher>, metadata: Arc<dyn MetadataSource>) -> Result<Self> {
        Self::with_base_url(fetcher, metadata, HDHUB4U_BASE)
    }

    pub fn with_base_url(
        fetcher: Arc<dyn Fetcher>,
        metadata: Arc<dyn MetadataSource>,
        base_url: &str,
    ) -> Result<Self> {
        let base = site_base(base_url)?;
        let profile = RequestProfile::chrome().referer(base.as_str());
        Ok(Self {
            fetcher,
            metadata,
            base,
            profile,
        })
    }

    fn search_url(&self, query: &str) -> String {
        let mut url = self.base.clone();
        url.set_query(Some(&format!("s={}", urlencoding::encode(query))));
        url.into()
    }
}

/// First search hit on the site whose text carries a quality marker or the
/// first word of the query.
fn find_content_page(html: &str, base: &Url, query: &str) -> Result<Option<String>> {
    let first_word = query
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let hit = collect_anchors(html, base, SEARCH_RESULTS)?
        .into_iter()
        .filter(|anchor| same_origin(base, &anchor.url))
        .find(|anchor| {
            let text = anchor.text.to_lowercase();
            RESULT_MARKERS.iter().any(|m| text.contains(m))
                || (!first_word.is_empty() && text.contains(&first_word))
        });

    Ok(hit.map(|anchor| anchor.url))
}

#[async_trait]
impl SiteAdapter for Hdhub4uProvider {
    type Handle = String;

    fn id(&self) -> &'static str {
        "hdhub4u"
    }

    fn display_name(&self) -> &'static str {
        "HDHub4u"
    }

    fn profile(&self) -> &RequestProfile {
        &self.profile
    }

    async fn locate(&self, query: &StreamQuery) -> Result<Option<Located<String>>> {
        let info = self
            .metadata
            .resolve(&query.catalog_id, query.media_type)
            .await?;
        let search = info.search_query(query.media_type, query.season);
        debug!(provider = "hdhub4u", query = %search, "Searching");

        let html = self
            .fetcher
            .get_text(&self.search_url(&search), &self.profile.to_headers())
            .await?;

        let Some(page) = find_content_page(&html, &self.base, &search)? else {
            return Ok(None);
        };
        debug!(provider = "hdhub4u", url = %page, "Content page");

        Ok(Some(
            Located::new(page).with_title(info.display(query.season, query.episode)),
        ))
    }

    async fn extract(
        &self,
        located: &Located<String>,
        _query: &StreamQuery,
    ) -> Result<Vec<StreamCandidate>> {
        let html = self
            .fetcher
            .get_text(&located.handle, &self.profile.to_headers())
            .await?;

        let candidates = collect_anchors(&html, &self.base, DOWNLOAD_LINKS)?
            .into_iter()
            .map(|anchor| StreamCandidate::new(anchor.url.clone(), anchor.label()))
            .collect();
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Quality, StreamProvider};
    use crate::testing::{FakeFetcher, FixedMetadata};

    const BASE: &str = "https://hdhub4u.test";

    const SEARCH_HTML: &str = r#"
        <html><body>
          <h2><a href="https://elsewhere.example/oppenheimer">Oppenheimer 2023 1080p mirror</a></h2>
          <article><div class="entry-header"><a href="/trailer-collection/">Trailer collection</a></div></article>
          <div class="movie-item"><a href="/oppenheimer-2023-hindi-english/">Oppenheimer (2023) WEB-DL 4K</a></div>
          <h3><a href="/another/">Oppenheimer BluRay</a></h3>
        </body></html>
    "#;

    const MOVIE_PAGE: &str = r#"
        <html><body>
          <h3><a href="https://hubcloud.club/drive/u1">Oppenheimer.2023.1080p.WEB-DL [2.6GB]</a></h3>
          <h3><a href="https://hubcloud.club/drive/u2">Oppenheimer.2023.2160p.4K.UHD [18GB]</a></h3>
          <h4><a href="https://pixeldrain.com/u/u3">480p [400MB]</a></h4>
          <div class="download-btn"><a href="https://hubcloud.club/drive/u1">Mirror of 1080p</a></div>
          <p><a href="/wp-login.php">Login</a></p>
        </body></html>
    "#;

    const SEASON_PAGE: &str = r#"
        <html><body>
          <h4><a href="https://hubdrive.space/file/e4">Dexter S01E04 720p</a></h4>
          <h4><a href="https://hubdrive.space/file/e5">Dexter S01E05 720p</a></h4>
          <h4><a href="https://hubcloud.club/drive/e5">Episode 5 1080p</a></h4>
          <h3><a href="https://hubcloud.club/drive/pack">Season 1 Pack 1080p</a></h3>
        </body></html>
    "#;

    fn provider(fetcher: &Arc<FakeFetcher>, metadata: FixedMetadata) -> Hdhub4uProvider {
        Hdhub4uProvider::with_base_url(fetcher.clone(), Arc::new(metadata), BASE).unwrap()
    }

    #[test]
    fn search_picks_first_on_site_match() {
        let base = Url::parse(BASE).unwrap();
        let page = find_content_page(SEARCH_HTML, &base, "Oppenheimer 2023").unwrap();
        assert_eq!(
            page.as_deref(),
            Some("https://hdhub4u.test/oppenheimer-2023-hindi-english/")
        );
    }

    #[test]
    fn search_without_plausible_hit_is_none() {
        let base = Url::parse(BASE).unwrap();
        let html = r#"<h2><a href="/about/">About us</a></h2>"#;
        assert_eq!(find_content_page(html, &base, "Oppenheimer 2023").unwrap(), None);
    }

    #[tokio::test]
    async fn movie_streams_are_ranked_and_deduplicated() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_body("https://hdhub4u.test/?s=Oppenheimer%202023", SEARCH_HTML)
                .with_body(
                    "https://hdhub4u.test/oppenheimer-2023-hindi-english/",
                    MOVIE_PAGE,
                ),
        );
        let provider = provider(&fetcher, FixedMetadata::title("Oppenheimer", "2023"));
        let streams = provider.get_streams(&StreamQuery::movie("872585")).await;

        let urls: Vec<&str> = streams.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://hubcloud.club/drive/u2",
                "https://hubcloud.club/drive/u1",
                "https://pixeldrain.com/u/u3",
            ]
        );
        assert_eq!(streams[0].quality, Quality::FourK);
        assert_eq!(streams[0].name, "HDHub4u - HubCloud [4K]");
        assert_eq!(streams[0].size, "18 GB");
        assert_eq!(streams[0].title, "Oppenheimer (2023)");
        assert_eq!(streams[0].provider, "hdhub4u");
        assert_eq!(streams[0].headers["Referer"], "https://hdhub4u.test/");
        assert_eq!(streams[2].quality, Quality::P480);
        assert_eq!(streams[2].name, "HDHub4u - Pixeldrain [480p]");
    }

    #[tokio::test]
    async fn tv_request_filters_other_episodes() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_body(
                    "https://hdhub4u.test/?s=Dexter%20Season%201%202006",
                    r#"<h2><a href="/dexter-season-1/">Dexter Season 1 WEB-DL</a></h2>"#,
                )
                .with_body("https://hdhub4u.test/dexter-season-1/", SEASON_PAGE),
        );
        let provider = provider(&fetcher, FixedMetadata::title("Dexter", "2006"));
        let streams = provider.get_streams(&StreamQuery::episode("1405", 1, 5)).await;

        let urls: Vec<&str> = streams.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://hubcloud.club/drive/e5", "https://hubdrive.space/file/e5"]
        );
        assert_eq!(streams[0].title, "Dexter (2006) S01E05");
        assert_eq!(streams[1].name, "HDHub4u - HubDrive [720p]");
    }

    #[tokio::test]
    async fn no_search_match_resolves_empty_without_page_fetch() {
        let fetcher = Arc::new(FakeFetcher::new().with_body(
            "https://hdhub4u.test/?s=Oppenheimer%202023",
            r#"<h2><a href="/about/">About us</a></h2>"#,
        ));
        let provider = provider(&fetcher, FixedMetadata::title("Oppenheimer", "2023"));
        let streams = provider.get_streams(&StreamQuery::movie("872585")).await;

        assert!(streams.is_empty());
        assert_eq!(fetcher.calls(), ["https://hdhub4u.test/?s=Oppenheimer%202023"]);
    }

    #[tokio::test]
    async fn mirror_base_with_path_keeps_prefix() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_body(
                    "https://mirror.test/hub/?s=Oppenheimer%202023",
                    r#"<h2><a href="oppenheimer-2023/">Oppenheimer 2023 1080p</a></h2>"#,
                )
                .with_body("https://mirror.test/hub/oppenheimer-2023/", MOVIE_PAGE),
        );
        let provider = Hdhub4uProvider::with_base_url(
            fetcher.clone(),
            Arc::new(FixedMetadata::title("Oppenheimer", "2023")),
            "https://mirror.test/hub",
        )
        .unwrap();
        let streams = provider.get_streams(&StreamQuery::movie("872585")).await;

        assert_eq!(streams.len(), 3);
        assert_eq!(streams[0].headers["Referer"], "https://mirror.test/hub/");
        assert_eq!(
            fetcher.calls(),
            [
                "https://mirror.test/hub/?s=Oppenheimer%202023",
                "https://mirror.test/hub/oppenheimer-2023/",
            ]
        );
    }

    #[tokio::test]
    async fn metadata_failure_resolves_empty_without_fetching() {
        let fetcher = Arc::new(FakeFetcher::new());
        let provider = provider(&fetcher, FixedMetadata::failing());
        let streams = provider.get_streams(&StreamQuery::movie("872585")).await;

        assert!(streams.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn content_page_error_resolves_empty() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_body("https://hdhub4u.test/?s=Oppenheimer%202023", SEARCH_HTML)
                .with_status("https://hdhub4u.test/oppenheimer-2023-hindi-english/", 503),
        );
        let provider = provider(&fetcher, FixedMetadata::title("Oppenheimer", "2023"));
        assert!(provider
            .get_streams(&StreamQuery::movie("872585"))
            .await
            .is_empty());
    }
}
