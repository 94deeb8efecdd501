//! Catalog ID → display title / release year.
//!
//! The default source is the TMDB v3 API. Adapters that search sites by
//! title depend on a [`MetadataSource`]; a lookup failure is an ordinary
//! `Err` that the adapter pipeline turns into an empty result.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;

use crate::error::{Result, ScrapeError};
use crate::http_client::Fetcher;
use crate::stream::MediaType;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

/// Resolved display metadata for a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleInfo {
    /// Localized title (`name` for TV, `title` for movies).
    pub title: String,
    /// Four-digit release / first-air year, if the source had a date.
    pub year: Option<String>,
}

impl TitleInfo {
    /// Site search query: `"{title} Season {season} {year}"` for TV with a
    /// season, `"{title} {year}"` otherwise. An unknown year is left out.
    pub fn search_query(&self, media_type: MediaType, season: Option<u32>) -> String {
        let mut parts = vec![self.title.clone()];
        if let (MediaType::Tv, Some(season)) = (media_type, season) {
            parts.push(format!("Season {season}"));
        }
        if let Some(ref year) = self.year {
            parts.push(year.clone());
        }
        parts.join(" ")
    }

    /// Human-readable title, e.g. `"Dexter (2006) S01E05"`.
    pub fn display(&self, season: Option<u32>, episode: Option<u32>) -> String {
        let mut out = match self.year {
            Some(ref year) => format!("{} ({year})", self.title),
            None => self.title.clone(),
        };
        if let (Some(s), Some(e)) = (season, episode) {
            out.push_str(&format!(" S{s:02}E{e:02}"));
        }
        out
    }
}

/// Source of title metadata keyed by catalog ID.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn resolve(&self, catalog_id: &str, media_type: MediaType) -> Result<TitleInfo>;
}

/// TMDB settings.
#[derive(Debug, Clone)]
pub struct TmdbOptions {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
}

impl Default for TmdbOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: TMDB_API_BASE.to_string(),
            language: "en-US".to_string(),
        }
    }
}

/// TMDB v3 metadata client.
pub struct TmdbClient {
    fetcher: Arc<dyn Fetcher>,
    options: TmdbOptions,
}

impl TmdbClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, options: TmdbOptions) -> Self {
        Self { fetcher, options }
    }

    fn details_url(&self, api_key: &str, catalog_id: &str, media_type: MediaType) -> String {
        let kind = match media_type {
            MediaType::Tv => "tv",
            MediaType::Movie => "movie",
        };
        format!(
            "{}/{kind}/{}?api_key={}&language={}",
            self.options.base_url.trim_end_matches('/'),
            urlencoding::encode(catalog_id),
            urlencoding::encode(api_key),
            urlencoding::encode(&self.options.language),
        )
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn resolve(&self, catalog_id: &str, media_type: MediaType) -> Result<TitleInfo> {
        let api_key = self
            .options
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScrapeError::Metadata("no TMDB API key configured".to_string()))?;

        let url = self.details_url(api_key, catalog_id, media_type);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let body = self.fetcher.get_text(&url, &headers).await?;
        let details: TmdbDetails = serde_json::from_str(&body)?;
        details.into_title_info(media_type)
    }
}

#[derive(Debug, Deserialize)]
struct TmdbDetails {
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
}

impl TmdbDetails {
    fn into_title_info(self, media_type: MediaType) -> Result<TitleInfo> {
        let (title, date) = match media_type {
            MediaType::Tv => (self.name, self.first_air_date),
            MediaType::Movie => (self.title, self.release_date),
        };
        let title = title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ScrapeError::Metadata("response has no title".to_string()))?;
        Ok(TitleInfo {
            title: title.trim().to_string(),
            year: date.as_deref().and_then(leading_year),
        })
    }
}

/// Leading `YYYY` of a `YYYY-MM-DD` date string.
fn leading_year(date: &str) -> Option<String> {
    let year = date.split('-').next()?;
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then(|| year.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetcher;

    fn tmdb(fetcher: FakeFetcher, api_key: Option<&str>) -> (Arc<FakeFetcher>, TmdbClient) {
        let fetcher = Arc::new(fetcher);
        let options = TmdbOptions {
            api_key: api_key.map(str::to_string),
            ..TmdbOptions::default()
        };
        (fetcher.clone(), TmdbClient::new(fetcher, options))
    }

    #[test]
    fn search_query_for_tv_includes_season() {
        let info = TitleInfo {
            title: "Dexter".to_string(),
            year: Some("2006".to_string()),
        };
        assert_eq!(info.search_query(MediaType::Tv, Some(1)), "Dexter Season 1 2006");
        assert_eq!(info.search_query(MediaType::Tv, None), "Dexter 2006");
        assert_eq!(info.search_query(MediaType::Movie, Some(3)), "Dexter 2006");
    }

    #[test]
    fn search_query_without_year() {
        let info = TitleInfo {
            title: "Oppenheimer".to_string(),
            year: None,
        };
        assert_eq!(info.search_query(MediaType::Movie, None), "Oppenheimer");
    }

    #[test]
    fn display_embeds_episode() {
        let info = TitleInfo {
            title: "Dexter".to_string(),
            year: Some("2006".to_string()),
        };
        assert_eq!(info.display(Some(1), Some(5)), "Dexter (2006) S01E05");
        assert_eq!(info.display(None, None), "Dexter (2006)");
    }

    #[test]
    fn leading_year_parses_dates() {
        assert_eq!(leading_year("2023-07-19").as_deref(), Some("2023"));
        assert_eq!(leading_year(""), None);
        assert_eq!(leading_year("soon"), None);
    }

    #[tokio::test]
    async fn resolves_movie_title_and_year() {
        let url = "https://api.themoviedb.org/3/movie/872585?api_key=k&language=en-US";
        let (_, client) = tmdb(
            FakeFetcher::new().with_body(
                url,
                r#"{"title":"Oppenheimer","release_date":"2023-07-19","name":null}"#,
            ),
            Some("k"),
        );
        let info = client.resolve("872585", MediaType::Movie).await.unwrap();
        assert_eq!(info.title, "Oppenheimer");
        assert_eq!(info.year.as_deref(), Some("2023"));
    }

    #[tokio::test]
    async fn resolves_tv_name_and_first_air_date() {
        let url = "https://api.themoviedb.org/3/tv/1405?api_key=k&language=en-US";
        let (_, client) = tmdb(
            FakeFetcher::new().with_body(url, r#"{"name":"Dexter","first_air_date":"2006-10-01"}"#),
            Some("k"),
        );
        let info = client.resolve("1405", MediaType::Tv).await.unwrap();
        assert_eq!(info.title, "Dexter");
        assert_eq!(info.year.as_deref(), Some("2006"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_fetching() {
        let (fetcher, client) = tmdb(FakeFetcher::new(), None);
        let err = client.resolve("1", MediaType::Movie).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Metadata(_)));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn http_and_parse_failures_are_errors() {
        let (_, client) = tmdb(FakeFetcher::new(), Some("k"));
        assert!(client.resolve("1", MediaType::Movie).await.is_err());

        let url = "https://api.themoviedb.org/3/movie/2?api_key=k&language=en-US";
        let (_, client) = tmdb(FakeFetcher::new().with_body(url, "<html>"), Some("k"));
        let err = client.resolve("2", MediaType::Movie).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Json(_)));
    }
}
