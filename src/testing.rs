//! In-memory test doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::{Result, ScrapeError};
use crate::http_client::{encode_form, Fetcher};
use crate::metadata::{MetadataSource, TitleInfo};
use crate::stream::MediaType;

enum Canned {
    Body(String),
    Status(u16),
}

/// Serves canned bodies by exact URL and records every request.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<String>>,
    forms: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Body(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Status(status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn forms(&self) -> Vec<String> {
        self.forms.lock().unwrap().clone()
    }

    fn respond(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(ScrapeError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn get_text(&self, url: &str, _headers: &HeaderMap) -> Result<String> {
        self.respond(url)
    }

    async fn post_form(
        &self,
        url: &str,
        _headers: &HeaderMap,
        form: &[(&str, String)],
    ) -> Result<String> {
        self.forms.lock().unwrap().push(encode_form(form));
        self.respond(url)
    }
}

/// Metadata source with a fixed answer (or a fixed failure).
pub struct FixedMetadata(pub Option<TitleInfo>);

impl FixedMetadata {
    pub fn title(title: &str, year: &str) -> Self {
        Self(Some(TitleInfo {
            title: title.to_string(),
            year: Some(year.to_string()),
        }))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl MetadataSource for FixedMetadata {
    async fn resolve(&self, catalog_id: &str, _media_type: MediaType) -> Result<TitleInfo> {
        self.0
            .clone()
            .ok_or_else(|| ScrapeError::Metadata(format!("no title for {catalog_id}")))
    }
}
