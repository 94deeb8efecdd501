//! HTTP transport used by adapters.
//!
//! Adapters never talk to `reqwest` directly; they go through the
//! [`Fetcher`] trait so the same adapter code runs against the live
//! [`HttpFetcher`] or an in-memory double in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::error::{Result, ScrapeError};

/// Minimal transport contract: fetch a document as text.
///
/// Implementations must map non-2xx responses to [`ScrapeError::Status`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `GET` a URL and return the body text.
    async fn get_text(&self, url: &str, headers: &HeaderMap) -> Result<String>;

    /// `POST` an `application/x-www-form-urlencoded` body and return the body text.
    async fn post_form(
        &self,
        url: &str,
        headers: &HeaderMap,
        form: &[(&str, String)],
    ) -> Result<String>;
}

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// `reqwest`-backed [`Fetcher`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_options(HttpOptions::default())
    }

    pub fn with_options(options: HttpOptions) -> Result<Self> {
        let client = Client::builder()
            // Connection reuse across sub-fetches of the same site
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            // Compression (auto-negotiated via Accept-Encoding)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            // Search pages set session cookies that later requests expect
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn read_body(response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        debug!(
            status = %status,
            version = ?response.version(),
            "Response received"
        );
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self, headers), fields(url = %url))]
    async fn get_text(&self, url: &str, headers: &HeaderMap) -> Result<String> {
        debug!("GET");
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await?;
        Self::read_body(response).await
    }

    #[instrument(skip(self, headers, form), fields(url = %url))]
    async fn post_form(
        &self,
        url: &str,
        headers: &HeaderMap,
        form: &[(&str, String)],
    ) -> Result<String> {
        debug!("POST form");
        let body = encode_form(form);
        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body)
            .send()
            .await?;
        Self::read_body(response).await
    }
}

/// Encode `key=value` pairs as an urlencoded form body.
pub fn encode_form(form: &[(&str, String)]) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
