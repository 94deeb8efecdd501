//! Adapter-scoped request profiles.
//!
//! Each adapter is constructed with one immutable [`RequestProfile`]. The
//! same headers are sent on every site request and attached to every
//! returned descriptor: hosters reject media fetches whose Referer or
//! User-Agent do not match the page the link came from.

use std::collections::BTreeMap;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT,
};

/// Desktop Chrome on Windows, the most common fingerprint on these sites.
pub const CHROME_WINDOWS_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Headers an adapter presents to its site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
    pub origin: Option<String>,
    /// Additional headers in insertion order (e.g. `Sec-Fetch-Mode`).
    pub extra: Vec<(String, String)>,
}

impl RequestProfile {
    /// Chrome/Windows browser profile with an HTML `Accept` header.
    #[must_use]
    pub fn chrome() -> Self {
        Self {
            user_agent: CHROME_WINDOWS_UA.to_string(),
            accept: HTML_ACCEPT.to_string(),
            accept_language: None,
            referer: None,
            origin: None,
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    #[must_use]
    pub fn referer(mut self, value: impl Into<String>) -> Self {
        self.referer = Some(value.into());
        self
    }

    #[must_use]
    pub fn origin(mut self, value: impl Into<String>) -> Self {
        self.origin = Some(value.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Header map for outgoing site requests.
    ///
    /// Values that are not valid header text are skipped with a warning
    /// rather than failing the request.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        insert(&mut headers, USER_AGENT, &self.user_agent);
        insert(&mut headers, ACCEPT, &self.accept);
        if let Some(ref lang) = self.accept_language {
            insert(&mut headers, ACCEPT_LANGUAGE, lang);
        }
        if let Some(ref referer) = self.referer {
            insert(&mut headers, REFERER, referer);
        }
        if let Some(ref origin) = self.origin {
            insert(&mut headers, ORIGIN, origin);
        }
        for (name, value) in &self.extra {
            match HeaderName::from_bytes(name.as_bytes()) {
                Ok(name) => insert(&mut headers, name, value),
                Err(_) => tracing::warn!(header = %name, "Skipping invalid header name"),
            }
        }

        headers
    }

    /// Header map attached to descriptors for the consumer to replay.
    ///
    /// `referer` overrides the profile's own Referer when the stream was
    /// found on a page other than the site root.
    pub fn replay_headers(&self, referer: Option<&str>) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("User-Agent".to_string(), self.user_agent.clone());
        map.insert("Accept".to_string(), self.accept.clone());
        if let Some(ref lang) = self.accept_language {
            map.insert("Accept-Language".to_string(), lang.clone());
        }
        if let Some(referer) = referer.or(self.referer.as_deref()) {
            map.insert("Referer".to_string(), referer.to_string());
        }
        if let Some(ref origin) = self.origin {
            map.insert("Origin".to_string(), origin.clone());
        }
        for (name, value) in &self.extra {
            map.insert(name.clone(), value.clone());
        }
        map
    }
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self::chrome()
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "Skipping invalid header value"),
    }
}
