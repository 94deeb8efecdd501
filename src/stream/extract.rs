//! Markup helpers shared by the candidate extractors.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, ScrapeError};

/// Anchor found in a document, with its href already made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub url: String,
    /// The anchor's own visible text.
    pub text: String,
    /// Visible text of the anchor's immediate parent element.
    pub context: String,
}

impl Anchor {
    /// Anchor text followed by container text, the classification input.
    pub fn label(&self) -> String {
        if self.context.is_empty() {
            self.text.clone()
        } else {
            format!("{} {}", self.text, self.context)
        }
    }
}

/// Parse an adapter base URL so relative joins stay under it: the path
/// always ends with `/`, query and fragment are dropped.
pub fn site_base(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e:?}")))
}

/// Visible text of an element with whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve an href against the site origin. Returns `None` for empty,
/// fragment-only and non-`http(s)` links.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
}

/// All anchors matching `css`, in document order.
pub fn collect_anchors(html: &str, base: &Url, css: &str) -> Result<Vec<Anchor>> {
    let document = Html::parse_document(html);
    let selector = selector(css)?;

    let anchors = document
        .select(&selector)
        .filter_map(|element| {
            let url = resolve_href(base, element.value().attr("href")?)?;
            let context = element
                .parent()
                .and_then(ElementRef::wrap)
                .map(element_text)
                .unwrap_or_default();
            Some(Anchor {
                url,
                text: element_text(element),
                context,
            })
        })
        .collect();

    Ok(anchors)
}

/// Text of the first element matching `css`, if any.
pub fn first_text(html: &str, css: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let selector = selector(css)?;
    Ok(document
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty()))
}

/// Same site as `base` (scheme + host + port).
pub fn same_origin(base: &Url, url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| u.origin() == base.origin())
}
