//! The pipeline every adapter runs through.
//!
//! locate → extract → (classify + episode filter per candidate) → dedup → rank.
//! This is the only place adapter errors are downgraded to empty results.

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::classify::{classify_server, matches_episode, parse_size, Quality};
use super::provider::{Located, SiteAdapter, StreamCandidate, StreamDescriptor, StreamQuery};

/// Run one adapter for one query. Never fails.
pub async fn run<A>(adapter: &A, query: &StreamQuery) -> Vec<StreamDescriptor>
where
    A: SiteAdapter + ?Sized,
{
    let provider = adapter.id();

    if !adapter.accepts(query) {
        debug!(provider, media_type = %query.media_type, "Query not supported, skipping");
        return Vec::new();
    }

    let located = match adapter.locate(query).await {
        Ok(Some(located)) => located,
        Ok(None) => {
            info!(provider, catalog_id = %query.catalog_id, "No content found");
            return Vec::new();
        }
        Err(e) => {
            warn!(provider, catalog_id = %query.catalog_id, error = %e, "Locate failed");
            return Vec::new();
        }
    };

    let candidates = match adapter.extract(&located, query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(provider, error = %e, "Extraction failed");
            return Vec::new();
        }
    };
    let found = candidates.len();

    let descriptors = candidates
        .into_iter()
        .filter(|c| keep_for_episode(c, query))
        .filter_map(|c| describe(adapter, &located, query, c))
        .collect();

    let streams = dedup_and_rank(descriptors);
    info!(provider, candidates = found, count = streams.len(), "Extracted streams");
    streams
}

fn keep_for_episode(candidate: &StreamCandidate, query: &StreamQuery) -> bool {
    match query.episode_filter() {
        Some(episode) => matches_episode(&candidate.label, episode),
        None => true,
    }
}

/// Classify one candidate. Candidates whose URL is not absolute `http(s)`
/// are dropped.
fn describe<A, H>(
    adapter: &A,
    located: &Located<H>,
    query: &StreamQuery,
    candidate: StreamCandidate,
) -> Option<StreamDescriptor>
where
    A: SiteAdapter + ?Sized,
{
    if !is_playable_url(&candidate.url) {
        debug!(provider = adapter.id(), url = %candidate.url, "Dropping non-absolute URL");
        return None;
    }

    let quality = Quality::classify(&candidate.label);
    let server = candidate
        .server
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| classify_server(&candidate.url).to_string());
    let display_name = adapter.display_name();

    let title = match located.title {
        Some(ref title) => title.clone(),
        None => fallback_title(display_name, quality, query),
    };

    Some(StreamDescriptor {
        name: format!("{display_name} - {} [{quality}]", server.trim()),
        title,
        size: parse_size(&candidate.label),
        headers: adapter.profile().replay_headers(located.referer.as_deref()),
        provider: adapter.id().to_string(),
        quality,
        url: candidate.url,
    })
}

fn fallback_title(display_name: &str, quality: Quality, query: &StreamQuery) -> String {
    match query.episode_pair() {
        Some((s, e)) => format!("{display_name} • S{s:02}E{e:02} • {quality}"),
        None => format!("{display_name} • {quality}"),
    }
}

fn is_playable_url(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Drop repeated URLs (first occurrence wins), then sort by descending
/// quality tier. The sort is stable, so equal tiers keep extraction order.
pub fn dedup_and_rank(descriptors: Vec<StreamDescriptor>) -> Vec<StreamDescriptor> {
    let mut seen = HashSet::new();
    let mut unique: Vec<StreamDescriptor> = descriptors
        .into_iter()
        .filter(|d| seen.insert(d.url.clone()))
        .collect();
    unique.sort_by_key(|d| Reverse(d.quality.rank()));
    unique
}
