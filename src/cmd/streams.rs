use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use streamseek::{Config, HttpFetcher, ProviderRegistry, StreamQuery};

use super::output::{print_json, print_table};

/// Flags of the `streams` subcommand that are not part of the query.
pub struct StreamsOptions {
    pub providers: Vec<String>,
    pub json: bool,
    pub headers: bool,
    pub timeout: Option<u64>,
}

pub async fn cmd_streams(
    config: &Config,
    query: &StreamQuery,
    options: &StreamsOptions,
) -> Result<()> {
    let fetcher = Arc::new(
        HttpFetcher::with_options(config.http_options()).context("failed to build HTTP client")?,
    );
    let registry = ProviderRegistry::from_config(config, fetcher)?.select(&options.providers)?;

    let deadline = options
        .timeout
        .map_or_else(|| config.provider_timeout(), Duration::from_secs);

    if !options.json {
        eprintln!(
            "🔎 {} {} via {} provider(s)",
            query.media_type,
            describe_query(query),
            registry.providers().len()
        );
    }

    let streams = registry.get_all_streams(query, deadline).await;

    if options.json {
        print_json(&streams)?;
    } else {
        print_table(&streams, options.headers);
    }
    Ok(())
}

fn describe_query(query: &StreamQuery) -> String {
    match (query.season, query.episode) {
        (Some(s), Some(e)) => format!("{} S{s:02}E{e:02}", query.catalog_id),
        (Some(s), None) => format!("{} S{s:02}", query.catalog_id),
        _ => query.catalog_id.clone(),
    }
}
