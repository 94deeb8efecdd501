use std::sync::Arc;

use anyhow::Result;

use streamseek::{Config, HttpFetcher, ProviderRegistry, StreamProvider};

pub fn cmd_providers(config: &Config) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::with_options(config.http_options())?);
    let registry = ProviderRegistry::from_config(config, fetcher)?;

    for provider in registry.providers() {
        println!("{:<12} {}", provider.id(), provider.name());
    }
    eprintln!("\n({} providers)", registry.providers().len());
    Ok(())
}
