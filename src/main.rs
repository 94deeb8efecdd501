//! `streamseek` CLI - resolve ranked stream candidates for a movie or episode

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streamseek::{Config, MediaType, StreamQuery};

use cmd::{cmd_providers, cmd_streams, StreamsOptions};

#[derive(Parser)]
#[command(name = "streamseek")]
#[command(about = "Resolve ranked stream candidates for movies and TV episodes")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/streamseek/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find streams for a catalog ID
    Streams {
        /// Catalog (TMDB) ID
        catalog_id: String,

        /// Media type: movie or tv
        #[arg(short = 't', long = "type", default_value = "movie")]
        media_type: MediaType,

        /// Season number (tv)
        #[arg(short, long)]
        season: Option<u32>,

        /// Episode number (tv)
        #[arg(short, long)]
        episode: Option<u32>,

        /// Only query these providers (repeatable)
        #[arg(short, long = "provider", value_name = "ID")]
        providers: Vec<String>,

        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,

        /// Show the headers to replay for each stream
        #[arg(long)]
        headers: bool,

        /// Per-provider deadline in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// List the enabled providers
    Providers,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "streamseek=debug" } else { "info" })
    });

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Streams {
            catalog_id,
            media_type,
            season,
            episode,
            providers,
            json,
            headers,
            timeout,
        } => {
            let query = StreamQuery {
                catalog_id,
                media_type,
                season,
                episode,
            };
            let options = StreamsOptions {
                providers,
                json,
                headers,
                timeout,
            };
            cmd_streams(&config, &query, &options).await?;
        }
        Commands::Providers => {
            cmd_providers(&config)?;
        }
    }

    Ok(())
}
