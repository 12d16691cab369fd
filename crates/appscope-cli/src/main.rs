use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use appscope_client::{ListingExtractor, ReqwestFetcher};
use appscope_core::models::AppRecord;
use appscope_core::traits::Extractor;
use appscope_core::{LookupConfig, LookupService, RecordCache, compute_hash, identifier};

#[derive(Parser)]
#[command(name = "appscope", version, about = "Storefront listing lookups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and extract listings for one or more package names
    Lookup {
        /// Package names (e.g. "com.whatsapp")
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Pretty-print each record
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Extract a listing from a saved HTML page, without any network access
    Extract {
        /// Path to the saved listing page
        #[arg(short, long)]
        file: PathBuf,

        /// Package name the page belongs to
        #[arg(short, long)]
        id: String,

        /// Pretty-print the record
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("appscope=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup {
            identifiers,
            pretty,
        } => cmd_lookup(&identifiers, pretty).await,
        Commands::Extract { file, id, pretty } => cmd_extract(&file, &id, pretty),
    }
}

async fn cmd_lookup(identifiers: &[String], pretty: bool) -> Result<()> {
    let config = LookupConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        storefront = %config.storefront_url,
        timeout_secs = config.timeout.as_secs(),
        max_attempts = config.retry.max_attempts,
        cache_ttl_secs = config.cache_ttl.num_seconds(),
        "Starting lookups"
    );

    let fetcher = ReqwestFetcher::from_config(&config).context("Failed to create HTTP client")?;
    let cache = Arc::new(RecordCache::new(config.cache_ttl));
    let service = LookupService::new(fetcher, ListingExtractor::new(), cache, config.retry);

    let mut failed = 0usize;
    for raw in identifiers {
        match service.lookup(raw).await {
            Ok(lookup) => print_record(&lookup.record, pretty)?,
            Err(e) => {
                failed += 1;
                tracing::warn!(identifier = %raw, error = %e, "Lookup failed");
                eprintln!("{raw}: {}", e.user_message());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} lookups failed", identifiers.len());
    }
    Ok(())
}

fn cmd_extract(file: &Path, id: &str, pretty: bool) -> Result<()> {
    let id = identifier::validate(id).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read page: {}", file.display()))?;

    tracing::info!(
        identifier = %id,
        bytes = html.len(),
        page_hash = %&compute_hash(&html)[..8],
        "Extracting saved page"
    );

    let record = ListingExtractor::new()
        .extract(&id, &html)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    print_record(&record, pretty)
}

fn print_record(record: &AppRecord, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    println!("{json}");
    Ok(())
}
