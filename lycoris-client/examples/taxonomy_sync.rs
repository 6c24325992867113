//! Sync the tag and genre catalogs into the local cache
//!
//! ```text
//! BACKEND_URI=https://api.example.com/ cargo run -p lycoris-client --example taxonomy_sync -- 5 12 9999
//! ```
//!
//! The trailing arguments are tag ids to resolve after the sync.

use lycoris_client::{CatalogKind, ConsoleClient, ConsoleConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lycoris_client=debug".into()),
        )
        .init();

    let config = ConsoleConfig::from_env()?;
    let console = ConsoleClient::from_config(&config)?;

    if console.catalog.init_from_storage() {
        tracing::info!("catalogs restored from {}", config.cache_dir.display());
    }
    let (tags, genres) = console.catalog.ensure_all().await?;
    tracing::info!(tags = tags.len(), genres = genres.len(), "catalogs ready");

    let ids: Vec<u64> = std::env::args()
        .skip(1)
        .map(|arg| arg.parse())
        .collect::<Result<_, _>>()?;
    for (id, name) in ids
        .iter()
        .zip(console.catalog.resolve_names(CatalogKind::Tag, &ids))
    {
        println!("{:>8}  {}", id, name);
    }

    Ok(())
}
