//! isbn-enrich - ISBN enrichment service
//!
//! Accepts an uploaded workbook with an ISBN column, enriches every ISBN
//! against SerpApi (Amazon search), ISBNdb, and Google Books with bounded
//! parallelism, and serves a provenance-colored xlsx back, with live
//! progress over SSE.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use isbn_enrich::enrich::Enricher;
use isbn_enrich::events::EventBus;
use isbn_enrich::providers::{GoogleBooksClient, IsbndbClient, SerpClient};
use isbn_enrich::{build_router, config, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting isbn-enrich service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve credentials; a missing key aborts startup.
    let config_path = config::config_path();
    let toml_config = config::load_toml_config(&config_path)?;
    let enrich_config = config::resolve(&toml_config)?;

    // Build provider clients and the enrichment engine.
    let serp = SerpClient::new(enrich_config.serp_api_key.clone())?;
    let isbndb = IsbndbClient::new(enrich_config.isbndb_api_key.clone())?;
    let google = GoogleBooksClient::new()?;
    let enricher = Enricher::new(serp, isbndb, google);
    info!("Provider clients initialized");

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    let state = AppState::new(enricher, event_bus);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&enrich_config.bind_address).await?;
    info!("Listening on http://{}", enrich_config.bind_address);
    info!("Health check: http://{}/health", enrich_config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
