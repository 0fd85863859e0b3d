//! isbn-enrich library interface
//!
//! Enriches ISBN lists with bibliographic and pricing data from three
//! external providers (SerpApi Amazon search, ISBNdb, Google Books),
//! merges per-field with a fixed source priority, and exports a
//! provenance-colored spreadsheet.

pub mod api;
pub mod config;
pub mod enrich;
pub mod error;
pub mod events;
pub mod models;
pub mod providers;
pub mod spreadsheet;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::enrich::Enricher;
use crate::events::EventBus;
use crate::models::EnrichmentSession;
use crate::providers::{GoogleBooksClient, IsbndbClient, SerpClient};

/// Production enricher over the concrete reqwest-backed clients.
pub type LiveEnricher = Enricher<SerpClient, IsbndbClient, GoogleBooksClient>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Shared enrichment engine
    pub enricher: Arc<LiveEnricher>,
    /// In-memory session registry (no persistence across runs)
    pub sessions: Arc<RwLock<HashMap<Uuid, EnrichmentSession>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(enricher: LiveEnricher, event_bus: EventBus) -> Self {
        Self {
            event_bus,
            enricher: Arc::new(enricher),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::enrich_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .with_state(state)
}
