//! HTTP API handlers

pub mod enrich;
pub mod health;
pub mod sse;

pub use enrich::enrich_routes;
pub use health::health_routes;
pub use sse::event_stream;
