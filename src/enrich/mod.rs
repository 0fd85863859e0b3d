//! Enrichment pipeline
//!
//! Per-ISBN enrichment in three stages: the sequential marketplace-domain
//! resolver, the priority merge across the three providers, and the bounded
//! concurrent fan-out over the full ISBN list.

pub mod merger;
pub mod pipeline;
pub mod resolver;

pub use merger::merge_sources;
pub use pipeline::{Enricher, MAX_CONCURRENT_LOOKUPS};
pub use resolver::{resolve_serp, SerpResolution, SERP_DOMAIN_PRIORITY};
