//! External data provider clients
//!
//! Three independent, stateless lookups: SerpApi Amazon search, ISBNdb,
//! and Google Books. Each module exposes a typed `fetch` whose failures are
//! visible in the signature, plus a fail-closed trait implementation that
//! collapses every error into an empty [`PartialRecord`] so nothing
//! propagates past the client boundary.
//!
//! The traits are the seams for deterministic test stubs; production code
//! wires in the concrete reqwest-backed clients.

pub mod google_books_client;
pub mod isbndb_client;
pub mod serp_client;

pub use google_books_client::{GoogleBooksClient, GoogleBooksError};
pub use isbndb_client::{IsbndbClient, IsbndbError};
pub use serp_client::{SerpClient, SerpError};

use crate::types::PartialRecord;
use async_trait::async_trait;

/// Commerce-search lookup against one Amazon marketplace domain.
#[async_trait]
pub trait AmazonSearch: Send + Sync {
    /// Best-effort search; any failure yields an empty record.
    async fn search(&self, isbn: &str, domain: &str) -> PartialRecord;
}

/// Book-metadata lookup (ISBNdb).
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Best-effort lookup; any failure yields an empty record.
    async fn lookup(&self, isbn: &str) -> PartialRecord;
}

/// General catalog lookup (Google Books).
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Best-effort lookup; any failure yields an empty record.
    async fn lookup(&self, isbn: &str) -> PartialRecord;
}
