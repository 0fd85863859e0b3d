//! Google Books API client
//!
//! Keyless lookup against the public volumes endpoint. Supplies title,
//! author (comma-joined), publisher, page count, and the first listed
//! category; never supplies a price. A response without items counts as a
//! failure.

use crate::providers::CatalogLookup;
use crate::types::{Field, PartialRecord, Value};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Google Books client errors
#[derive(Debug, Error)]
pub enum GoogleBooksError {
    /// Network communication error or timeout
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Google Books returned a non-success status
    #[error("API error {0}")]
    ApiError(u16),

    /// No volume matched the ISBN
    #[error("No volumes found for ISBN {0}")]
    NotFound(String),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Volumes search response (only the part we consume)
#[derive(Debug, Clone, Deserialize)]
pub struct VolumesResponse {
    #[serde(default)]
    pub items: Vec<VolumeItem>,
}

/// One matched volume
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

/// Bibliographic details of a volume
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    #[serde(rename = "pageCount")]
    pub page_count: Option<i64>,
    pub categories: Option<Vec<String>>,
}

/// Google Books API client
pub struct GoogleBooksClient {
    http_client: reqwest::Client,
}

impl GoogleBooksClient {
    pub fn new() -> Result<Self, GoogleBooksError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GoogleBooksError::NetworkError(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Look up one ISBN via `q=isbn:{isbn}`. An empty item list is a
    /// failure, not an empty success.
    pub async fn fetch(&self, isbn: &str) -> Result<PartialRecord, GoogleBooksError> {
        let query = format!("isbn:{}", isbn);

        let response = self
            .http_client
            .get(GOOGLE_BOOKS_BASE_URL)
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|e| GoogleBooksError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GoogleBooksError::ApiError(status.as_u16()));
        }

        let data: VolumesResponse = response
            .json()
            .await
            .map_err(|e| GoogleBooksError::ParseError(e.to_string()))?;

        let first = data
            .items
            .first()
            .ok_or_else(|| GoogleBooksError::NotFound(isbn.to_string()))?;

        Ok(extract_record(&first.volume_info))
    }
}

#[async_trait]
impl CatalogLookup for GoogleBooksClient {
    async fn lookup(&self, isbn: &str) -> PartialRecord {
        match self.fetch(isbn).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(
                    isbn = %isbn,
                    error = %e,
                    "Google Books lookup failed, treating as empty"
                );
                PartialRecord::new()
            }
        }
    }
}

/// Map volume info to a partial record. Price is never supplied by this
/// provider; category takes the first entry of the category list.
fn extract_record(info: &VolumeInfo) -> PartialRecord {
    let mut record = PartialRecord::new();
    record.insert(
        Field::Title,
        info.title.as_ref().map(|t| Value::text(t.clone())),
    );
    record.insert(
        Field::Author,
        info.authors.as_ref().map(|a| Value::text(a.join(", "))),
    );
    record.insert(
        Field::Publisher,
        info.publisher.as_ref().map(|p| Value::text(p.clone())),
    );
    record.insert(
        Field::NumberOfPages,
        info.page_count.map(|n| Value::number(n as f64)),
    );
    record.insert(
        Field::Category,
        info.categories
            .as_ref()
            .and_then(|c| c.first())
            .map(|c| Value::text(c.clone())),
    );
    record
}
