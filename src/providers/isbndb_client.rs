//! ISBNdb API client
//!
//! Looks a single ISBN up in the ISBNdb catalog. Supplies most of the
//! bibliographic fields (title, author, publisher, binding, edition, page
//! count) plus the list price (`msrp`); never supplies a category. Author
//! lists are comma-joined into one cell. Any non-200 response counts as a
//! failure.

use crate::providers::MetadataLookup;
use crate::types::{Field, PartialRecord, Value};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const ISBNDB_BASE_URL: &str = "https://api2.isbndb.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// ISBNdb client errors
#[derive(Debug, Error)]
pub enum IsbndbError {
    /// Network communication error or timeout
    #[error("Network error: {0}")]
    NetworkError(String),

    /// ISBNdb returned a non-200 status
    #[error("API error {0}")]
    ApiError(u16),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// ISBNdb book lookup response
#[derive(Debug, Clone, Deserialize)]
pub struct IsbndbResponse {
    pub book: IsbndbBook,
}

/// The book object inside an ISBNdb response.
///
/// `edition`, `pages` and `msrp` arrive as either strings or numbers
/// depending on the record, so they are kept as raw JSON scalars.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IsbndbBook {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub binding: Option<String>,
    pub edition: Option<serde_json::Value>,
    pub pages: Option<serde_json::Value>,
    pub msrp: Option<serde_json::Value>,
}

/// ISBNdb API client
pub struct IsbndbClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl IsbndbClient {
    pub fn new(api_key: String) -> Result<Self, IsbndbError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IsbndbError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Look up one ISBN. Requires a 200 response to count as success.
    pub async fn fetch(&self, isbn: &str) -> Result<PartialRecord, IsbndbError> {
        let url = format!("{}/book/{}", ISBNDB_BASE_URL, isbn);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| IsbndbError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(IsbndbError::ApiError(status.as_u16()));
        }

        let data: IsbndbResponse = response
            .json()
            .await
            .map_err(|e| IsbndbError::ParseError(e.to_string()))?;

        Ok(extract_record(&data.book))
    }
}

#[async_trait]
impl MetadataLookup for IsbndbClient {
    async fn lookup(&self, isbn: &str) -> PartialRecord {
        match self.fetch(isbn).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(
                    isbn = %isbn,
                    error = %e,
                    "ISBNdb lookup failed, treating as empty"
                );
                PartialRecord::new()
            }
        }
    }
}

/// Map an ISBNdb book object to a partial record.
///
/// Category is never supplied by this provider; an empty author list joins
/// to a blank string and is dropped by the record.
fn extract_record(book: &IsbndbBook) -> PartialRecord {
    let mut record = PartialRecord::new();
    record.insert(
        Field::Title,
        book.title.as_ref().map(|t| Value::text(t.clone())),
    );
    record.insert(Field::Author, Some(Value::text(book.authors.join(", "))));
    record.insert(
        Field::Publisher,
        book.publisher.as_ref().map(|p| Value::text(p.clone())),
    );
    record.insert(
        Field::Binding,
        book.binding.as_ref().map(|b| Value::text(b.clone())),
    );
    record.insert(
        Field::Edition,
        book.edition.as_ref().and_then(Value::from_json),
    );
    record.insert(
        Field::NumberOfPages,
        book.pages.as_ref().and_then(Value::from_json),
    );
    record.insert(Field::Price, book.msrp.as_ref().and_then(Value::from_json));
    record
}
