//! SerpApi Amazon search client
//!
//! Queries the SerpApi Amazon engine for one ISBN on one marketplace
//! domain and extracts title and price from the first organic result.
//! Price arrives either as a bare scalar or nested as `{"raw": scalar}`;
//! it is normalized to a scalar cell value here.

use crate::providers::AmazonSearch;
use crate::types::{Field, PartialRecord, Value};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const SERP_BASE_URL: &str = "https://serpapi.com/search.json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// SerpApi client errors
#[derive(Debug, Error)]
pub enum SerpError {
    /// Network communication error or timeout
    #[error("Network error: {0}")]
    NetworkError(String),

    /// SerpApi returned a non-success status
    #[error("API error {0}")]
    ApiError(u16),

    /// Search succeeded but returned no organic results
    #[error("No organic results for ISBN {0}")]
    NoResults(String),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// SerpApi search response (only the part we consume)
#[derive(Debug, Clone, Deserialize)]
pub struct SerpSearchResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
}

/// One organic search result
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    /// Scalar or `{"raw": scalar}` depending on the marketplace
    pub price: Option<serde_json::Value>,
}

/// SerpApi Amazon search client
pub struct SerpClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl SerpClient {
    pub fn new(api_key: String) -> Result<Self, SerpError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SerpError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Search one marketplace domain for an ISBN.
    ///
    /// Returns title and price of the first organic result. Failures are
    /// typed here; the [`AmazonSearch`] impl collapses them to an empty
    /// record.
    pub async fn fetch(&self, isbn: &str, domain: &str) -> Result<PartialRecord, SerpError> {
        let response = self
            .http_client
            .get(SERP_BASE_URL)
            .query(&[
                ("engine", "amazon"),
                ("amazon_domain", domain),
                ("api_key", &self.api_key),
                ("k", isbn),
            ])
            .send()
            .await
            .map_err(|e| SerpError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SerpError::ApiError(status.as_u16()));
        }

        let data: SerpSearchResponse = response
            .json()
            .await
            .map_err(|e| SerpError::ParseError(e.to_string()))?;

        let first = data
            .organic_results
            .first()
            .ok_or_else(|| SerpError::NoResults(isbn.to_string()))?;

        Ok(extract_record(first))
    }
}

#[async_trait]
impl AmazonSearch for SerpClient {
    async fn search(&self, isbn: &str, domain: &str) -> PartialRecord {
        match self.fetch(isbn, domain).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(
                    isbn = %isbn,
                    domain = %domain,
                    error = %e,
                    "SerpApi lookup failed, treating as empty"
                );
                PartialRecord::new()
            }
        }
    }
}

/// Map one organic result to a partial record (title + price).
fn extract_record(result: &OrganicResult) -> PartialRecord {
    let mut record = PartialRecord::new();
    record.insert(
        Field::Title,
        result.title.as_ref().map(|t| Value::text(t.clone())),
    );
    record.insert(Field::Price, result.price.as_ref().and_then(normalize_price));
    record
}

/// Unwrap a price scalar, reaching into `{"raw": scalar}` when nested.
fn normalize_price(price: &serde_json::Value) -> Option<Value> {
    match price {
        serde_json::Value::Object(map) => map.get("raw").and_then(Value::from_json),
        other => Value::from_json(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> SerpSearchResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn extracts_title_and_scalar_price() {
        let data = parse(serde_json::json!({
            "organic_results": [{"title": "Foo", "price": "$10.99"}]
        }));
        let record = extract_record(&data.organic_results[0]);
        assert_eq!(record.get(Field::Title), Some(&Value::text("Foo")));
        assert_eq!(record.get(Field::Price), Some(&Value::text("$10.99")));
    }

    #[test]
    fn extracts_nested_raw_price() {
        let data = parse(serde_json::json!({
            "organic_results": [{"title": "Foo", "price": {"raw": "₹499", "value": 499.0}}]
        }));
        let record = extract_record(&data.organic_results[0]);
        assert_eq!(record.get(Field::Price), Some(&Value::text("₹499")));
    }

    #[test]
    fn numeric_price_stays_numeric() {
        let data = parse(serde_json::json!({
            "organic_results": [{"title": "Foo", "price": 10}]
        }));
        let record = extract_record(&data.organic_results[0]);
        assert_eq!(record.get(Field::Price), Some(&Value::number(10.0)));
    }

    #[test]
    fn missing_price_leaves_field_absent() {
        let data = parse(serde_json::json!({
            "organic_results": [{"title": "Foo"}]
        }));
        let record = extract_record(&data.organic_results[0]);
        assert!(record.contains(Field::Title));
        assert!(!record.contains(Field::Price));
    }

    #[test]
    fn empty_results_parse_to_empty_list() {
        let data = parse(serde_json::json!({}));
        assert!(data.organic_results.is_empty());
    }

    #[test]
    fn client_creation() {
        assert!(SerpClient::new("test-key".to_string()).is_ok());
    }
}
