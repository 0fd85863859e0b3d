//! Sequential marketplace-domain resolver
//!
//! Drives the commerce search across a fixed priority-ordered list of
//! Amazon marketplace domains for one ISBN. Implements the first-domain
//! skip rule, the title/price fill rules, and the early exit once both
//! fields are adopted. Every domain attempt increments the call counter
//! regardless of outcome.

use crate::providers::AmazonSearch;
use crate::types::{Field, PartialRecord};

/// Marketplace domains in lookup priority order.
pub const SERP_DOMAIN_PRIORITY: [&str; 4] =
    ["amazon.in", "amazon.com", "amazon.co.uk", "amazon.de"];

/// Outcome of the sequential domain walk for one ISBN.
///
/// Every field in `record` was adopted from the commerce search, so the
/// merger tags them all with `serp` provenance. `domain_used` keeps exact
/// last-write semantics: the last domain whose response had any field
/// adopted, which is not necessarily the domain where the early exit fired.
#[derive(Debug, Clone, PartialEq)]
pub struct SerpResolution {
    /// Adopted title and/or price, possibly empty.
    pub record: PartialRecord,
    /// Last domain that contributed any field, if any did.
    pub domain_used: Option<String>,
    /// Total number of domain attempts made (≤ 4).
    pub api_calls: u32,
}

/// Walk the domain priority list for one ISBN.
///
/// Rules, applied per domain:
/// - the first-priority domain is discarded entirely (title included) when
///   its price is missing or numerically zero;
/// - title is adopted only once; price is adopted only once and never when
///   numerically zero;
/// - iteration stops as soon as both title and price are adopted.
pub async fn resolve_serp<A>(client: &A, isbn: &str) -> SerpResolution
where
    A: AmazonSearch + ?Sized,
{
    let mut record = PartialRecord::new();
    let mut domain_used = None;
    let mut api_calls = 0u32;

    for domain in SERP_DOMAIN_PRIORITY {
        api_calls += 1;

        let data = client.search(isbn, domain).await;
        if data.is_empty() {
            continue;
        }

        let price = data.get(Field::Price);

        // Skip rule: the first-priority domain contributes nothing when
        // its price is missing or zero, regardless of title.
        if domain == SERP_DOMAIN_PRIORITY[0] && price.map_or(true, |p| p.is_zero()) {
            continue;
        }

        if !record.contains(Field::Title) {
            if let Some(title) = data.get(Field::Title) {
                record.insert(Field::Title, Some(title.clone()));
                domain_used = Some(domain.to_string());
            }
        }

        if !record.contains(Field::Price) {
            if let Some(p) = price {
                if !p.is_zero() {
                    record.insert(Field::Price, Some(p.clone()));
                    domain_used = Some(domain.to_string());
                }
            }
        }

        if record.contains(Field::Title) && record.contains(Field::Price) {
            break;
        }
    }

    tracing::debug!(
        isbn = %isbn,
        api_calls,
        domain_used = ?domain_used,
        "Sequential domain resolution finished"
    );

    SerpResolution {
        record,
        domain_used,
        api_calls,
    }
}
