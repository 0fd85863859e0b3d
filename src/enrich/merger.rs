//! Priority merge across the three data sources
//!
//! Combines the sequential-domain resolution with the ISBNdb and Google
//! Books records for one ISBN. Strict source priority (serp → isbndb →
//! google) with first-writer-wins per field: a source writes a field only
//! when the row's value is still missing, and provenance is recorded at
//! the moment of the write, never overwritten.

use crate::enrich::resolver::SerpResolution;
use crate::types::{BookRow, EnrichedRecord, PartialRecord, ProvenanceMap, Source};
use std::collections::BTreeSet;

/// Merge the three source records into one output row.
///
/// `amazon_domain_used` and `serp_api_calls` are copied from the
/// resolution unconditionally; they are run metadata, not merge-competed
/// fields. `source_used` summarizes the distinct provenance tags actually
/// used, sorted alphabetically and comma-joined, absent when no source
/// contributed anything.
pub fn merge_sources(
    isbn: &str,
    serp: &SerpResolution,
    isbndb: &PartialRecord,
    google: &PartialRecord,
) -> EnrichedRecord {
    let mut row = BookRow::empty(isbn);
    let mut provenance = ProvenanceMap::new();

    row.amazon_domain_used = serp.domain_used.clone();
    row.serp_api_calls = serp.api_calls;

    apply_source(&mut row, &mut provenance, Source::Serp, &serp.record);
    apply_source(&mut row, &mut provenance, Source::Isbndb, isbndb);
    apply_source(&mut row, &mut provenance, Source::Google, google);

    let used: BTreeSet<&'static str> = provenance.values().map(|s| s.tag()).collect();
    if !used.is_empty() {
        row.source_used = Some(used.into_iter().collect::<Vec<_>>().join(", "));
    }

    EnrichedRecord { row, provenance }
}

/// Write every field the source supplies that the row is still missing,
/// recording provenance alongside. Later sources never override.
fn apply_source(
    row: &mut BookRow,
    provenance: &mut ProvenanceMap,
    source: Source,
    data: &PartialRecord,
) {
    for (field, value) in data.iter() {
        if !row.fields.contains(field) {
            row.fields.insert(field, Some(value.clone()));
            provenance.insert(field, source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Value};

    fn resolution(record: PartialRecord, domain: Option<&str>, calls: u32) -> SerpResolution {
        SerpResolution {
            record,
            domain_used: domain.map(String::from),
            api_calls: calls,
        }
    }

    fn record(entries: Vec<(Field, Value)>) -> PartialRecord {
        let mut r = PartialRecord::new();
        for (f, v) in entries {
            r.insert(f, Some(v));
        }
        r
    }

    #[test]
    fn first_writer_wins_per_field() {
        let serp = resolution(
            record(vec![(Field::Title, Value::text("Serp Title"))]),
            Some("amazon.com"),
            2,
        );
        let isbndb = record(vec![
            (Field::Title, Value::text("Isbndb Title")),
            (Field::Author, Value::text("Alice")),
        ]);
        let google = record(vec![
            (Field::Author, Value::text("Bob")),
            (Field::Category, Value::text("Fiction")),
        ]);

        let merged = merge_sources("isbn", &serp, &isbndb, &google);

        assert_eq!(
            merged.row.fields.get(Field::Title),
            Some(&Value::text("Serp Title"))
        );
        assert_eq!(
            merged.row.fields.get(Field::Author),
            Some(&Value::text("Alice"))
        );
        assert_eq!(
            merged.row.fields.get(Field::Category),
            Some(&Value::text("Fiction"))
        );
        assert_eq!(merged.provenance.get(&Field::Title), Some(&Source::Serp));
        assert_eq!(merged.provenance.get(&Field::Author), Some(&Source::Isbndb));
        assert_eq!(
            merged.provenance.get(&Field::Category),
            Some(&Source::Google)
        );
        assert_eq!(
            merged.row.source_used.as_deref(),
            Some("google, isbndb, serp")
        );
    }

    #[test]
    fn all_sources_empty_yields_isbn_only_row() {
        let serp = resolution(PartialRecord::new(), None, 4);
        let merged = merge_sources(
            "9780000000002",
            &serp,
            &PartialRecord::new(),
            &PartialRecord::new(),
        );

        assert_eq!(merged.row.isbn, "9780000000002");
        assert!(merged.row.fields.is_empty());
        assert!(merged.provenance.is_empty());
        assert!(merged.row.source_used.is_none());
        assert!(merged.row.amazon_domain_used.is_none());
        assert_eq!(merged.row.serp_api_calls, 4);
    }

    #[test]
    fn serp_failure_falls_through_to_other_sources() {
        // Commerce search contributed nothing; ISBNdb fills the core
        // bibliographic fields and Google Books only the category.
        let serp = resolution(PartialRecord::new(), None, 4);
        let isbndb = record(vec![
            (Field::Title, Value::text("Foo")),
            (Field::Author, Value::text("Alice")),
            (Field::Publisher, Value::text("Acme Press")),
        ]);
        let google = record(vec![(Field::Category, Value::text("Fiction"))]);

        let merged = merge_sources("isbn", &serp, &isbndb, &google);

        for field in [Field::Title, Field::Author, Field::Publisher] {
            assert_eq!(merged.provenance.get(&field), Some(&Source::Isbndb));
        }
        assert_eq!(
            merged.provenance.get(&Field::Category),
            Some(&Source::Google)
        );
        assert_eq!(merged.row.source_used.as_deref(), Some("google, isbndb"));
    }

    #[test]
    fn metadata_fields_bypass_merge_competition() {
        // Domain and call counter come from the resolution even when the
        // resolver adopted no fields.
        let serp = resolution(PartialRecord::new(), Some("amazon.de"), 3);
        let merged = merge_sources("isbn", &serp, &PartialRecord::new(), &PartialRecord::new());

        assert_eq!(merged.row.amazon_domain_used.as_deref(), Some("amazon.de"));
        assert_eq!(merged.row.serp_api_calls, 3);
    }

    #[test]
    fn provenance_invariant_holds() {
        let serp = resolution(
            record(vec![
                (Field::Title, Value::text("Foo")),
                (Field::Price, Value::number(10.0)),
            ]),
            Some("amazon.com"),
            2,
        );
        let isbndb = record(vec![(Field::Author, Value::text("Alice"))]);

        let merged = merge_sources("isbn", &serp, &isbndb, &PartialRecord::new());

        // Field present ⇔ provenance entry present.
        for field in Field::ALL {
            assert_eq!(
                merged.row.fields.contains(field),
                merged.provenance.contains_key(&field)
            );
        }
    }

    #[test]
    fn merge_is_deterministic() {
        let serp = resolution(
            record(vec![(Field::Title, Value::text("Foo"))]),
            Some("amazon.com"),
            2,
        );
        let isbndb = record(vec![(Field::Author, Value::text("Alice"))]);
        let google = record(vec![(Field::Category, Value::text("Fiction"))]);

        let first = merge_sources("isbn", &serp, &isbndb, &google);
        let second = merge_sources("isbn", &serp, &isbndb, &google);

        assert_eq!(first, second);
    }
}
