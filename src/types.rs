//! Core data model for ISBN enrichment
//!
//! Defines the fixed field set, the scalar cell value with explicit
//! missing/zero semantics, partial provider records, and per-field source
//! provenance. Every provider and the merge policy operate on these types.

use serde::Serialize;
use std::collections::BTreeMap;

/// The merge-competed bibliographic fields, in output column order.
///
/// The ISBN key and the derived metadata columns (`amazon_domain_used`,
/// `serp_api_calls`, `source_used`) live on [`BookRow`] directly; they are
/// never merge-competed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Author,
    Publisher,
    Binding,
    Edition,
    NumberOfPages,
    Category,
    Price,
}

impl Field {
    /// All fields in output column order.
    pub const ALL: [Field; 8] = [
        Field::Title,
        Field::Author,
        Field::Publisher,
        Field::Binding,
        Field::Edition,
        Field::NumberOfPages,
        Field::Category,
        Field::Price,
    ];

    /// Column name as it appears in the exported spreadsheet header.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Publisher => "publisher",
            Field::Binding => "binding",
            Field::Edition => "edition",
            Field::NumberOfPages => "number_of_pages",
            Field::Category => "category",
            Field::Price => "price",
        }
    }
}

/// A scalar cell value as supplied by a provider.
///
/// Providers return heterogeneous JSON scalars (page counts and list prices
/// arrive as numbers, everything else as strings); the distinction is kept
/// so the exporter can write typed cells and so the zero-price rule only
/// matches numeric zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    /// Missing means blank: text that is empty after trimming.
    /// Numbers are never missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Text(s) => s.trim().is_empty(),
            Value::Number(_) => false,
        }
    }

    /// Numeric zero test for the price rules. A textual `"0"` is not zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Number(n) if *n == 0.0)
    }

    /// Convert a JSON scalar into a cell value.
    ///
    /// Null and non-scalar JSON map to `None`; callers unwrap nested
    /// structures (e.g. SerpApi's `price.raw`) before converting.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            _ => None,
        }
    }

    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Identifying tag of the data source that supplied a field value.
///
/// Variant order matches the alphabetical tag order used by the
/// `source_used` summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Google,
    Isbndb,
    Serp,
}

impl Source {
    pub fn tag(&self) -> &'static str {
        match self {
            Source::Google => "google",
            Source::Isbndb => "isbndb",
            Source::Serp => "serp",
        }
    }
}

/// Field → source mapping for the currently stored values of one row.
///
/// Exactly one source owns each present field; ownership is set at write
/// time and never overwritten.
pub type ProvenanceMap = BTreeMap<Field, Source>;

/// The subset of fields one provider call supplied.
///
/// A field is either wholly present (with a non-missing value) or wholly
/// absent; [`PartialRecord::insert`] filters missing values so "provider
/// did not supply it" and "provider supplied a blank" collapse to the same
/// absent state, never conflated with a confirmed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    fields: BTreeMap<Field, Value>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value unless it is missing. `None` and blank values are
    /// dropped silently.
    pub fn insert(&mut self, field: Field, value: Option<Value>) {
        if let Some(v) = value {
            if !v.is_missing() {
                self.fields.insert(field, v);
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }
}

/// One fully merged output row for a single ISBN.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRow {
    /// The merge key, carried through untouched (never validated).
    pub isbn: String,
    /// Merge-competed field values; absent entries export as blank cells.
    pub fields: PartialRecord,
    /// Last marketplace domain that contributed any field, if any.
    pub amazon_domain_used: Option<String>,
    /// Number of marketplace domain attempts made for this ISBN.
    pub serp_api_calls: u32,
    /// Alphabetically sorted, comma-joined distinct provenance tags used.
    pub source_used: Option<String>,
}

impl BookRow {
    /// Row template with only the ISBN key populated.
    pub fn empty(isbn: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            fields: PartialRecord::new(),
            amazon_domain_used: None,
            serp_api_calls: 0,
            source_used: None,
        }
    }
}

/// Merged row plus its per-field provenance, the unit of the result set.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub row: BookRow,
    pub provenance: ProvenanceMap,
}
