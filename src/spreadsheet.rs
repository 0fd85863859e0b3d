//! Spreadsheet input parsing and provenance-colored export
//!
//! Input: the uploaded workbook's `ISBN` column, taken in row order with
//! no validation or normalization of the identifiers. Output: a complete
//! in-memory xlsx document, one row per enriched record in completion
//! order, with each cell's font color keyed by the provenance of its
//! value.

use crate::types::{EnrichedRecord, Field, Source, Value};
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Color, Format, Workbook};
use std::io::Cursor;
use thiserror::Error;

/// Download filename for the exported workbook.
pub const OUTPUT_FILE_NAME: &str = "isbn_output.xlsx";

/// MIME type of the exported workbook.
pub const OUTPUT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Header of the column the ISBNs are read from.
const ISBN_COLUMN: &str = "ISBN";

/// Spreadsheet I/O errors
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    /// Uploaded bytes are not a readable workbook
    #[error("Unreadable workbook: {0}")]
    Read(String),

    /// The first sheet has no `ISBN` header column
    #[error("No ISBN column found in the first sheet")]
    MissingIsbnColumn,

    /// Workbook serialization failed
    #[error("Workbook write failed: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

/// Extract the `ISBN` column from the first sheet of an uploaded workbook.
///
/// Cell order is preserved; empty cells are skipped; numeric cells (Excel
/// often stores ISBNs as numbers) are rendered without a fraction.
pub fn read_isbn_column(bytes: &[u8]) -> Result<Vec<String>, SpreadsheetError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| SpreadsheetError::Read(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SpreadsheetError::Read("workbook has no sheets".to_string()))?
        .map_err(|e| SpreadsheetError::Read(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(SpreadsheetError::MissingIsbnColumn)?;
    let isbn_idx = header
        .iter()
        .position(|cell| cell.to_string().trim() == ISBN_COLUMN)
        .ok_or(SpreadsheetError::MissingIsbnColumn)?;

    let mut isbns = Vec::new();
    for row in rows {
        match row.get(isbn_idx) {
            None | Some(Data::Empty) => continue,
            Some(cell) => {
                let isbn = cell_to_string(cell);
                if !isbn.is_empty() {
                    isbns.push(isbn);
                }
            }
        }
    }

    Ok(isbns)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Serialize the result set into a colored xlsx workbook.
///
/// First row: the twelve column headers. Each following row is one record
/// in result-set order. Provenanced cells get the font color of their
/// source; the ISBN key and the metadata columns keep default styling.
pub fn write_workbook(records: &[EnrichedRecord]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Header row
    worksheet.write_string(0, 0, ISBN_COLUMN)?;
    for (idx, field) in Field::ALL.iter().enumerate() {
        worksheet.write_string(0, (idx + 1) as u16, field.name())?;
    }
    worksheet.write_string(0, 9, "amazon_domain_used")?;
    worksheet.write_string(0, 10, "serp_api_calls")?;
    worksheet.write_string(0, 11, "source_used")?;

    for (r, record) in records.iter().enumerate() {
        let row = (r + 1) as u32;

        worksheet.write_string(row, 0, &record.row.isbn)?;

        for (idx, field) in Field::ALL.iter().enumerate() {
            let col = (idx + 1) as u16;
            let value = match record.row.fields.get(*field) {
                Some(v) => v,
                None => continue,
            };
            match record.provenance.get(field) {
                Some(source) => {
                    let format = provenance_format(*source);
                    match value {
                        Value::Text(s) => {
                            worksheet.write_string_with_format(row, col, s, &format)?
                        }
                        Value::Number(n) => {
                            worksheet.write_number_with_format(row, col, *n, &format)?
                        }
                    };
                }
                None => {
                    match value {
                        Value::Text(s) => worksheet.write_string(row, col, s)?,
                        Value::Number(n) => worksheet.write_number(row, col, *n)?,
                    };
                }
            }
        }

        if let Some(domain) = &record.row.amazon_domain_used {
            worksheet.write_string(row, 9, domain)?;
        }
        worksheet.write_number(row, 10, record.row.serp_api_calls as f64)?;
        if let Some(sources) = &record.row.source_used {
            worksheet.write_string(row, 11, sources)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Fixed font-color table keyed by provenance tag.
fn provenance_format(source: Source) -> Format {
    let color = match source {
        Source::Serp => Color::RGB(0x1E3A8A),   // dark blue
        Source::Isbndb => Color::RGB(0x064E3B), // dark green
        Source::Google => Color::RGB(0xFACC15), // amber
    };
    Format::new().set_font_color(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookRow, PartialRecord, ProvenanceMap};

    fn sample_record(isbn: &str) -> EnrichedRecord {
        let mut fields = PartialRecord::new();
        fields.insert(Field::Title, Some(Value::text("Foo")));
        fields.insert(Field::NumberOfPages, Some(Value::number(320.0)));
        fields.insert(Field::Price, Some(Value::text("$10.99")));

        let mut provenance = ProvenanceMap::new();
        provenance.insert(Field::Title, Source::Serp);
        provenance.insert(Field::NumberOfPages, Source::Isbndb);
        provenance.insert(Field::Price, Source::Serp);

        EnrichedRecord {
            row: BookRow {
                isbn: isbn.to_string(),
                fields,
                amazon_domain_used: Some("amazon.com".to_string()),
                serp_api_calls: 2,
                source_used: Some("isbndb, serp".to_string()),
            },
            provenance,
        }
    }

    #[test]
    fn workbook_bytes_are_a_zip_document() {
        let bytes = write_workbook(&[sample_record("9780000000001")]).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn round_trip_preserves_isbn_column() {
        let records = vec![sample_record("9780000000001"), sample_record("9780000000002")];
        let bytes = write_workbook(&records).unwrap();

        let isbns = read_isbn_column(&bytes).unwrap();
        assert_eq!(isbns, vec!["9780000000001", "9780000000002"]);
    }

    #[test]
    fn header_row_lists_all_columns_in_order() {
        let bytes = write_workbook(&[]).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();

        assert_eq!(
            header,
            vec![
                "ISBN",
                "title",
                "author",
                "publisher",
                "binding",
                "edition",
                "number_of_pages",
                "category",
                "price",
                "amazon_domain_used",
                "serp_api_calls",
                "source_used",
            ]
        );
    }

    #[test]
    fn missing_isbn_column_is_rejected() {
        // Build a sheet whose header has no ISBN column.
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "code").unwrap();
        worksheet.write_string(1, 0, "123").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        assert!(matches!(
            read_isbn_column(&bytes),
            Err(SpreadsheetError::MissingIsbnColumn)
        ));
    }

    #[test]
    fn numeric_isbn_cells_render_without_fraction() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "ISBN").unwrap();
        worksheet.write_number(1, 0, 9780000000001.0).unwrap();
        worksheet.write_string(2, 0, " 978-0-00-000000-2 ").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let isbns = read_isbn_column(&bytes).unwrap();
        assert_eq!(isbns, vec!["9780000000001", "978-0-00-000000-2"]);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(
            read_isbn_column(b"not a workbook"),
            Err(SpreadsheetError::Read(_))
        ));
    }
}
