// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads the raw news CSV into RawRecords.
//
// The header must name `title`, `description` and `category`.
// Other columns are ignored; column order does not matter. Every
// required column that is absent is reported in one SchemaError
// before any row is read.
//
// Cells go through the Preprocessor, so an empty or blank cell
// arrives as a missing field rather than an empty string.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::data::preprocessor::Preprocessor;
use crate::domain::error::PrepError;
use crate::domain::record::RawRecord;
use crate::domain::traits::RecordSource;

/// Columns every input file must expose.
pub const REQUIRED_COLUMNS: [&str; 3] = ["title", "description", "category"];

/// Loads raw records from a delimited file with a header row.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<RawRecord>, PrepError> {
        let file = File::open(&self.path)?;
        let records = read_raw_records(file)?;
        tracing::info!(
            "Read {} rows from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Parse raw records from any reader carrying CSV text.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, PrepError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let mut at = [0usize; REQUIRED_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, name) in at.iter_mut().zip(REQUIRED_COLUMNS) {
        match position(name) {
            Some(i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(PrepError::Schema { missing });
    }
    let [title_at, description_at, category_at] = at;

    let preprocessor = Preprocessor::new();
    let mut records = Vec::new();

    for (id, row) in reader.records().enumerate() {
        let row = row?;
        records.push(RawRecord {
            id,
            title: preprocessor.field(row.get(title_at)),
            description: preprocessor.field(row.get(description_at)),
            category: preprocessor.field(row.get(category_at)),
        });
    }

    Ok(records)
}
