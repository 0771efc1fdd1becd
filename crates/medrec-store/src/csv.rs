//! CSV → Arrow ingestion.
//!
//! Every column is read as `Utf8` regardless of content: the reference
//! tables are text, and the dataset readers parse numbers themselves. Empty
//! fields come back as nulls.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::StoreError;

const BATCH_SIZE: usize = 4096;

/// Read a headered CSV file into Arrow record batches with all-string columns.
pub fn read_csv(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::CsvNotFound(path.to_path_buf()));
    }

    let mut file = File::open(path)?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(0))?;
    file.rewind()?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_truncated_rows(true)
        .build(file)?;

    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Look up a string column by name.
pub(crate) fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
    file: &str,
) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
}

/// Cell value, or `None` for nulls and whitespace-only text.
pub(crate) fn cell(col: &StringArray, row: usize) -> Option<&str> {
    if col.is_null(row) {
        return None;
    }
    let v = col.value(row);
    if v.trim().is_empty() { None } else { Some(v) }
}
