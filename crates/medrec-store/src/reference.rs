//! Disease-keyed reference tables loaded once at startup.
//!
//! Five CSV files in the data directory feed four text maps and one
//! precaution-list map. Disease names are trimmed before they become keys;
//! a later row for the same disease replaces an earlier one, except in the
//! workout table where rows accumulate and are joined with `"; "`.
//!
//! Lookups never fail: misses resolve to [`NOT_AVAILABLE`] or an empty list.

use std::collections::HashMap;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use medrec_core::{NOT_AVAILABLE, ReferenceRecord};
use tracing::info;

use crate::StoreError;
use crate::csv::{cell, read_csv, string_column};

pub const DESCRIPTION_FILE: &str = "description.csv";
pub const DIETS_FILE: &str = "diets.csv";
pub const MEDICATIONS_FILE: &str = "medications.csv";
pub const PRECAUTIONS_FILE: &str = "precautions_df.csv";
pub const WORKOUT_FILE: &str = "workout_df.csv";

const PRECAUTION_COLUMNS: &[&str] = &[
    "Precaution_1",
    "Precaution_2",
    "Precaution_3",
    "Precaution_4",
];

/// Read-only reference data keyed by disease name.
#[derive(Debug, Default)]
pub struct ReferenceTables {
    descriptions: HashMap<String, String>,
    diets: HashMap<String, String>,
    medications: HashMap<String, String>,
    precautions: HashMap<String, Vec<String>>,
    workouts: HashMap<String, String>,
}

/// Entry counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSummary {
    pub descriptions: usize,
    pub diets: usize,
    pub medications: usize,
    pub precautions: usize,
    pub workouts: usize,
}

impl ReferenceTables {
    /// Load all five tables from `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self, StoreError> {
        let descriptions = text_map(
            &read_csv(&data_dir.join(DESCRIPTION_FILE))?,
            DESCRIPTION_FILE,
            "Disease",
            "Description",
        )?;
        let diets = text_map(
            &read_csv(&data_dir.join(DIETS_FILE))?,
            DIETS_FILE,
            "Disease",
            "Diet",
        )?;
        let medications = text_map(
            &read_csv(&data_dir.join(MEDICATIONS_FILE))?,
            MEDICATIONS_FILE,
            "Disease",
            "Medication",
        )?;
        let precautions = precaution_map(&read_csv(&data_dir.join(PRECAUTIONS_FILE))?)?;
        let workouts = workout_map(&read_csv(&data_dir.join(WORKOUT_FILE))?)?;

        let tables = Self {
            descriptions,
            diets,
            medications,
            precautions,
            workouts,
        };
        let s = tables.summary();
        info!(
            descriptions = s.descriptions,
            diets = s.diets,
            medications = s.medications,
            precautions = s.precautions,
            workouts = s.workouts,
            dir = %data_dir.display(),
            "loaded reference tables"
        );
        Ok(tables)
    }

    pub fn overview(&self, disease: &str) -> &str {
        lookup_text(&self.descriptions, disease)
    }

    pub fn diet(&self, disease: &str) -> &str {
        lookup_text(&self.diets, disease)
    }

    pub fn medication(&self, disease: &str) -> &str {
        lookup_text(&self.medications, disease)
    }

    pub fn workout(&self, disease: &str) -> &str {
        lookup_text(&self.workouts, disease)
    }

    pub fn precautions(&self, disease: &str) -> &[String] {
        self.precautions
            .get(disease)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All reference attributes for one disease, placeholders filled in.
    pub fn lookup(&self, disease: &str) -> ReferenceRecord {
        ReferenceRecord {
            overview: self.overview(disease).to_string(),
            diet: self.diet(disease).to_string(),
            medication: self.medication(disease).to_string(),
            precautions: self.precautions(disease).to_vec(),
            workout: self.workout(disease).to_string(),
        }
    }

    pub fn summary(&self) -> ReferenceSummary {
        ReferenceSummary {
            descriptions: self.descriptions.len(),
            diets: self.diets.len(),
            medications: self.medications.len(),
            precautions: self.precautions.len(),
            workouts: self.workouts.len(),
        }
    }
}

fn lookup_text<'a>(map: &'a HashMap<String, String>, disease: &str) -> &'a str {
    map.get(disease).map(|s| s.as_str()).unwrap_or(NOT_AVAILABLE)
}

/// `key_col → value_col`, last row wins. Rows with a missing key or value are skipped.
fn text_map(
    batches: &[RecordBatch],
    file: &str,
    key_col: &str,
    value_col: &str,
) -> Result<HashMap<String, String>, StoreError> {
    let mut map = HashMap::new();
    for batch in batches {
        let keys = string_column(batch, key_col, file)?;
        let values = string_column(batch, value_col, file)?;
        for row in 0..batch.num_rows() {
            if let (Some(k), Some(v)) = (cell(keys, row), cell(values, row)) {
                map.insert(k.trim().to_string(), v.to_string());
            }
        }
    }
    Ok(map)
}

fn precaution_map(batches: &[RecordBatch]) -> Result<HashMap<String, Vec<String>>, StoreError> {
    let mut map = HashMap::new();
    for batch in batches {
        let keys = string_column(batch, "Disease", PRECAUTIONS_FILE)?;
        // Absent precaution columns contribute nothing.
        let cols: Vec<_> = PRECAUTION_COLUMNS
            .iter()
            .filter_map(|name| string_column(batch, name, PRECAUTIONS_FILE).ok())
            .collect();

        for row in 0..batch.num_rows() {
            let Some(disease) = cell(keys, row) else {
                continue;
            };
            let list: Vec<String> = cols
                .iter()
                .filter_map(|col| cell(col, row))
                .map(str::to_string)
                .collect();
            map.insert(disease.trim().to_string(), list);
        }
    }
    Ok(map)
}

fn workout_map(batches: &[RecordBatch]) -> Result<HashMap<String, String>, StoreError> {
    let mut accum: HashMap<String, Vec<String>> = HashMap::new();
    for batch in batches {
        let keys = string_column(batch, "disease", WORKOUT_FILE)?;
        let values = string_column(batch, "workout", WORKOUT_FILE)?;
        for row in 0..batch.num_rows() {
            if let (Some(k), Some(v)) = (cell(keys, row), cell(values, row)) {
                accum
                    .entry(k.trim().to_string())
                    .or_default()
                    .push(v.to_string());
            }
        }
    }
    Ok(accum
        .into_iter()
        .map(|(disease, items)| (disease, items.join("; ")))
        .collect())
}
