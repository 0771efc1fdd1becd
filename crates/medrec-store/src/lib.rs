//! Storage layer: CSV ingestion via Arrow, disease-keyed reference tables, offline datasets.

mod csv;
mod error;
pub use csv::read_csv;
pub use error::StoreError;

pub mod dataset;
pub mod reference;

pub use dataset::{ConditionEncoder, DrugReview, DrugScore, TrainingSet, recommend_drugs};
pub use reference::{ReferenceSummary, ReferenceTables};
