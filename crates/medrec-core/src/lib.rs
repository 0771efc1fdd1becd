pub mod advice;
pub mod prediction;
pub mod symptoms;

pub use advice::{DiseaseAdvice, DrugInteractionItem, InteractionReport, Severity};
pub use prediction::{DiseaseInfo, InteractionRequest, ReferenceRecord, SymptomsRequest};
pub use symptoms::symptoms_to_text;

/// Text returned for a reference-table miss.
pub const NOT_AVAILABLE: &str = "Not available";
