//! AI layer: ONNX Runtime disease classification and LLM-backed enrichment.

#[cfg(feature = "onnx")]
mod classifier;
#[cfg(feature = "onnx")]
pub use classifier::Classifier;

pub mod enrich;
pub mod extract;
pub mod labels;
pub mod llm;
mod predictor;

pub use enrich::{EnrichConfig, Enricher};
pub use labels::{LabelError, LabelIndex};
pub use llm::{GeminiClient, LlmError, TextGenerator};
pub use predictor::DiseasePredictor;
