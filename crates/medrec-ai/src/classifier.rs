//! ONNX Runtime sequence classifier for symptom text.
//!
//! Wraps a fine-tuned BERT-family classifier exported to ONNX. The model
//! directory must contain `model.onnx` and `tokenizer.json`; class indices
//! map to disease names through a [`LabelIndex`].

use std::path::Path;

use medrec_core::symptoms_to_text;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::labels::LabelIndex;
use crate::predictor::DiseasePredictor;

/// Longest input the classifier sees, in subword tokens.
pub const MAX_TOKENS: usize = 512;

/// Symptom → disease classifier using ONNX Runtime.
pub struct Classifier {
    session: Session,
    tokenizer: Tokenizer,
    labels: LabelIndex,
    /// DistilBERT exports take no segment ids; BERT exports require them.
    feeds_token_types: bool,
    num_classes: usize,
}

impl Classifier {
    /// Load from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path, labels: LabelIndex) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let feeds_token_types = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");
        let num_classes = infer_num_classes(session.outputs()[0].dtype()).unwrap_or(labels.len());
        anyhow::ensure!(
            num_classes <= labels.len(),
            "model has {num_classes} classes but label index only {}",
            labels.len()
        );

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(
            num_classes,
            feeds_token_types,
            model = %model_path.display(),
            "loaded disease classifier"
        );
        Ok(Self {
            session,
            tokenizer,
            labels,
            feeds_token_types,
            num_classes,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    /// Class logits for one text.
    pub fn logits(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        let outputs = if self.feeds_token_types {
            let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;
            self.session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])?
        } else {
            self.session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?
        };

        // Logits: [1, num_classes].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1,
            "unexpected output shape: {dims:?}, expected [1, num_classes]"
        );

        Ok(output_data.to_vec())
    }

    /// Predict the class index for one text.
    pub fn classify_text(&mut self, text: &str) -> anyhow::Result<usize> {
        let logits = self.logits(text)?;
        argmax(&logits).ok_or_else(|| anyhow::anyhow!("model produced no class scores"))
    }
}

impl DiseasePredictor for Classifier {
    fn predict(&mut self, symptoms: &[String]) -> anyhow::Result<String> {
        let text = symptoms_to_text(symptoms);
        let class = self.classify_text(&text)?;
        let label = self
            .labels
            .get(class)
            .ok_or_else(|| anyhow::anyhow!("class {class} missing from label index"))?;
        debug!(symptoms = symptoms.len(), class, label, "classified symptoms");
        Ok(label.to_string())
    }
}

/// Index of the highest score; the first one wins on ties.
fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Try to infer the class count from the ONNX model output type.
fn infer_num_classes(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the class count.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}
