/// Maps an ordered symptom list to a single disease label.
///
/// Implementations may hold exclusive inference state (an ONNX session needs
/// `&mut` to run), so callers serialize access.
pub trait DiseasePredictor: Send {
    fn predict(&mut self, symptoms: &[String]) -> anyhow::Result<String>;
}
