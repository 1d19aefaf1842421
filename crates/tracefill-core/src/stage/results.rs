/// Accuracy report produced when a level finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelResults {
    /// Per-stage accuracy (`1 - error`), in stage order.
    pub stage_accuracy: Vec<f32>,
    /// `1 - mean(error)` over all stages; 1.0 for a level without stages.
    pub accuracy: f32,
}

impl LevelResults {
    /// Builds the report from per-stage errors in `[0, 1]`.
    pub fn from_errors(errors: &[f32]) -> Self {
        let stage_accuracy: Vec<f32> = errors.iter().map(|e| 1.0 - e.clamp(0.0, 1.0)).collect();
        let accuracy = if stage_accuracy.is_empty() {
            1.0
        } else {
            stage_accuracy.iter().sum::<f32>() / stage_accuracy.len() as f32
        };
        Self { stage_accuracy, accuracy }
    }

    /// Whole-percent accuracy for display.
    pub fn percent(&self) -> u32 {
        (self.accuracy * 100.0).round() as u32
    }
}
