use crate::coverage::CoverageConfig;
use crate::stroke::StrokeConfig;

/// Gameplay tuning for a whole level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameConfig {
    pub stroke: StrokeConfig,
    pub coverage: CoverageConfig,
}
