use std::fmt;

/// What is wrong with a level's content.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelErrorKind {
    /// A stroke outline has no measurable length.
    DegenerateStroke { length: f64 },
    /// A fill region has no colours to pick from.
    EmptyPalette,
    /// A mask's placement scale is not a positive finite number.
    BadMaskScale { pixels_per_unit: f32 },
}

/// A level that cannot be played.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelError {
    pub kind: LevelErrorKind,
    /// Stage index the problem belongs to.
    pub stage: usize,
}

impl LevelError {
    pub(crate) fn new(kind: LevelErrorKind, stage: usize) -> Self {
        Self { kind, stage }
    }
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LevelErrorKind::DegenerateStroke { length } => {
                write!(f, "stage {}: stroke outline has length {length}", self.stage)
            }
            LevelErrorKind::EmptyPalette => {
                write!(f, "stage {}: fill region has an empty palette", self.stage)
            }
            LevelErrorKind::BadMaskScale { pixels_per_unit } => {
                write!(f, "stage {}: invalid mask scale {pixels_per_unit}", self.stage)
            }
        }
    }
}

impl std::error::Error for LevelError {}
