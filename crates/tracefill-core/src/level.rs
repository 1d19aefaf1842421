use tracefill_engine::coords::ColorRgba;

use crate::coverage::RegionMask;
use crate::error::{LevelError, LevelErrorKind};
use crate::path::Outline;

/// One region to paint.
#[derive(Debug, Clone)]
pub struct FillShape {
    pub mask: RegionMask,
    /// Colours offered at the colour-selection step.
    pub palette: Vec<ColorRgba>,
}

/// Pre-parsed content of one level: every stroke stage first, then every
/// fill stage.
#[derive(Debug, Clone, Default)]
pub struct Level {
    pub name: String,
    pub strokes: Vec<Outline>,
    pub fills: Vec<FillShape>,
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, outline: Outline) -> Self {
        self.strokes.push(outline);
        self
    }

    pub fn with_fill(mut self, mask: RegionMask, palette: Vec<ColorRgba>) -> Self {
        self.fills.push(FillShape { mask, palette });
        self
    }

    #[inline]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    #[inline]
    pub fn fill_count(&self) -> usize {
        self.fills.len()
    }

    /// Checks that every stage can be played.
    pub fn validate(&self) -> Result<(), LevelError> {
        for (i, outline) in self.strokes.iter().enumerate() {
            let length = outline.length();
            if !(length.is_finite() && length > 0.0) {
                return Err(LevelError::new(LevelErrorKind::DegenerateStroke { length }, i));
            }
        }

        for (i, fill) in self.fills.iter().enumerate() {
            let stage = self.strokes.len() + i;
            if fill.palette.is_empty() {
                return Err(LevelError::new(LevelErrorKind::EmptyPalette, stage));
            }
            let ppu = fill.mask.pixels_per_unit();
            if !(ppu.is_finite() && ppu > 0.0) {
                return Err(LevelError::new(
                    LevelErrorKind::BadMaskScale { pixels_per_unit: ppu },
                    stage,
                ));
            }
        }
        Ok(())
    }
}
