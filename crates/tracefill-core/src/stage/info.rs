/// Which of the five phases the level is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Cursor parked at the start of the stroke outline.
    WaitingToDraw,
    DrawingStroke,
    SelectColor,
    DrawingFill,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Stroke,
    Fill,
}

/// Snapshot of level progress.
///
/// Stages are numbered strokes first, then fills. All predicates are pure
/// functions of the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageInfo {
    pub stage_index: usize,
    pub stroke_count: usize,
    pub fill_count: usize,

    /// Arc length traced so far in the current stroke stage.
    pub drawn_amount: f64,
    /// Arc length that ends the current stroke stage.
    pub target_length: f64,
    /// Ideal tracing speed of the current stroke stage.
    pub speed: f64,
}

impl StageInfo {
    pub fn new(stroke_count: usize, fill_count: usize) -> Self {
        Self {
            stroke_count,
            fill_count,
            ..Self::default()
        }
    }

    #[inline]
    pub fn total_stages(&self) -> usize {
        self.stroke_count + self.fill_count
    }

    #[inline]
    pub fn in_stroke_stage(&self) -> bool {
        self.stage_index < self.stroke_count
    }

    #[inline]
    pub fn in_fill_stage(&self) -> bool {
        self.stage_index >= self.stroke_count && self.stage_index < self.total_stages()
    }

    #[inline]
    pub fn finished(&self) -> bool {
        self.stage_index >= self.total_stages()
    }

    #[inline]
    pub fn must_end_draw(&self) -> bool {
        self.target_length > 0.0 && self.drawn_amount >= self.target_length
    }

    /// Index into the level's fill list for the current stage.
    pub fn fill_index(&self) -> Option<usize> {
        self.in_fill_stage().then(|| self.stage_index - self.stroke_count)
    }

    /// Fraction of the stroke traced; `None` outside an initialised stroke stage.
    pub fn drawn_part(&self) -> Option<f64> {
        (self.in_stroke_stage() && self.target_length > 0.0)
            .then(|| self.drawn_amount / self.target_length)
    }

    pub fn kind_of(&self, stage_index: usize) -> Option<StageKind> {
        if stage_index < self.stroke_count {
            Some(StageKind::Stroke)
        } else if stage_index < self.total_stages() {
            Some(StageKind::Fill)
        } else {
            None
        }
    }

    /// Entry state of `stage_index`.
    pub fn entry_state(&self, stage_index: usize) -> StageState {
        match self.kind_of(stage_index) {
            Some(StageKind::Stroke) => StageState::WaitingToDraw,
            Some(StageKind::Fill) => StageState::SelectColor,
            None => StageState::Finished,
        }
    }
}
