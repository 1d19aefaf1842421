use tracefill_engine::coords::{ColorRgba, Vec2};
use tracefill_engine::input::{InputFrame, InputState};

use crate::config::GameConfig;
use crate::coverage::{CoverageBackend, CoverageEstimator};
use crate::level::Level;
use crate::path::from_point;
use crate::stroke::StrokeProgressController;

use super::events::{Observers, StageEvent};
use super::info::{StageInfo, StageKind, StageState};
use super::results::LevelResults;

/// Press/release seen since the last fixed tick.
#[derive(Debug, Clone, Copy, Default)]
struct PendingInput {
    pressed: bool,
    released: bool,
}

/// Sequences a level's stroke and fill stages.
///
/// Driven by two clocks: `fixed_update` advances strokes and paint at a
/// fixed rate, `frame_update` runs the (throttled) coverage measurement.
/// Pointer input may be fed directly or buffered through `apply_input`.
pub struct StageMachine<B> {
    level: Level,
    config: GameConfig,

    info: StageInfo,
    state: StageState,
    started: bool,

    stroke: Option<StrokeProgressController>,
    coverage: CoverageEstimator<B>,
    selected_color: Option<usize>,

    observers: Observers,
    errors: Vec<Option<f32>>,
    results: Option<LevelResults>,

    pointer_pos: Vec2,
    pointer_held: bool,
    pending: PendingInput,
    cursor: Vec2,
    clock: f32,
}

impl<B: CoverageBackend> StageMachine<B> {
    pub fn new(level: Level, config: GameConfig, backend: B) -> Self {
        let info = StageInfo::new(level.stroke_count(), level.fill_count());
        let coverage = CoverageEstimator::new(backend, config.coverage.clone());

        Self {
            state: info.entry_state(0),
            errors: vec![None; info.total_stages()],
            info,
            started: false,
            level,
            config,
            stroke: None,
            coverage,
            selected_color: None,
            observers: Observers::new(),
            results: None,
            pointer_pos: Vec2::zero(),
            pointer_held: false,
            pending: PendingInput::default(),
            cursor: Vec2::zero(),
            clock: 0.0,
        }
    }

    /// Enters the first stage. Subscribe observers before calling this to
    /// see the initial `StageEntered`.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        log::info!(
            "level '{}': {} strokes, {} fills, coverage on {}",
            self.level.name,
            self.info.stroke_count,
            self.info.fill_count,
            self.coverage.backend().name()
        );
        self.enter_stage(0);
    }

    // ── input ──────────────────────────────────────────────────────────────

    /// Buffers this frame's press/release for the next fixed tick and
    /// follows the pointer position.
    pub fn apply_input(&mut self, input: &InputState, frame: &InputFrame) {
        self.pending.pressed |= frame.pressed;
        self.pending.released |= frame.released;
        if let Some(pos) = input.pointer_pos {
            self.pointer_moved(pos);
        }
    }

    pub fn pointer_pressed(&mut self, pos: Vec2) {
        self.pointer_moved(pos);
        match self.state {
            StageState::WaitingToDraw => {
                self.pointer_held = true;
                self.set_state(StageState::DrawingStroke);
            }
            StageState::DrawingStroke | StageState::DrawingFill => {
                self.pointer_held = true;
            }
            StageState::SelectColor | StageState::Finished => {}
        }
    }

    pub fn pointer_released(&mut self) {
        if !self.pointer_held {
            return;
        }
        self.pointer_held = false;

        if self.state != StageState::DrawingStroke {
            return;
        }
        match self.stroke.as_ref() {
            Some(stroke) if stroke.can_end() => self.finish_stroke(),
            Some(stroke) => {
                log::debug!(
                    "stroke paused at {:.2}/{:.2}",
                    stroke.drawn(),
                    stroke.required_length()
                );
            }
            None => {}
        }
    }

    /// Absolute pointer position in level units.
    pub fn pointer_moved(&mut self, pos: Vec2) {
        if !pos.is_finite() {
            return;
        }
        self.pointer_pos = pos;
        if matches!(self.state, StageState::SelectColor | StageState::DrawingFill) && self.cursor != pos {
            self.cursor = pos;
            self.observers.emit(&StageEvent::CursorMoved { pos });
        }
    }

    pub fn pointer_delta(&mut self, delta: Vec2) {
        self.pointer_moved(self.pointer_pos + delta);
    }

    // ── clocks ─────────────────────────────────────────────────────────────

    /// Fixed-rate tick: applies buffered input, then advances the stroke
    /// cursor or lays paint under the held pointer.
    pub fn fixed_update(&mut self, dt: f32) {
        if !self.started {
            return;
        }

        let pending = std::mem::take(&mut self.pending);
        if pending.pressed {
            self.pointer_pressed(self.pointer_pos);
        }
        if pending.released {
            self.pointer_released();
        }

        self.clock += dt;
        match self.state {
            StageState::DrawingStroke if self.pointer_held => self.advance_stroke(dt),
            StageState::DrawingFill if self.pointer_held => self.paint_at_pointer(),
            _ => {}
        }
    }

    /// Variable-rate tick: flushes paint and reports coverage measurements.
    ///
    /// A failed measurement is logged and the previous percentage kept.
    pub fn frame_update(&mut self) {
        if self.state != StageState::DrawingFill {
            return;
        }
        match self.coverage.frame(self.clock) {
            Ok(Some(coverage)) => {
                let stage_index = self.info.stage_index;
                self.observers.emit(&StageEvent::FillProgress { stage_index, coverage });
            }
            Ok(None) => {}
            Err(err) => log::warn!("coverage measurement failed: {err:#}"),
        }
    }

    // ── stage actions ──────────────────────────────────────────────────────

    /// Picks a palette entry and starts painting.
    ///
    /// Returns `false` outside `SelectColor` or for an index outside the
    /// current fill's palette.
    pub fn select_color(&mut self, index: usize) -> bool {
        if self.state != StageState::SelectColor {
            return false;
        }
        let Some(fill_index) = self.info.fill_index() else { return false };
        let fill = &self.level.fills[fill_index];

        let Some(color) = fill.palette.get(index).copied() else {
            log::warn!(
                "colour {index} is not in the palette of fill {fill_index} ({} entries)",
                fill.palette.len()
            );
            return false;
        };

        if let Err(err) = self.coverage.begin_stage(&fill.mask, color) {
            log::error!(
                "coverage backend '{}' could not start fill {fill_index}: {err:#}",
                self.coverage.backend().name()
            );
        }

        self.selected_color = Some(index);
        self.set_state(StageState::DrawingFill);
        self.poll_early_continue();
        true
    }

    /// Scores the current fill stage on a fresh measurement and moves on.
    pub fn finish_fill(&mut self) -> bool {
        if self.state != StageState::DrawingFill {
            return false;
        }

        let coverage = match self.coverage.measure_now(self.clock) {
            Ok(c) => c,
            Err(err) => {
                log::warn!("final coverage measurement failed: {err:#}");
                self.coverage.coverage()
            }
        };

        let stage_index = self.info.stage_index;
        self.errors[stage_index] = Some(1.0 - coverage);
        log::info!("fill {stage_index} finished at {:.1}%", coverage * 100.0);
        self.observers.emit(&StageEvent::FillFinished { stage_index, coverage });

        self.leave_stage();
        self.enter_stage(stage_index + 1);
        true
    }

    /// Steps back to the entry state of the previous stage, discarding the
    /// scores of the current and previous stage. No-op at the first stage.
    pub fn undo(&mut self) -> bool {
        let from = self.info.stage_index;
        if !self.started || from == 0 {
            log::debug!("undo ignored at stage {from}");
            return false;
        }
        let to = from - 1;

        for e in &mut self.errors[to..] {
            *e = None;
        }
        self.results = None;

        self.leave_stage();
        log::info!("undo: stage {from} -> {to}");
        self.observers.emit(&StageEvent::StageUndone { from, to });
        self.enter_stage(to);
        true
    }

    // ── accessors ──────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> StageState {
        self.state
    }

    /// Copy of the current progress snapshot.
    #[inline]
    pub fn info(&self) -> StageInfo {
        self.info
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Trace cursor during stroke stages, brush position during fill stages.
    #[inline]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    #[inline]
    pub fn pointer_held(&self) -> bool {
        self.pointer_held
    }

    #[inline]
    pub fn stroke(&self) -> Option<&StrokeProgressController> {
        self.stroke.as_ref()
    }

    #[inline]
    pub fn estimator(&self) -> &CoverageEstimator<B> {
        &self.coverage
    }

    /// Last measured coverage of the current fill stage.
    pub fn coverage(&self) -> f32 {
        self.coverage.coverage()
    }

    pub fn early_continue_available(&self) -> bool {
        self.state == StageState::DrawingFill && self.coverage.early_continue_available()
    }

    /// Palette of the current fill stage.
    pub fn palette(&self) -> Option<&[ColorRgba]> {
        self.info
            .fill_index()
            .map(|i| self.level.fills[i].palette.as_slice())
    }

    #[inline]
    pub fn selected_color(&self) -> Option<usize> {
        self.selected_color
    }

    #[inline]
    pub fn results(&self) -> Option<&LevelResults> {
        self.results.as_ref()
    }

    #[inline]
    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.observers
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn set_state(&mut self, state: StageState) {
        self.state = state;
        log::debug!("stage {}: {:?}", self.info.stage_index, state);
        self.observers.emit(&StageEvent::StageEntered {
            stage_index: self.info.stage_index,
            state,
        });
    }

    fn leave_stage(&mut self) {
        self.coverage.end_stage();
        self.stroke = None;
        self.selected_color = None;
        self.pointer_held = false;
        self.observers.end_stage();
    }

    fn enter_stage(&mut self, index: usize) {
        self.info.stage_index = index;
        self.info.drawn_amount = 0.0;
        self.info.target_length = 0.0;
        self.info.speed = 0.0;

        match self.info.kind_of(index) {
            Some(StageKind::Stroke) => {
                let stroke = StrokeProgressController::begin(&self.level.strokes[index], &self.config.stroke);
                self.info.target_length = stroke.target();
                self.info.speed = stroke.speed();
                self.cursor = from_point(stroke.cursor());
                self.stroke = Some(stroke);

                self.set_state(StageState::WaitingToDraw);
                self.observers.emit(&StageEvent::CursorMoved { pos: self.cursor });
            }
            Some(StageKind::Fill) => self.set_state(StageState::SelectColor),
            None => self.finish_level(),
        }
    }

    fn advance_stroke(&mut self, dt: f32) {
        let Some(stroke) = self.stroke.as_mut() else { return };
        let step = stroke.tick(f64::from(dt));
        let (drawn, target) = (stroke.drawn(), stroke.target());

        self.info.drawn_amount = drawn;
        self.info.target_length = target;
        self.cursor = from_point(step.cursor);

        let stage_index = self.info.stage_index;
        if step.continuation_granted {
            self.observers.emit(&StageEvent::ContinuationGranted {
                stage_index,
                extra_length: self.config.stroke.continuation_length,
            });
        }
        self.observers.emit(&StageEvent::CursorMoved { pos: self.cursor });
        self.observers.emit(&StageEvent::StrokeProgress { drawn, target });
    }

    fn finish_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else { return };
        let stage_index = self.info.stage_index;
        let error = stroke.error() as f32;
        self.errors[stage_index] = Some(error);

        log::info!(
            "stroke {stage_index} finished: {:.2}/{:.2} drawn, error {error:.3}",
            stroke.drawn(),
            stroke.required_length()
        );
        self.observers.emit(&StageEvent::StrokeFinished {
            stage_index,
            end_point: from_point(stroke.cursor()),
            error,
            within_tolerance: stroke.within_tolerance(),
        });

        self.leave_stage();
        self.enter_stage(stage_index + 1);
    }

    fn finish_level(&mut self) {
        let errors: Vec<f32> = self.errors.iter().map(|e| e.unwrap_or(1.0)).collect();
        let results = LevelResults::from_errors(&errors);
        log::info!("level '{}' finished: {}% accuracy", self.level.name, results.percent());

        self.results = Some(results.clone());
        self.set_state(StageState::Finished);
        self.observers.emit(&StageEvent::LevelFinished { results });
    }

    fn paint_at_pointer(&mut self) {
        self.coverage.brush_moved(self.pointer_pos, self.clock);
        self.poll_early_continue();
    }

    fn poll_early_continue(&mut self) {
        if self.coverage.take_early_continue() {
            let stage_index = self.info.stage_index;
            log::debug!("fill {stage_index}: early continue available");
            self.observers.emit(&StageEvent::EarlyContinueAvailable { stage_index });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Result, bail};
    use kurbo::Point;

    use super::*;
    use crate::coverage::{BrushStamp, CoverageCounts, CpuCoverage, RegionMask};
    use crate::path::Outline;
    use crate::stage::SubscriptionScope;

    fn line(y: f64) -> Outline {
        Outline::polyline(&[Point::new(0.0, y), Point::new(10.0, y)], false)
    }

    fn level(strokes: usize, fills: usize) -> Level {
        let mut level = Level::new("test");
        for i in 0..strokes {
            level = level.with_stroke(line(i as f64));
        }
        for _ in 0..fills {
            level = level.with_fill(
                RegionMask::from_fn(40, 40, |_, _| true),
                vec![ColorRgba::new(1.0, 0.0, 0.0, 1.0), ColorRgba::new(0.0, 0.0, 1.0, 1.0)],
            );
        }
        level
    }

    fn machine(strokes: usize, fills: usize) -> StageMachine<CpuCoverage> {
        let mut m = StageMachine::new(level(strokes, fills), GameConfig::default(), CpuCoverage::new());
        m.start();
        m
    }

    /// Holds the pointer until the stroke is within tolerance, then releases.
    fn trace(m: &mut StageMachine<CpuCoverage>) {
        m.pointer_pressed(Vec2::zero());
        for _ in 0..1000 {
            m.fixed_update(0.02);
            if m.stroke().is_some_and(|s| s.within_tolerance()) {
                break;
            }
        }
        m.pointer_released();
    }

    /// Paints the whole 40x40 region and continues.
    fn fill(m: &mut StageMachine<CpuCoverage>) {
        assert!(m.select_color(0));
        m.pointer_pressed(Vec2::new(20.0, 20.0));
        m.fixed_update(0.02);
        m.pointer_released();
        // let the dab grow to full radius before scoring
        m.fixed_update(0.3);
        assert!(m.finish_fill());
    }

    #[test]
    fn starts_waiting_at_outline_start() {
        let m = machine(2, 1);
        assert_eq!(m.state(), StageState::WaitingToDraw);
        assert_eq!(m.cursor(), Vec2::new(0.0, 0.0));
        assert!((m.info().target_length - 10.0).abs() < 0.01);
        assert!(m.info().speed > 0.0);
    }

    #[test]
    fn level_without_strokes_starts_at_colour_selection() {
        let m = machine(0, 1);
        assert_eq!(m.state(), StageState::SelectColor);
        assert_eq!(m.palette().map(<[ColorRgba]>::len), Some(2));
    }

    #[test]
    fn empty_level_finishes_at_full_accuracy() {
        let m = machine(0, 0);
        assert_eq!(m.state(), StageState::Finished);
        assert_eq!(m.results().map(|r| r.accuracy), Some(1.0));
    }

    #[test]
    fn early_release_pauses_the_cursor() {
        let mut m = machine(1, 0);
        m.pointer_pressed(Vec2::zero());
        for _ in 0..5 {
            m.fixed_update(0.02);
        }
        m.pointer_released();
        assert_eq!(m.state(), StageState::DrawingStroke);

        let paused = m.cursor();
        m.fixed_update(0.02);
        m.fixed_update(0.02);
        assert_eq!(m.cursor(), paused);

        m.pointer_pressed(Vec2::zero());
        m.fixed_update(0.02);
        assert!(m.cursor().x > paused.x);
    }

    #[test]
    fn clean_strokes_and_fills_score_perfectly() {
        let mut m = machine(2, 1);
        trace(&mut m);
        assert_eq!(m.state(), StageState::WaitingToDraw);
        assert_eq!(m.info().stage_index, 1);

        trace(&mut m);
        assert_eq!(m.state(), StageState::SelectColor);

        fill(&mut m);
        assert_eq!(m.state(), StageState::Finished);

        let results = m.results().expect("finished level has results");
        assert_eq!(results.stage_accuracy.len(), 3);
        assert!((results.accuracy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn strokes_run_to_the_end_when_held() {
        let mut m = machine(1, 0);
        m.pointer_pressed(Vec2::zero());
        for _ in 0..1000 {
            m.fixed_update(0.02);
        }
        assert!(m.info().must_end_draw());
        let granted = m.stroke().is_some_and(|s| s.continued());
        assert!(granted);

        m.pointer_released();
        assert_eq!(m.state(), StageState::Finished);
        assert_eq!(m.results().map(|r| r.accuracy), Some(0.0));
    }

    #[test]
    fn release_in_forgiveness_zone_scores_the_overshoot() {
        let level = Level::new("overshoot")
            .with_stroke(Outline::polyline(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false));
        let mut m = StageMachine::new(level, GameConfig::default(), CpuCoverage::new());
        let (_, rx) = m.observers_mut().subscribe_channel(SubscriptionScope::Level);
        m.start();

        m.pointer_pressed(Vec2::zero());
        for _ in 0..100_000 {
            m.fixed_update(0.002);
            if m.stroke().is_some_and(|s| s.drawn() >= s.required_length() + 10.0) {
                break;
            }
        }
        let stroke = m.stroke().expect("stroke still in progress");
        assert!(stroke.continued());
        assert!(!stroke.within_tolerance());
        assert!(!stroke.must_end_draw());

        m.pointer_released();
        assert_eq!(m.state(), StageState::Finished);

        let finished = rx.try_iter().find_map(|e| match e {
            StageEvent::StrokeFinished { error, within_tolerance, .. } => Some((error, within_tolerance)),
            _ => None,
        });
        let (error, within) = finished.expect("stroke was scored");
        assert!(!within);
        assert!((error - 0.5).abs() < 0.01, "error {error}");
        let accuracy = m.results().map_or(0.0, |r| r.accuracy);
        assert!((accuracy - 0.5).abs() < 0.01);
    }

    #[test]
    fn unknown_colour_is_rejected() {
        let mut m = machine(0, 1);
        assert!(!m.select_color(7));
        assert_eq!(m.state(), StageState::SelectColor);
        assert!(m.select_color(1));
        assert_eq!(m.selected_color(), Some(1));
        assert_eq!(m.state(), StageState::DrawingFill);
    }

    #[test]
    fn undo_from_third_fill_returns_to_colour_selection() {
        let mut m = machine(3, 3);
        for _ in 0..3 {
            trace(&mut m);
        }
        fill(&mut m);
        fill(&mut m);
        assert!(m.select_color(0));
        assert_eq!((m.state(), m.info().stage_index), (StageState::DrawingFill, 5));

        assert!(m.undo());
        assert_eq!((m.state(), m.info().stage_index), (StageState::SelectColor, 4));
        assert!(m.estimator().session().is_none());
    }

    #[test]
    fn undo_from_first_fill_returns_to_last_stroke() {
        let mut m = machine(3, 3);
        for _ in 0..3 {
            trace(&mut m);
        }
        assert!(m.select_color(0));
        assert_eq!(m.info().stage_index, 3);

        assert!(m.undo());
        assert_eq!((m.state(), m.info().stage_index), (StageState::WaitingToDraw, 2));
        assert_eq!(m.info().drawn_amount, 0.0);
        assert!(m.info().target_length > 0.0);
        assert_eq!(m.cursor(), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn undo_from_colour_selection_returns_to_previous_fill() {
        let mut m = machine(1, 2);
        trace(&mut m);
        fill(&mut m);
        assert_eq!((m.state(), m.info().stage_index), (StageState::SelectColor, 2));
        assert!(m.errors[1].is_some());

        assert!(m.undo());
        assert_eq!((m.state(), m.info().stage_index), (StageState::SelectColor, 1));
        assert_eq!(m.errors[1..], [None, None]);
        assert!(m.errors[0].is_some());
        assert!(m.selected_color().is_none());
    }

    #[test]
    fn undo_from_colour_selection_returns_to_last_stroke() {
        let mut m = machine(2, 1);
        trace(&mut m);
        trace(&mut m);
        assert_eq!((m.state(), m.info().stage_index), (StageState::SelectColor, 2));

        assert!(m.undo());
        assert_eq!((m.state(), m.info().stage_index), (StageState::WaitingToDraw, 1));
        assert_eq!(m.info().drawn_amount, 0.0);
        assert!(m.errors[1].is_none());
        assert!(m.errors[0].is_some());
        assert_eq!(m.cursor(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn undo_mid_stroke_restarts_previous_stroke() {
        let mut m = machine(2, 0);
        trace(&mut m);
        m.pointer_pressed(Vec2::zero());
        for _ in 0..3 {
            m.fixed_update(0.02);
        }
        assert_eq!((m.state(), m.info().stage_index), (StageState::DrawingStroke, 1));
        assert!(m.info().drawn_amount > 0.0);

        assert!(m.undo());
        assert_eq!((m.state(), m.info().stage_index), (StageState::WaitingToDraw, 0));
        assert_eq!(m.info().drawn_amount, 0.0);
        assert!(!m.pointer_held());
        assert!(m.errors[0].is_none());
        assert_eq!(m.stroke().map(|s| s.drawn()), Some(0.0));
    }

    #[test]
    fn undo_at_first_stroke_is_a_no_op() {
        let mut m = machine(3, 3);
        m.pointer_pressed(Vec2::zero());
        m.fixed_update(0.02);
        let before = m.info();

        assert!(!m.undo());
        assert_eq!(m.state(), StageState::DrawingStroke);
        assert_eq!(m.info(), before);
    }

    #[test]
    fn undo_from_finished_reopens_last_fill() {
        let mut m = machine(1, 1);
        trace(&mut m);
        fill(&mut m);
        assert_eq!(m.state(), StageState::Finished);

        assert!(m.undo());
        assert_eq!((m.state(), m.info().stage_index), (StageState::SelectColor, 1));
        assert!(m.results().is_none());

        fill(&mut m);
        assert_eq!(m.results().map(|r| r.stage_accuracy.len()), Some(2));
    }

    #[test]
    fn buffered_press_applies_on_next_fixed_tick() {
        let mut m = machine(1, 0);
        let input = InputState::default();
        let frame = InputFrame {
            pressed: true,
            ..InputFrame::default()
        };

        m.apply_input(&input, &frame);
        assert_eq!(m.state(), StageState::WaitingToDraw);

        m.fixed_update(0.02);
        assert_eq!(m.state(), StageState::DrawingStroke);
        assert!(m.info().drawn_amount > 0.0);
    }

    #[test]
    fn observers_see_stage_flow_and_scoped_subscriptions_end() {
        let mut m = StageMachine::new(level(1, 1), GameConfig::default(), CpuCoverage::new());
        let (_, level_rx) = m.observers_mut().subscribe_channel(SubscriptionScope::Level);
        let stage_hits = Rc::new(RefCell::new(0));
        let hits = stage_hits.clone();
        m.observers_mut()
            .subscribe(SubscriptionScope::Stage, move |_| *hits.borrow_mut() += 1);

        m.start();
        trace(&mut m);
        let after_first_stage = *stage_hits.borrow();
        fill(&mut m);
        assert_eq!(*stage_hits.borrow(), after_first_stage);

        let events: Vec<StageEvent> = level_rx.try_iter().collect();
        assert!(matches!(
            events.first(),
            Some(StageEvent::StageEntered { stage_index: 0, state: StageState::WaitingToDraw })
        ));
        assert!(events.iter().any(|e| matches!(e, StageEvent::StrokeFinished { stage_index: 0, .. })));
        assert!(events.iter().any(|e| matches!(e, StageEvent::EarlyContinueAvailable { stage_index: 1 })));
        assert!(matches!(events.last(), Some(StageEvent::LevelFinished { .. })));
    }

    struct BrokenBackend;

    impl CoverageBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn begin_stage(&mut self, _mask: &RegionMask) -> Result<()> {
            Ok(())
        }
        fn rasterize(&mut self, _stamps: &[BrushStamp]) -> Result<()> {
            Ok(())
        }
        fn measure(&mut self) -> Result<CoverageCounts> {
            bail!("device lost")
        }
        fn end_stage(&mut self) {}
    }

    #[test]
    fn failed_measurement_keeps_previous_coverage() {
        let config = GameConfig {
            coverage: crate::coverage::CoverageConfig {
                measure_every: 1,
                ..Default::default()
            },
            ..GameConfig::default()
        };
        let mut m = StageMachine::new(level(0, 1), config, BrokenBackend);
        m.start();
        assert!(m.select_color(0));

        m.pointer_pressed(Vec2::new(20.0, 20.0));
        m.fixed_update(0.02);
        m.frame_update();
        assert_eq!(m.coverage(), 0.0);

        assert!(m.finish_fill());
        assert_eq!(m.results().map(|r| r.accuracy), Some(0.0));
    }
}
