use kurbo::{Point, Vec2};

use crate::path::{Outline, PathModel};

use super::speed::SpeedModel;

/// Judgement and forgiveness settings for stroke stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeConfig {
    pub speed: SpeedModel,
    /// Relative slack around the required length within which a release
    /// counts as a clean finish.
    pub perfect_margin: f64,
    /// Length of the straight segment granted once the original outline has
    /// been traced. Zero disables continuation.
    pub continuation_length: f64,
    /// Fraction of the original length at which the continuation is granted.
    pub continuation_trigger: f64,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            speed: SpeedModel::default(),
            perfect_margin: 0.05,
            continuation_length: 20.0,
            continuation_trigger: 0.999,
        }
    }
}

/// `required * (1 - margin) <= drawn <= required * (1 + margin)`.
#[inline]
pub fn within_tolerance(drawn: f64, required: f64, margin: f64) -> bool {
    required * (1.0 - margin) <= drawn && drawn <= required * (1.0 + margin)
}

/// Stroke error in `[0, 1]`: zero inside the tolerance band, otherwise the
/// overshoot measured against the continuation length.
pub fn stroke_error(drawn: f64, required: f64, margin: f64, continuation_length: f64) -> f64 {
    if within_tolerance(drawn, required, margin) {
        return 0.0;
    }
    if continuation_length > 0.0 {
        ((drawn - required) / continuation_length).clamp(0.0, 1.0)
    } else if required > 0.0 {
        ((drawn - required).abs() / required).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// What a single advance produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStep {
    pub cursor: Point,
    /// Set on the step that appended the continuation segment.
    pub continuation_granted: bool,
    /// The cursor has reached the end of the (possibly continued) outline.
    pub reached_end: bool,
}

/// Advances the trace cursor along one stroke outline and judges the result.
#[derive(Debug, Clone)]
pub struct StrokeProgressController {
    config: StrokeConfig,
    path: PathModel,

    original_length: f64,
    target: f64,
    speed: f64,
    drawn: f64,
    continued: bool,

    cursor: Point,
}

impl StrokeProgressController {
    /// Prepares tracing of `outline`: measures it, derives the speed and
    /// places the cursor at the start.
    pub fn begin(outline: &Outline, config: &StrokeConfig) -> Self {
        let mut path = PathModel::new(outline.clone());
        let start = path.evaluate(0.0, true);
        let length = path.length();
        let speed = config.speed.speed(length);

        log::debug!("stroke: length={length:.3} speed={speed:.3}/s");

        Self {
            config: config.clone(),
            path,
            original_length: length,
            target: length,
            speed,
            drawn: 0.0,
            continued: false,
            cursor: start,
        }
    }

    /// Advances by one fixed tick of `dt` seconds at the stage speed.
    pub fn tick(&mut self, dt: f64) -> StrokeStep {
        self.advance(self.speed * dt)
    }

    /// Advances the cursor by `distance` units of arc length.
    ///
    /// Once the target is reached the cursor stays put.
    pub fn advance(&mut self, distance: f64) -> StrokeStep {
        assert!(self.target > 0.0, "stroke controller advanced without a target length");

        if self.must_end_draw() {
            return self.step(false);
        }

        self.drawn += distance.max(0.0);
        let mut point = self.path.evaluate(self.drawn, false);

        let mut granted = false;
        if !self.continued && self.drawn / self.original_length > self.config.continuation_trigger {
            self.continued = true;

            let extra = self.config.continuation_length;
            if extra > 0.0 {
                let step = point - self.cursor;
                let direction = if step.hypot() > f64::EPSILON {
                    step
                } else {
                    self.path.tangent_at_end().unwrap_or(Vec2::new(1.0, 0.0))
                };
                self.path.append_continuation(direction, extra);
                self.target += extra;
                point = self.path.evaluate(self.drawn, false);
                granted = true;

                log::debug!("stroke: continuation of {extra:.2} granted");
            }
        }

        self.cursor = point;
        self.step(granted)
    }

    fn step(&self, continuation_granted: bool) -> StrokeStep {
        StrokeStep {
            cursor: self.cursor,
            continuation_granted,
            reached_end: self.must_end_draw(),
        }
    }

    /// Length the player is judged against, without any granted continuation.
    #[inline]
    pub fn required_length(&self) -> f64 {
        if self.continued {
            self.target - self.config.continuation_length.max(0.0)
        } else {
            self.target
        }
    }

    #[inline]
    pub fn within_tolerance(&self) -> bool {
        within_tolerance(self.drawn, self.required_length(), self.config.perfect_margin)
    }

    /// A release now would finish the stroke: the lower edge of the
    /// tolerance band has been reached. Releases past the upper edge are
    /// scored by [`StrokeProgressController::error`].
    #[inline]
    pub fn can_end(&self) -> bool {
        self.drawn >= self.required_length() * (1.0 - self.config.perfect_margin)
    }

    /// The cursor has run out of outline.
    #[inline]
    pub fn must_end_draw(&self) -> bool {
        self.drawn >= self.target
    }

    pub fn error(&self) -> f64 {
        stroke_error(
            self.drawn,
            self.required_length(),
            self.config.perfect_margin,
            self.config.continuation_length,
        )
    }

    #[inline]
    pub fn drawn(&self) -> f64 {
        self.drawn
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    #[inline]
    pub fn continued(&self) -> bool {
        self.continued
    }

    /// The outline being traced, including any continuation segment.
    #[inline]
    pub fn outline(&self) -> &Outline {
        self.path.outline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::SpeedCurve;

    fn straight(len: f64) -> Outline {
        Outline::polyline(&[Point::new(0.0, 0.0), Point::new(len, 0.0)], false)
    }

    fn config_without_continuation() -> StrokeConfig {
        StrokeConfig {
            continuation_length: 0.0,
            ..StrokeConfig::default()
        }
    }

    #[test]
    fn mid_length_stroke_finishes_in_mid_time() {
        let mut c = StrokeProgressController::begin(&straight(50.0), &config_without_continuation());
        assert!((c.speed() - 50.0).abs() < 0.05);

        let mut ticks = 0;
        while !c.must_end_draw() {
            c.tick(0.02);
            ticks += 1;
            assert!(ticks < 1000);
        }
        // ~1 s at 50 Hz
        assert!((49..=51).contains(&ticks), "took {ticks} ticks");
        assert!(c.can_end());
    }

    #[test]
    fn tolerance_band_controls_early_release() {
        let mut c = StrokeProgressController::begin(&straight(100.0), &config_without_continuation());
        assert!((c.target() - 100.0).abs() < 0.01);

        c.advance(89.0);
        assert!(!c.within_tolerance());
        assert!(!c.can_end());

        c.advance(7.0);
        assert!(c.within_tolerance());
        assert!(c.can_end());
        assert_eq!(c.error(), 0.0);
    }

    #[test]
    fn tolerance_edges_are_inclusive() {
        assert!(within_tolerance(95.0, 100.0, 0.05));
        assert!(within_tolerance(105.0, 100.0, 0.05));
        assert!(!within_tolerance(94.99, 100.0, 0.05));
        assert!(!within_tolerance(105.01, 100.0, 0.05));
    }

    #[test]
    fn continuation_granted_once_past_trigger() {
        let config = StrokeConfig::default();
        let mut c = StrokeProgressController::begin(&straight(100.0), &config);
        let original = c.target();

        let s = c.advance(99.0);
        assert!(!s.continuation_granted);

        let s = c.advance(1.0);
        assert!(s.continuation_granted);
        assert!(c.continued());
        assert!((c.target() - original - 20.0).abs() < 1e-9);
        assert!((c.required_length() - original).abs() < 1e-9);
        assert!((c.outline().length() - original - 20.0).abs() < 0.01);

        let s = c.advance(5.0);
        assert!(!s.continuation_granted);
        assert!(s.cursor.distance(Point::new(105.0, 0.0)) < 0.05);
    }

    #[test]
    fn continuation_heads_along_last_motion() {
        let outline = Outline::polyline(&[Point::new(0.0, 0.0), Point::new(0.0, 10.0)], false);
        let mut c = StrokeProgressController::begin(&outline, &StrokeConfig::default());
        c.advance(9.0);
        c.advance(1.5);
        c.advance(10.0);
        assert!((c.cursor().x).abs() < 1e-6);
        assert!(c.cursor().y > 15.0);
    }

    #[test]
    fn overshoot_error_scales_with_continuation() {
        let mut c = StrokeProgressController::begin(&straight(100.0), &StrokeConfig::default());
        let required = c.target();
        c.advance(required + 15.0);
        assert!(!c.within_tolerance());
        assert!((c.error() - (15.0 / 20.0)).abs() < 1e-3);

        c.advance(100.0);
        assert_eq!(c.error(), 1.0);
    }

    #[test]
    fn release_in_forgiveness_zone_is_allowed_and_scored() {
        let mut c = StrokeProgressController::begin(&straight(100.0), &StrokeConfig::default());
        c.advance(100.0);
        c.advance(10.0);
        assert!(c.continued());
        assert!(!c.within_tolerance());
        assert!(!c.must_end_draw());
        assert!(c.can_end());
        assert!((c.error() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn cursor_stops_at_target() {
        let mut c = StrokeProgressController::begin(&straight(10.0), &config_without_continuation());
        let s = c.advance(50.0);
        assert!(s.reached_end);
        let before = c.drawn();
        c.tick(1.0);
        assert_eq!(c.drawn(), before);
        assert_eq!(c.cursor(), Point::new(10.0, 0.0));
    }

    #[test]
    fn logistic_curve_is_selectable() {
        let config = StrokeConfig {
            speed: SpeedModel {
                curve: SpeedCurve::Logistic,
                ..SpeedModel::default()
            },
            ..StrokeConfig::default()
        };
        let c = StrokeProgressController::begin(&straight(50.0), &config);
        assert!(c.speed() > 0.0 && c.speed() < 50.0);
    }

    #[test]
    #[should_panic]
    fn zero_length_target_is_rejected() {
        let outline = Outline::polyline(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)], false);
        let mut c = StrokeProgressController::begin(&outline, &StrokeConfig::default());
        c.tick(0.02);
    }
}
