use kurbo::{CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2};

/// Accuracy passed to `kurbo` when measuring segment arc length, in level units.
pub const ARCLEN_ACCURACY: f64 = 0.01;

/// Maximum gap tolerated between the end of one segment and the start of the next.
const CONTIGUITY_EPSILON: f64 = 1e-6;

/// One traceable contour: an ordered run of contiguous cubic segments.
///
/// For a closed outline the last segment ends where the first one starts;
/// the closing segment is part of `segments`.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    segments: Vec<CubicBez>,
    closed: bool,
}

impl Outline {
    /// Builds an outline from contiguous segments.
    ///
    /// Panics on an empty segment list; debug builds also check contiguity.
    pub fn new(segments: Vec<CubicBez>, closed: bool) -> Self {
        assert!(!segments.is_empty(), "an outline needs at least one segment");

        debug_assert!(
            segments
                .windows(2)
                .all(|w| w[0].p3.distance(w[1].p0) <= CONTIGUITY_EPSILON),
            "outline segments are not contiguous"
        );
        debug_assert!(
            !closed || segments[segments.len() - 1].p3.distance(segments[0].p0) <= CONTIGUITY_EPSILON,
            "closed outline does not end at its start"
        );

        Self { segments, closed }
    }

    /// Builds an outline of straight segments through `points`.
    ///
    /// With `closed`, a final segment returns to the first point.
    pub fn polyline(points: &[Point], closed: bool) -> Self {
        assert!(points.len() >= 2, "a polyline needs at least two points");

        let mut segments: Vec<CubicBez> = points.windows(2).map(|w| line(w[0], w[1])).collect();
        if closed {
            segments.push(line(points[points.len() - 1], points[0]));
        }
        Self::new(segments, closed)
    }

    #[inline]
    pub fn segments(&self) -> &[CubicBez] {
        &self.segments
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Panics when `index` is out of range; indices are produced internally.
    #[inline]
    pub fn segment(&self, index: usize) -> &CubicBez {
        &self.segments[index]
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.segments[0].p0
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].p3
    }

    /// Arc length of segment `index`.
    #[inline]
    pub fn segment_length(&self, index: usize) -> f64 {
        self.segments[index].arclen(ARCLEN_ACCURACY)
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        (0..self.segments.len()).map(|i| self.segment_length(i)).sum()
    }

    /// Unit tangent at the endpoint.
    ///
    /// Falls back to the chord of the last segment when its end handle is
    /// degenerate; `None` only for a fully collapsed segment.
    pub fn end_tangent(&self) -> Option<Vec2> {
        let last = &self.segments[self.segments.len() - 1];
        let d = last.deriv().eval(1.0).to_vec2();
        let d = if d.hypot() > f64::EPSILON { d } else { last.p3 - last.p0 };
        (d.hypot() > f64::EPSILON).then(|| d.normalize())
    }

    /// Copy of this outline with one straight segment of `distance` units
    /// appended at the endpoint, heading along `direction`.
    ///
    /// The result is always open. A zero `direction` falls back to the end
    /// tangent, then to +X.
    pub fn append_continuation(&self, direction: Vec2, distance: f64) -> Outline {
        let dir = if direction.hypot() > f64::EPSILON {
            direction.normalize()
        } else {
            self.end_tangent().unwrap_or(Vec2::new(1.0, 0.0))
        };

        let from = self.end();
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(line(from, from + dir * distance));

        Outline { segments, closed: false }
    }
}

/// Straight cubic from `a` to `b` with evenly spaced handles.
fn line(a: Point, b: Point) -> CubicBez {
    CubicBez::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)
}
