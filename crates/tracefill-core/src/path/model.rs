use kurbo::{ParamCurve, Point, Vec2};

use super::outline::Outline;

/// Segment-walk cursor plus optional per-segment length table for one outline.
///
/// The cache only speeds up queries; a cold or stale cursor never changes
/// what [`PathModel::evaluate`] returns. Its table is only meaningful for the
/// outline it was refreshed with, which is why it is paired with that outline
/// inside [`PathModel`].
#[derive(Debug, Clone, Default)]
pub struct ArcLengthCache {
    /// Per-segment arc lengths, filled on refresh.
    lengths: Option<Vec<f64>>,
    total: f64,

    cursor: Option<WalkCursor>,
}

#[derive(Debug, Clone, Copy)]
struct WalkCursor {
    distance: f64,
    segment: usize,
    /// Cumulative length of the segments before `segment`.
    before: f64,
}

impl ArcLengthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the length table for `outline` and drops the walk cursor.
    pub fn refresh(&mut self, outline: &Outline) {
        let lengths: Vec<f64> = (0..outline.segment_count())
            .map(|i| outline.segment_length(i))
            .collect();

        let mut total = 0.0;
        for len in &lengths {
            total += *len;
        }

        self.total = total;
        self.lengths = Some(lengths);
        self.cursor = None;
    }

    /// Total length from the last refresh.
    #[inline]
    pub fn total(&self) -> Option<f64> {
        self.lengths.as_ref().map(|_| self.total)
    }

    fn segment_length(&self, outline: &Outline, index: usize) -> f64 {
        match &self.lengths {
            Some(lengths) if lengths.len() == outline.segment_count() => lengths[index],
            _ => outline.segment_length(index),
        }
    }
}

/// Point at arc-length `distance` along `outline`.
///
/// Distances past either end clamp to the corresponding endpoint. With
/// `refresh` the cache's length table is rebuilt first. A query with a
/// strictly larger distance than the previous one resumes from the cached
/// segment instead of walking from the start.
pub(crate) fn evaluate(outline: &Outline, cache: &mut ArcLengthCache, distance: f64, refresh: bool) -> Point {
    if refresh {
        cache.refresh(outline);
    }

    let count = outline.segment_count();
    let (mut segment, mut before) = match cache.cursor {
        Some(c) if distance > c.distance && c.segment < count => (c.segment, c.before),
        _ => (0, 0.0),
    };

    loop {
        let len = cache.segment_length(outline, segment);
        let remaining = distance - before;

        if remaining <= len || segment + 1 == count {
            cache.cursor = Some(WalkCursor { distance, segment, before });

            let t = if len > 0.0 { (remaining / len).clamp(0.0, 1.0) } else { 0.0 };
            return outline.segment(segment).eval(t);
        }

        before += len;
        segment += 1;
    }
}

/// Arc length of `outline`, reusing the cache's table when it is current.
pub(crate) fn length(outline: &Outline, cache: &ArcLengthCache) -> f64 {
    match &cache.lengths {
        Some(lengths) if lengths.len() == outline.segment_count() => cache.total,
        _ => outline.length(),
    }
}

/// An outline together with its arc-length cache.
///
/// Structural edits go through the model so the cache can never describe a
/// different shape than the one being queried.
#[derive(Debug, Clone)]
pub struct PathModel {
    outline: Outline,
    cache: ArcLengthCache,
}

impl PathModel {
    pub fn new(outline: Outline) -> Self {
        Self {
            outline,
            cache: ArcLengthCache::new(),
        }
    }

    #[inline]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn length(&self) -> f64 {
        length(&self.outline, &self.cache)
    }

    pub fn evaluate(&mut self, distance: f64, refresh: bool) -> Point {
        evaluate(&self.outline, &mut self.cache, distance, refresh)
    }

    pub fn refresh(&mut self) {
        self.cache.refresh(&self.outline);
    }

    /// Replaces the outline with its continued copy and refreshes the cache.
    pub fn append_continuation(&mut self, direction: Vec2, distance: f64) {
        self.outline = self.outline.append_continuation(direction, distance);
        self.cache.refresh(&self.outline);
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.outline.start()
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.outline.end()
    }

    pub fn tangent_at_end(&self) -> Option<Vec2> {
        self.outline.end_tangent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ARCLEN_ACCURACY;
    use kurbo::CubicBez;

    fn zigzag() -> Outline {
        Outline::polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(25.0, 10.0),
            ],
            false,
        )
    }

    fn curved() -> Outline {
        Outline::new(
            vec![
                CubicBez::new((0.0, 0.0), (5.0, 8.0), (15.0, 8.0), (20.0, 0.0)),
                CubicBez::new((20.0, 0.0), (25.0, -8.0), (35.0, -8.0), (40.0, 0.0)),
            ],
            false,
        )
    }

    #[test]
    fn distance_zero_is_start() {
        let o = zigzag();
        let mut cache = ArcLengthCache::new();
        assert_eq!(evaluate(&o, &mut cache, 0.0, true), o.start());
    }

    #[test]
    fn clamps_at_both_ends() {
        let o = zigzag();
        let mut cache = ArcLengthCache::new();
        assert_eq!(evaluate(&o, &mut cache, -5.0, true), o.start());
        assert_eq!(evaluate(&o, &mut cache, 1e6, false), o.end());
        assert_eq!(evaluate(&o, &mut cache, 2e6, false), o.end());
    }

    #[test]
    fn full_length_is_end() {
        let o = zigzag();
        let mut cache = ArcLengthCache::new();
        let len = length(&o, &cache);
        let p = evaluate(&o, &mut cache, len, true);
        assert!(p.distance(o.end()) < 1e-9);
    }

    #[test]
    fn walks_into_later_segments() {
        let o = zigzag();
        let mut cache = ArcLengthCache::new();
        let p = evaluate(&o, &mut cache, 15.0, true);
        assert!(p.distance(Point::new(10.0, 5.0)) < 1e-6);
        let p = evaluate(&o, &mut cache, 30.0, false);
        assert!(p.distance(Point::new(20.0, 10.0)) < 1e-6);
    }

    #[test]
    fn warm_cache_matches_cold_queries() {
        let o = curved();
        let mut warm = ArcLengthCache::new();
        evaluate(&o, &mut warm, 0.0, true);

        let total = length(&o, &warm);
        let mut d = 0.0;
        while d <= total + 1.0 {
            let mut cold = ArcLengthCache::new();
            cold.refresh(&o);
            let a = evaluate(&o, &mut warm, d, false);
            let b = evaluate(&o, &mut cold, d, false);
            assert_eq!(a, b, "mismatch at distance {d}");
            d += 0.37;
        }
    }

    #[test]
    fn smaller_distance_after_larger_still_correct() {
        let o = curved();
        let mut cache = ArcLengthCache::new();
        let early = evaluate(&o, &mut cache, 3.0, true);
        evaluate(&o, &mut cache, 35.0, false);
        assert_eq!(evaluate(&o, &mut cache, 3.0, false), early);
    }

    #[test]
    fn unrefreshed_cache_gives_same_points() {
        let o = curved();
        let mut fresh = ArcLengthCache::new();
        let mut stale = ArcLengthCache::new();
        fresh.refresh(&o);
        for d in [0.5, 7.0, 21.0, 44.0] {
            assert_eq!(
                evaluate(&o, &mut fresh, d, false),
                evaluate(&o, &mut stale, d, false)
            );
        }
    }

    #[test]
    fn continuation_adds_exact_length() {
        let mut model = PathModel::new(curved());
        model.refresh();
        let before = model.length();

        model.append_continuation(Vec2::new(1.0, 1.0), 12.0);
        assert!((model.length() - before - 12.0).abs() <= ARCLEN_ACCURACY);
        assert!(!model.outline().is_closed());
    }

    #[test]
    fn models_with_equal_segment_counts_stay_independent() {
        // Same segment count as the zigzag, different geometry.
        let other = Outline::polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(0.0, 50.0),
                Point::new(50.0, 50.0),
                Point::new(50.0, 0.0),
            ],
            false,
        );
        let mut a = PathModel::new(zigzag());
        let mut b = PathModel::new(other.clone());
        a.refresh();
        b.refresh();

        assert!((b.length() - 150.0).abs() < ARCLEN_ACCURACY);
        assert!(b.evaluate(75.0, false).distance(Point::new(25.0, 50.0)) < 1e-6);
        assert!(a.evaluate(75.0, false).distance(a.end()) < 1e-9);
        assert_eq!(b.end(), other.end());
    }

    #[test]
    fn tangent_at_end_follows_last_segment() {
        let model = PathModel::new(zigzag());
        let t = model.tangent_at_end().expect("non-degenerate end");
        assert!((t - Vec2::new(1.0, 0.0)).hypot() < 1e-9);
    }

    #[test]
    fn continuation_point_is_past_old_end() {
        let mut model = PathModel::new(zigzag());
        model.refresh();
        let len = model.length();
        model.append_continuation(Vec2::new(1.0, 0.0), 10.0);

        let p = model.evaluate(len + 5.0, false);
        assert!(p.distance(Point::new(30.0, 10.0)) < 1e-6);
    }
}
