/// How the naive traversal time of a stroke is smoothed into the time the
/// player is given to trace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedCurve {
    /// `min + (max - min) * σ(t0 - c)`, with `c` chosen so a stroke of
    /// `mid_length` takes exactly `mid_time`.
    #[default]
    Anchored,
    /// `max / (1 + e^-(t0 - min))`.
    Logistic,
}

/// Pacing parameters for stroke stages, in seconds and level units.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedModel {
    pub min_time: f64,
    pub max_time: f64,
    pub mid_time: f64,
    pub mid_length: f64,
    pub curve: SpeedCurve,
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self {
            min_time: 0.5,
            max_time: 3.0,
            mid_time: 1.0,
            mid_length: 50.0,
            curve: SpeedCurve::Anchored,
        }
    }
}

impl SpeedModel {
    /// Time allotted to trace a stroke of `length` units.
    pub fn real_time(&self, length: f64) -> f64 {
        debug_assert!(self.mid_time > 0.0 && self.mid_length > 0.0);
        debug_assert!(self.max_time > self.min_time && self.min_time >= 0.0);

        let mid_speed = self.mid_length / self.mid_time;
        let t0 = length / mid_speed;

        match self.curve {
            SpeedCurve::Anchored => {
                let span = self.max_time - self.min_time;
                let r = ((self.mid_time - self.min_time) / span).clamp(0.01, 0.99);
                let c = self.mid_time - (r / (1.0 - r)).ln();
                self.min_time + span * sigmoid(t0 - c)
            }
            SpeedCurve::Logistic => self.max_time / (1.0 + (-(t0 - self.min_time)).exp()),
        }
    }

    /// Tracing speed in units per second for a stroke of `length` units.
    pub fn speed(&self, length: f64) -> f64 {
        length / self.real_time(length)
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_length_takes_mid_time() {
        let m = SpeedModel::default();
        assert!((m.real_time(50.0) - 1.0).abs() < 1e-9);
        assert!((m.speed(50.0) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn anchored_is_bounded_and_monotonic() {
        let m = SpeedModel::default();
        let mut prev = 0.0;
        for i in 1..400 {
            let t = m.real_time(i as f64 * 2.5);
            assert!(t > m.min_time && t < m.max_time);
            assert!(t > prev);
            prev = t;
        }
        assert!((m.real_time(1e6) - m.max_time).abs() < 1e-6);
    }

    #[test]
    fn logistic_tends_to_max_time() {
        let m = SpeedModel {
            curve: SpeedCurve::Logistic,
            ..SpeedModel::default()
        };
        let mut prev = 0.0;
        for i in 0..200 {
            let t = m.real_time(i as f64 * 5.0);
            assert!(t > prev && t < m.max_time);
            prev = t;
        }
        assert!((m.real_time(1e6) - m.max_time).abs() < 1e-6);
    }

    #[test]
    fn zero_length_has_zero_speed() {
        assert_eq!(SpeedModel::default().speed(0.0), 0.0);
    }
}
