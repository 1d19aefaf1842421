/// Fixed-rate tick accumulator.
///
/// Feed it variable frame deltas; it reports how many fixed ticks of length
/// `step` are due. At most `max_steps` ticks are reported per frame, and the
/// remainder beyond that is dropped rather than carried into later frames.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
    ticks: u64,
}

impl FixedStep {
    /// 50 Hz, at most 5 ticks per frame.
    pub const DEFAULT_STEP: f32 = 0.02;

    pub fn new(step: f32, max_steps: u32) -> Self {
        assert!(step > 0.0 && step.is_finite(), "fixed step must be positive");
        Self {
            step,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Length of one fixed tick, in seconds.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Total fixed ticks issued so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Adds `dt` seconds and returns the number of fixed ticks now due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let mut due = 0;
        while self.accumulator >= self.step && due < self.max_steps {
            self.accumulator -= self.step;
            due += 1;
        }

        if due == self.max_steps && self.accumulator >= self.step {
            log::trace!("fixed step fell behind; dropping {:.3}s", self.accumulator);
            self.accumulator %= self.step;
        }

        self.ticks += u64::from(due);
        due
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP, 5)
    }
}
