use std::collections::VecDeque;

use tracefill_engine::coords::Vec2;

use super::backend::BrushStamp;

/// Radius ramp for paint events, in mask pixels and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushRamp {
    pub radius_floor: f32,
    pub radius_ceiling: f32,
    pub ramp_duration: f32,
}

impl BrushRamp {
    /// Radius of an event `age` seconds after it was pushed.
    #[inline]
    pub fn radius_at(&self, age: f32) -> f32 {
        if self.ramp_duration <= 0.0 {
            return self.radius_ceiling;
        }
        let k = (age / self.ramp_duration).clamp(0.0, 1.0);
        self.radius_floor + (self.radius_ceiling - self.radius_floor) * k
    }

    #[inline]
    pub fn is_complete(&self, age: f32) -> bool {
        age >= self.ramp_duration
    }
}

/// One dab of paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintEvent {
    /// Mask pixel coordinates.
    pub pos: Vec2,
    pub start_time: f32,
    pub color: u32,
}

impl PaintEvent {
    #[inline]
    pub fn stamp(&self, ramp: &BrushRamp, now: f32) -> BrushStamp {
        BrushStamp {
            center: [self.pos.x, self.pos.y],
            radius: ramp.radius_at(now - self.start_time),
            color: self.color,
        }
    }
}

/// Bounded FIFO of in-flight paint events.
///
/// Events are stamped every frame until their radius reaches the ceiling.
/// Pushing into a full list evicts the oldest event, which is stamped one
/// last time at its current radius on the next frame.
#[derive(Debug, Clone)]
pub struct PaintEvents {
    ramp: BrushRamp,
    capacity: usize,
    active: VecDeque<PaintEvent>,
    evicted: Vec<BrushStamp>,
}

impl PaintEvents {
    pub fn new(ramp: BrushRamp, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ramp,
            capacity,
            active: VecDeque::with_capacity(capacity),
            evicted: Vec::new(),
        }
    }

    pub fn push(&mut self, event: PaintEvent, now: f32) {
        if self.active.len() == self.capacity {
            if let Some(oldest) = self.active.pop_front() {
                log::trace!("paint: evicting event from t={:.3}", oldest.start_time);
                self.evicted.push(oldest.stamp(&self.ramp, now));
            }
        }
        self.active.push_back(event);
    }

    /// Writes this frame's stamps into `out` (oldest first) and retires
    /// events whose ramp has completed.
    pub fn drain_frame(&mut self, now: f32, out: &mut Vec<BrushStamp>) {
        out.clear();
        out.append(&mut self.evicted);
        out.extend(self.active.iter().map(|e| e.stamp(&self.ramp, now)));

        let ramp = self.ramp;
        self.active.retain(|e| !ramp.is_complete(now - e.start_time));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.evicted.is_empty()
    }
}
