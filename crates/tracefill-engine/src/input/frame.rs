use crate::coords::Vec2;

use super::types::InputEvent;

/// Per-frame input deltas.
///
/// `InputState` holds the current state (held pointer, position).
/// `InputFrame` holds the transitions that happened since the last clear.
/// Consumers apply them at their next fixed tick, then clear the frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// The tracked pointer went down this frame.
    pub pressed: bool,

    /// The tracked pointer went up this frame.
    pub released: bool,

    /// Sum of relative motion this frame.
    pub delta: Vec2,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.pressed = false;
        self.released = false;
        self.delta = Vec2::zero();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
