use crate::coords::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, PointerButtonEvent, PointerId, PointerPhase};

/// Current input state for the drawing surface.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the surface is focused.
    pub focused: bool,

    /// Last known pointer position in level units.
    pub pointer_pos: Option<Vec2>,

    /// Pointer currently held down, if any.
    pub active_pointer: Option<PointerId>,
}

impl InputState {
    /// Applies a platform-agnostic event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid a stuck press when focus changes mid-stroke.
                    self.release_active(frame);
                }
            }

            InputEvent::PointerMoved { pointer, pos } => {
                if self.tracks(*pointer) {
                    self.pointer_pos = Some(*pos);
                }
            }

            InputEvent::PointerDelta { pointer, delta } => {
                if self.tracks(*pointer) {
                    frame.delta += *delta;
                    if let Some(p) = self.pointer_pos.as_mut() {
                        *p += *delta;
                    }
                }
            }

            InputEvent::PointerLeft => {
                self.release_active(frame);
            }

            InputEvent::PointerButton(PointerButtonEvent { pointer, phase, pos }) => match phase {
                PointerPhase::Pressed => {
                    if self.active_pointer.is_none() {
                        self.active_pointer = Some(*pointer);
                        self.pointer_pos = Some(*pos);
                        frame.pressed = true;
                    }
                }
                PointerPhase::Released => {
                    if self.active_pointer == Some(*pointer) {
                        self.pointer_pos = Some(*pos);
                        self.release_active(frame);
                    }
                }
            },
        }

        frame.push_event(ev);
    }

    #[inline]
    pub fn pointer_down(&self) -> bool {
        self.active_pointer.is_some()
    }

    fn tracks(&self, pointer: PointerId) -> bool {
        self.active_pointer.is_none_or(|p| p == pointer)
    }

    fn release_active(&mut self, frame: &mut InputFrame) {
        if self.active_pointer.take().is_some() {
            frame.released = true;
        }
    }
}
