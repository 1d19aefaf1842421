use crate::coords::Vec2;

/// Identifies a pointer (mouse or touch contact).
///
/// The drawing game follows one pointer at a time: the first one pressed.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const MOUSE: PointerId = PointerId(0);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointerPhase {
    Pressed,
    Released,
}

/// Pointer press/release.
///
/// The position is carried so event processing does not depend on a separately
/// tracked "current pointer position".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub pos: Vec2,
}

/// Platform-agnostic input events.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerButton(PointerButtonEvent),

    /// Absolute pointer position.
    PointerMoved { pointer: PointerId, pos: Vec2 },

    /// Relative pointer motion (touch drag deltas), already in level units.
    PointerDelta { pointer: PointerId, delta: Vec2 },

    /// Pointer left the surface; treated as a release of any held pointer.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}
