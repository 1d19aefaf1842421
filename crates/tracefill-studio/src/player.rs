use tracefill_core::coverage::CoverageBackend;
use tracefill_core::stage::{StageMachine, StageState};
use tracefill_engine::coords::{Rect, Vec2};
use tracefill_engine::input::{InputEvent, InputState, PointerButtonEvent, PointerId, PointerPhase};

/// Level units the brush travels per frame while sweeping a region.
const SWEEP_STEP: f32 = 3.0;

/// Plays a level the way a tidy player would: releases strokes inside the
/// tolerance band and sweeps each fill region row by row.
#[derive(Debug, Default)]
pub struct ScriptedPlayer {
    sweep: Vec<Vec2>,
    next: usize,
    palette_choice: usize,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input events for this frame. UI actions (colour choice, continue)
    /// are applied to the machine directly.
    pub fn frame<B: CoverageBackend>(
        &mut self,
        machine: &mut StageMachine<B>,
        input: &InputState,
    ) -> Vec<InputEvent> {
        match machine.state() {
            StageState::WaitingToDraw if !input.pointer_down() => vec![press(machine.cursor())],

            StageState::DrawingStroke => {
                let done = machine.stroke().is_some_and(|s| s.within_tolerance());
                if done && input.pointer_down() {
                    vec![release(machine.cursor())]
                } else if !done && !input.pointer_down() {
                    vec![press(machine.cursor())]
                } else {
                    Vec::new()
                }
            }

            StageState::SelectColor => {
                let colors = machine.palette().map_or(0, <[_]>::len);
                let region = machine.info().fill_index().map(|i| {
                    let mask = &machine.level().fills[i].mask;
                    (mask.level_rect(), mask.pixels_per_unit())
                });

                if colors > 0 && machine.select_color(self.palette_choice % colors) {
                    self.palette_choice += 1;
                    if let Some((rect, ppu)) = region {
                        self.plan_sweep(rect, machine.estimator().config().radius_floor / ppu);
                    }
                }
                Vec::new()
            }

            StageState::DrawingFill => match self.sweep.get(self.next).copied() {
                Some(pos) => {
                    self.next += 1;
                    if input.pointer_down() {
                        vec![InputEvent::PointerMoved { pointer: PointerId::MOUSE, pos }]
                    } else {
                        vec![press(pos)]
                    }
                }
                None if input.pointer_down() => vec![release(machine.cursor())],
                None => {
                    machine.finish_fill();
                    Vec::new()
                }
            },

            _ => Vec::new(),
        }
    }

    /// Serpentine path over `rect` with rows one brush radius apart.
    fn plan_sweep(&mut self, rect: Rect, radius: f32) {
        let row_gap = radius.max(1.0);
        let (min, max) = (rect.min(), rect.max());

        self.sweep.clear();
        self.next = 0;

        let mut y = min.y + row_gap / 2.0;
        let mut forward = true;
        while y <= max.y {
            let steps = ((max.x - min.x) / SWEEP_STEP).ceil().max(1.0) as u32;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let t = if forward { t } else { 1.0 - t };
                let x = min.x + (max.x - min.x) * t;
                self.sweep.push(Vec2::new(x, y));
            }
            forward = !forward;
            y += row_gap;
        }
        log::debug!("sweep planned: {} points", self.sweep.len());
    }
}

fn press(pos: Vec2) -> InputEvent {
    InputEvent::PointerButton(PointerButtonEvent {
        pointer: PointerId::MOUSE,
        phase: PointerPhase::Pressed,
        pos,
    })
}

fn release(pos: Vec2) -> InputEvent {
    InputEvent::PointerButton(PointerButtonEvent {
        pointer: PointerId::MOUSE,
        phase: PointerPhase::Released,
        pos,
    })
}
