mod demo;
mod player;

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracefill_core::GameConfig;
use tracefill_core::coverage::{CoverageBackend, CpuCoverage, GpuCoverage};
use tracefill_core::stage::{StageEvent, StageMachine, StageState, SubscriptionScope};
use tracefill_engine::device::{Gpu, GpuInit};
use tracefill_engine::input::{InputFrame, InputState};
use tracefill_engine::logging::{LoggingConfig, init_logging};
use tracefill_engine::time::{FixedStep, FrameClock};

use player::ScriptedPlayer;

const FRAME: Duration = Duration::from_micros(16_667);

/// Two minutes of simulated play.
const MAX_FRAMES: u64 = 60 * 120;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let force_cpu = std::env::args().skip(1).any(|a| a == "--cpu");

    let level = demo::demo_level();
    level.validate().context("demo level is invalid")?;

    let backend = coverage_backend(force_cpu);
    let mut machine = StageMachine::new(level, GameConfig::default(), backend);
    let (_, events) = machine.observers_mut().subscribe_channel(SubscriptionScope::Level);
    machine.start();

    let mut player = ScriptedPlayer::new();
    let mut input = InputState {
        focused: true,
        ..InputState::default()
    };
    let mut frame = InputFrame::default();
    let mut clock = FrameClock::new();
    let mut fixed = FixedStep::default();
    let start = Instant::now();

    for i in 1..=MAX_FRAMES {
        let time = clock.tick_at(start + FRAME * i as u32);

        for ev in player.frame(&mut machine, &input) {
            input.apply_event(&mut frame, ev);
        }
        machine.apply_input(&input, &frame);
        frame.clear();

        for _ in 0..fixed.advance(time.dt) {
            machine.fixed_update(fixed.step());
        }
        machine.frame_update();

        log_events(&events);

        if machine.state() == StageState::Finished {
            break;
        }
    }

    let Some(results) = machine.results() else {
        bail!("level did not finish within {MAX_FRAMES} frames");
    };
    for (i, accuracy) in results.stage_accuracy.iter().enumerate() {
        log::info!("stage {i}: {:.1}%", accuracy * 100.0);
    }
    log::info!("overall accuracy: {}%", results.percent());
    Ok(())
}

/// GPU compute when an adapter is available, CPU otherwise.
fn coverage_backend(force_cpu: bool) -> Box<dyn CoverageBackend> {
    if force_cpu {
        return Box::new(CpuCoverage::new());
    }
    match Gpu::new_blocking(GpuInit::default()) {
        Ok(gpu) => {
            let info = gpu.adapter_info();
            log::info!("coverage on {} ({:?})", info.name, info.backend);
            Box::new(GpuCoverage::new(Arc::new(gpu)))
        }
        Err(err) => {
            log::warn!("no GPU for coverage, using CPU: {err:#}");
            Box::new(CpuCoverage::new())
        }
    }
}

fn log_events(events: &Receiver<StageEvent>) {
    for ev in events.try_iter() {
        match ev {
            StageEvent::CursorMoved { .. } | StageEvent::StrokeProgress { .. } => log::trace!("{ev:?}"),
            StageEvent::FillProgress { stage_index, coverage } => {
                log::debug!("fill {stage_index}: {:.1}%", coverage * 100.0);
            }
            other => log::info!("{other:?}"),
        }
    }
}
