use anyhow::Result;
use tracefill_engine::coords::{ColorRgba, Vec2};

use super::backend::{BrushStamp, CoverageBackend};
use super::brush::{BrushRamp, PaintEvent, PaintEvents};
use super::grid::QuadrantGrid;
use super::mask::{PixelBounds, RegionMask};

/// Fill-stage tuning. Distances are in mask pixels, times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageConfig {
    pub cell_size: u32,
    /// Sample pixels per cell axis used to classify cells.
    pub cell_samples: u32,
    /// Cells closer than this to the brush count as visited.
    pub visit_radius: f32,
    /// Fraction of inside cells to visit before early continue is offered.
    pub continue_fraction: f32,
    /// Regions with fewer inside cells than this use `small_region_fraction`.
    pub small_region_cells: u32,
    pub small_region_fraction: f32,

    pub radius_floor: f32,
    pub radius_ceiling: f32,
    pub ramp_duration: f32,
    /// Minimum brush travel between two paint events.
    pub min_paint_spacing: f32,
    pub max_active_events: usize,

    /// Padding around the mask's bounding box for the accumulation buffer.
    pub bbox_padding: u32,
    /// Frames between coverage reductions.
    pub measure_every: u32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            cell_size: 25,
            cell_samples: 2,
            visit_radius: 12.0,
            continue_fraction: 0.8,
            small_region_cells: 10,
            small_region_fraction: 0.5,

            radius_floor: 20.0,
            radius_ceiling: 30.0,
            ramp_duration: 0.25,
            min_paint_spacing: 5.0,
            max_active_events: 256,

            bbox_padding: 50,
            measure_every: 10,
        }
    }
}

impl CoverageConfig {
    /// Visited-cell count at which early continue becomes available.
    pub fn continue_threshold(&self, unvisited_total: u32) -> u32 {
        if unvisited_total == 0 {
            return 0;
        }
        let fraction = if unvisited_total < self.small_region_cells {
            self.small_region_fraction
        } else {
            self.continue_fraction
        };
        ((unvisited_total as f32 * fraction.clamp(0.0, 1.0)).ceil() as u32).clamp(1, unvisited_total)
    }

    fn ramp(&self) -> BrushRamp {
        BrushRamp {
            radius_floor: self.radius_floor,
            radius_ceiling: self.radius_ceiling,
            ramp_duration: self.ramp_duration,
        }
    }
}

/// Early-continue signal; fires once per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContinueGate {
    Closed,
    Pending,
    Taken,
}

/// Everything owned for the duration of one fill stage.
#[derive(Debug)]
pub struct FillSession {
    /// Mask cropped to the padded bounding box of its inside pixels.
    mask: RegionMask,
    grid: QuadrantGrid,
    threshold: u32,
    gate: ContinueGate,

    events: PaintEvents,
    last_paint: Option<Vec2>,
    color: u32,

    frames: u64,
    coverage: f32,
    /// Backend accepted the stage; otherwise paint is tracked on the grid only.
    backend_ready: bool,
}

impl FillSession {
    #[inline]
    pub fn mask(&self) -> &RegionMask {
        &self.mask
    }

    #[inline]
    pub fn grid(&self) -> &QuadrantGrid {
        &self.grid
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    fn update_gate(&mut self) {
        if self.gate == ContinueGate::Closed && self.grid.visited_count() >= self.threshold {
            self.gate = ContinueGate::Pending;
        }
    }
}

/// Outcome of a brush movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrushOutcome {
    /// A paint event was queued.
    pub painted: bool,
    /// Quadrant cells flipped to visited.
    pub newly_visited: u32,
}

/// Tracks how much of a fill region has been painted.
///
/// Paint goes to the backend's accumulation buffer and is measured every
/// `measure_every` frames; the quadrant grid decides when the player may
/// move on early.
pub struct CoverageEstimator<B> {
    backend: B,
    config: CoverageConfig,
    session: Option<FillSession>,
    stamps: Vec<BrushStamp>,
}

impl<B: CoverageBackend> CoverageEstimator<B> {
    pub fn new(backend: B, config: CoverageConfig) -> Self {
        Self {
            backend,
            config,
            session: None,
            stamps: Vec::new(),
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    #[inline]
    pub fn session(&self) -> Option<&FillSession> {
        self.session.as_ref()
    }

    /// Starts a fill stage over `mask`, painting with `color`.
    ///
    /// Any previous session is ended first. A backend failure is returned
    /// but leaves a usable session: the grid keeps working and coverage
    /// stays at its last known value.
    pub fn begin_stage(&mut self, mask: &RegionMask, color: ColorRgba) -> Result<()> {
        self.end_stage();

        let pad = self.config.bbox_padding as i32;
        let cropped = match mask.bounds() {
            Some(b) => mask.crop(PixelBounds {
                x0: b.x0 - pad,
                y0: b.y0 - pad,
                x1: b.x1 + pad,
                y1: b.y1 + pad,
            }),
            None => mask.crop(PixelBounds { x0: 0, y0: 0, x1: 0, y1: 0 }),
        };

        let grid = QuadrantGrid::from_mask(&cropped, self.config.cell_size, self.config.cell_samples);
        let threshold = self.config.continue_threshold(grid.unvisited_total());
        let inside = cropped.inside_count();

        log::debug!(
            "fill stage: {}x{} px, {} inside, {} cells, threshold {}",
            cropped.width(),
            cropped.height(),
            inside,
            grid.unvisited_total(),
            threshold
        );

        let mut session = FillSession {
            grid,
            threshold,
            gate: ContinueGate::Closed,
            events: PaintEvents::new(self.config.ramp(), self.config.max_active_events),
            last_paint: None,
            color: color.to_packed_rgba8(),
            frames: 0,
            // Nothing to paint counts as done.
            coverage: if inside == 0 { 1.0 } else { 0.0 },
            backend_ready: false,
            mask: cropped,
        };
        session.update_gate();

        let result = if inside == 0 {
            Ok(())
        } else {
            self.backend.begin_stage(&session.mask)
        };
        session.backend_ready = inside > 0 && result.is_ok();

        self.session = Some(session);
        result
    }

    /// Drops the session and releases backend resources.
    pub fn end_stage(&mut self) {
        if let Some(session) = self.session.take() {
            if session.backend_ready {
                self.backend.end_stage();
            }
        }
    }

    /// Brush at level-space `pos` at time `now`.
    ///
    /// Always updates the quadrant grid; queues a paint event only when the
    /// brush travelled at least `min_paint_spacing` since the last one.
    pub fn brush_moved(&mut self, pos: Vec2, now: f32) -> BrushOutcome {
        let Some(session) = self.session.as_mut() else {
            return BrushOutcome::default();
        };
        let px = session.mask.to_pixel(pos);
        if !px.is_finite() {
            return BrushOutcome::default();
        }

        let newly_visited = session.grid.visit(px, self.config.visit_radius);
        session.update_gate();

        let painted = session
            .last_paint
            .is_none_or(|last| last.distance(px) >= self.config.min_paint_spacing);
        if painted {
            session.events.push(
                PaintEvent {
                    pos: px,
                    start_time: now,
                    color: session.color,
                },
                now,
            );
            session.last_paint = Some(px);
        }

        BrushOutcome { painted, newly_visited }
    }

    /// Variable-rate update: stamps active paint and, every `measure_every`
    /// frames, measures coverage.
    ///
    /// Returns the new coverage when a measurement ran.
    pub fn frame(&mut self, now: f32) -> Result<Option<f32>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        session.events.drain_frame(now, &mut self.stamps);
        if !session.backend_ready {
            return Ok(None);
        }

        session.frames += 1;
        let every = u64::from(self.config.measure_every.max(1));
        if session.frames % every != 0 {
            self.backend.rasterize(&self.stamps)?;
            return Ok(None);
        }

        let counts = self.backend.rasterize_and_measure(&self.stamps)?;
        session.coverage = counts.fraction();
        log::trace!("coverage: {}/{} px", counts.painted, counts.inside);
        Ok(Some(session.coverage))
    }

    /// Flushes pending paint and measures immediately.
    pub fn measure_now(&mut self, now: f32) -> Result<f32> {
        let Some(session) = self.session.as_mut() else {
            return Ok(1.0);
        };
        session.events.drain_frame(now, &mut self.stamps);
        if !session.backend_ready {
            return Ok(session.coverage);
        }

        let counts = self.backend.rasterize_and_measure(&self.stamps)?;
        session.coverage = counts.fraction();
        Ok(session.coverage)
    }

    /// Last measured painted fraction of the region.
    pub fn coverage(&self) -> f32 {
        self.session.as_ref().map_or(1.0, |s| s.coverage)
    }

    pub fn visited_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.grid.visited_count())
    }

    /// Whether early continue has become available this stage.
    pub fn early_continue_available(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.gate != ContinueGate::Closed)
    }

    /// Returns `true` exactly once per stage, when early continue first
    /// becomes available.
    pub fn take_early_continue(&mut self) -> bool {
        match self.session.as_mut() {
            Some(s) if s.gate == ContinueGate::Pending => {
                s.gate = ContinueGate::Taken;
                true
            }
            _ => false,
        }
    }
}
