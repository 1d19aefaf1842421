use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytemuck::{Pod, Zeroable};
use tracefill_engine::device::Gpu;
use wgpu::util::DeviceExt;

use super::backend::{BrushStamp, CoverageBackend, CoverageCounts};
use super::mask::RegionMask;

const WORKGROUP: u32 = 8;

/// Compute-shader coverage backend.
///
/// Per fill stage it owns:
/// - one `u32` accumulation word per mask pixel (packed colour, 0 = unpainted)
/// - the uploaded mask
/// - a growable stamp array
/// - two atomic counters plus a `MAP_READ` staging copy
pub struct GpuCoverage {
    gpu: Arc<Gpu>,

    bind_group_layout: wgpu::BindGroupLayout,
    rasterize_pipeline: wgpu::ComputePipeline,
    init_pipeline: wgpu::ComputePipeline,
    count_pipeline: wgpu::ComputePipeline,

    stage: Option<StageBuffers>,
}

struct StageBuffers {
    width: u32,
    height: u32,

    params_ubo: wgpu::Buffer,
    stamps_sbo: wgpu::Buffer,
    stamp_capacity: usize,
    accum_sbo: wgpu::Buffer,
    mask_sbo: wgpu::Buffer,
    counters_sbo: wgpu::Buffer,
    readback: wgpu::Buffer,

    bind_group: wgpu::BindGroup,
}

impl GpuCoverage {
    pub fn new(gpu: Arc<Gpu>) -> Self {
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tracefill coverage shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/coverage.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tracefill coverage bgl"),
            entries: &[
                buffer_entry(0, wgpu::BufferBindingType::Uniform),
                buffer_entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                buffer_entry(2, wgpu::BufferBindingType::Storage { read_only: false }),
                buffer_entry(3, wgpu::BufferBindingType::Storage { read_only: true }),
                buffer_entry(4, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tracefill coverage pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = |entry: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        let rasterize_pipeline = pipeline("rasterize");
        let init_pipeline = pipeline("init_counters");
        let count_pipeline = pipeline("count_coverage");

        Self {
            gpu,
            bind_group_layout,
            rasterize_pipeline,
            init_pipeline,
            count_pipeline,
            stage: None,
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_stamp_capacity(&mut self, required: usize) {
        let Some(stage) = self.stage.as_mut() else { return };
        if required <= stage.stamp_capacity {
            return;
        }

        let new_cap = required.next_power_of_two().max(64);
        stage.stamps_sbo = self.gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("tracefill coverage stamps"),
            size: (new_cap * std::mem::size_of::<BrushStamp>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        stage.stamp_capacity = new_cap;
        stage.bind_group = create_bind_group(self.gpu.device(), &self.bind_group_layout, stage);
    }

    /// Uploads `stamps` and records the rasterisation pass into `encoder`.
    fn record_rasterize(&mut self, encoder: &mut wgpu::CommandEncoder, stamps: &[BrushStamp]) {
        if stamps.is_empty() {
            return;
        }
        self.ensure_stamp_capacity(stamps.len());
        let Some(stage) = self.stage.as_ref() else { return };

        let queue = self.gpu.queue();
        queue.write_buffer(&stage.stamps_sbo, 0, bytemuck::cast_slice(stamps));
        queue.write_buffer(
            &stage.params_ubo,
            0,
            bytemuck::bytes_of(&Params {
                width: stage.width,
                height: stage.height,
                stamp_count: stamps.len() as u32,
                _pad: 0,
            }),
        );

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("tracefill rasterize pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.rasterize_pipeline);
        cpass.set_bind_group(0, &stage.bind_group, &[]);
        cpass.dispatch_workgroups(
            stage.width.div_ceil(WORKGROUP),
            stage.height.div_ceil(WORKGROUP),
            1,
        );
    }

    /// Records counter reset, reduction and the staging copy into `encoder`.
    fn record_measure(&self, encoder: &mut wgpu::CommandEncoder, stage: &StageBuffers) {
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("tracefill coverage init pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.init_pipeline);
            cpass.set_bind_group(0, &stage.bind_group, &[]);
            cpass.dispatch_workgroups(1, 1, 1);
        }
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("tracefill coverage count pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.count_pipeline);
            cpass.set_bind_group(0, &stage.bind_group, &[]);
            cpass.dispatch_workgroups(
                stage.width.div_ceil(WORKGROUP),
                stage.height.div_ceil(WORKGROUP),
                1,
            );
        }

        let size = std::mem::size_of::<CoverageCounts>() as u64;
        encoder.copy_buffer_to_buffer(&stage.counters_sbo, 0, &stage.readback, 0, size);
    }

    fn submit_and_read(&self, encoder: wgpu::CommandEncoder) -> Result<CoverageCounts> {
        let stage = self.stage.as_ref().context("no fill stage is active")?;
        self.gpu.queue().submit(Some(encoder.finish()));

        let counts = self.gpu.read_buffer::<CoverageCounts>(&stage.readback)?;
        counts.first().copied().context("coverage readback was empty")
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }
}

impl CoverageBackend for GpuCoverage {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn begin_stage(&mut self, mask: &RegionMask) -> Result<()> {
        let device = self.gpu.device();
        let limits = device.limits();

        let (width, height) = (mask.width().max(1), mask.height().max(1));
        let pixels = u64::from(width) * u64::from(height);
        let bytes = pixels * std::mem::size_of::<u32>() as u64;
        if bytes > u64::from(limits.max_storage_buffer_binding_size) {
            bail!(
                "mask of {}x{} exceeds the storage binding limit ({} bytes)",
                width,
                height,
                limits.max_storage_buffer_binding_size
            );
        }
        let max_groups = u64::from(limits.max_compute_workgroups_per_dimension);
        if u64::from(width.div_ceil(WORKGROUP)) > max_groups
            || u64::from(height.div_ceil(WORKGROUP)) > max_groups
        {
            bail!("mask of {width}x{height} exceeds the dispatch limit");
        }

        let mut words = mask.to_words();
        words.resize(pixels as usize, 0);

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tracefill coverage params"),
            size: std::mem::size_of::<Params>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let stamps_sbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tracefill coverage stamps"),
            size: (64 * std::mem::size_of::<BrushStamp>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Fresh buffers are zero-initialised, which is the cleared state.
        let accum_sbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tracefill coverage accumulation"),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let mask_sbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tracefill coverage mask"),
            contents: bytemuck::cast_slice(&words),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let counters_sbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tracefill coverage counters"),
            size: std::mem::size_of::<CoverageCounts>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tracefill coverage readback"),
            size: std::mem::size_of::<CoverageCounts>() as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.gpu.queue().write_buffer(
            &params_ubo,
            0,
            bytemuck::bytes_of(&Params {
                width,
                height,
                stamp_count: 0,
                _pad: 0,
            }),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tracefill coverage bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: params_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: stamps_sbo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: accum_sbo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: mask_sbo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: counters_sbo.as_entire_binding() },
            ],
        });

        log::debug!("gpu coverage: stage buffers {width}x{height} ({bytes} bytes)");

        self.stage = Some(StageBuffers {
            width,
            height,
            params_ubo,
            stamps_sbo,
            stamp_capacity: 64,
            accum_sbo,
            mask_sbo,
            counters_sbo,
            readback,
            bind_group,
        });
        Ok(())
    }

    fn rasterize(&mut self, stamps: &[BrushStamp]) -> Result<()> {
        if self.stage.is_none() {
            bail!("no fill stage is active");
        }
        if stamps.is_empty() {
            return Ok(());
        }

        let mut encoder = self.encoder("tracefill rasterize encoder");
        self.record_rasterize(&mut encoder, stamps);
        self.gpu.queue().submit(Some(encoder.finish()));
        Ok(())
    }

    fn measure(&mut self) -> Result<CoverageCounts> {
        let stage = self.stage.as_ref().context("no fill stage is active")?;
        let mut encoder = self.encoder("tracefill coverage encoder");
        self.record_measure(&mut encoder, stage);
        self.submit_and_read(encoder)
    }

    /// Both passes go into one encoder and one submission.
    fn rasterize_and_measure(&mut self, stamps: &[BrushStamp]) -> Result<CoverageCounts> {
        if self.stage.is_none() {
            bail!("no fill stage is active");
        }

        let mut encoder = self.encoder("tracefill coverage encoder");
        self.record_rasterize(&mut encoder, stamps);
        let stage = self.stage.as_ref().context("no fill stage is active")?;
        self.record_measure(&mut encoder, stage);
        self.submit_and_read(encoder)
    }

    fn end_stage(&mut self) {
        if let Some(stage) = self.stage.take() {
            stage.accum_sbo.destroy();
            stage.mask_sbo.destroy();
            stage.stamps_sbo.destroy();
        }
    }
}

fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stage: &StageBuffers,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tracefill coverage bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: stage.params_ubo.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: stage.stamps_sbo.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: stage.accum_sbo.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 3, resource: stage.mask_sbo.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 4, resource: stage.counters_sbo.as_entire_binding() },
        ],
    })
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform layout (16 bytes), matches `Params` in `shaders/coverage.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Params {
    width: u32,
    height: u32,
    stamp_count: u32,
    _pad: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CpuCoverage;
    use tracefill_engine::device::GpuInit;

    fn gpu() -> Option<Arc<Gpu>> {
        match Gpu::new_blocking(GpuInit::default()) {
            Ok(gpu) => Some(Arc::new(gpu)),
            Err(err) => {
                eprintln!("skipping gpu test: {err:#}");
                None
            }
        }
    }

    fn stamps() -> Vec<BrushStamp> {
        vec![
            BrushStamp { center: [10.0, 10.0], radius: 6.0, color: 0xFF00_00FF },
            BrushStamp { center: [30.5, 12.25], radius: 9.5, color: 0xFF00_FF00 },
            BrushStamp { center: [-3.0, 40.0], radius: 12.0, color: 0xFFFF_0000 },
        ]
    }

    #[test]
    fn matches_cpu_reference() {
        let Some(gpu) = gpu() else { return };

        let mask = RegionMask::from_fn(53, 47, |x, y| (x + y) % 3 != 0 || x > 40);
        let mut gpu_cov = GpuCoverage::new(gpu);
        let mut cpu_cov = CpuCoverage::new();
        gpu_cov.begin_stage(&mask).unwrap();
        cpu_cov.begin_stage(&mask).unwrap();

        let g = gpu_cov.rasterize_and_measure(&stamps()).unwrap();
        let c = cpu_cov.rasterize_and_measure(&stamps()).unwrap();
        assert_eq!(g, c);

        // counters are reset between reductions
        assert_eq!(gpu_cov.measure().unwrap(), c);
    }

    #[test]
    fn empty_mask_reports_full_coverage() {
        let Some(gpu) = gpu() else { return };

        let mask = RegionMask::from_fn(16, 16, |_, _| false);
        let mut cov = GpuCoverage::new(gpu);
        cov.begin_stage(&mask).unwrap();
        let counts = cov.measure().unwrap();
        assert_eq!(counts.inside, 0);
        assert_eq!(counts.fraction(), 1.0);
    }

    #[test]
    fn measuring_without_a_stage_fails() {
        let Some(gpu) = gpu() else { return };
        let mut cov = GpuCoverage::new(gpu);
        assert!(cov.measure().is_err());
    }
}
