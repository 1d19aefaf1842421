use kurbo::{CubicBez, Point};
use tracefill_core::Level;
use tracefill_core::coverage::RegionMask;
use tracefill_core::path::Outline;
use tracefill_engine::coords::{ColorRgba, Vec2};

/// Handle length for a quarter circle drawn with one cubic.
const KAPPA: f64 = 0.552_284_749_8;

/// Mask resolution of the demo fills.
const PIXELS_PER_UNIT: f32 = 2.0;

/// A small built-in level: a circle and a wave to trace, then the circle's
/// disc and a box beneath the wave to paint.
pub fn demo_level() -> Level {
    let center = Point::new(100.0, 100.0);
    let radius = 40.0;

    Level::new("demo")
        .with_stroke(circle(center, radius))
        .with_stroke(wave(Point::new(40.0, 190.0), 120.0, 12.0))
        .with_fill(
            disc_mask(center, radius),
            vec![
                ColorRgba::from_srgb_u8(0xE6, 0x39, 0x46, 0xFF),
                ColorRgba::from_srgb_u8(0x45, 0x7B, 0x9D, 0xFF),
                ColorRgba::from_srgb_u8(0xF4, 0xA2, 0x61, 0xFF),
            ],
        )
        .with_fill(
            box_mask(Vec2::new(40.0, 200.0), Vec2::new(160.0, 240.0)),
            vec![ColorRgba::from_srgb_u8(0x2A, 0x9D, 0x8F, 0xFF)],
        )
}

fn circle(c: Point, r: f64) -> Outline {
    let k = r * KAPPA;
    let (x, y) = (c.x, c.y);
    Outline::new(
        vec![
            CubicBez::new((x + r, y), (x + r, y + k), (x + k, y + r), (x, y + r)),
            CubicBez::new((x, y + r), (x - k, y + r), (x - r, y + k), (x - r, y)),
            CubicBez::new((x - r, y), (x - r, y - k), (x - k, y - r), (x, y - r)),
            CubicBez::new((x, y - r), (x + k, y - r), (x + r, y - k), (x + r, y)),
        ],
        true,
    )
}

fn wave(start: Point, width: f64, amplitude: f64) -> Outline {
    let half = width / 4.0;
    let mut segments = Vec::new();
    let mut p = start;
    for i in 0..4 {
        let dy = if i % 2 == 0 { -amplitude } else { amplitude };
        let q = Point::new(p.x + half, p.y);
        segments.push(CubicBez::new(
            p,
            Point::new(p.x + half / 3.0, p.y + dy),
            Point::new(q.x - half / 3.0, q.y + dy),
            q,
        ));
        p = q;
    }
    Outline::new(segments, false)
}

/// Mask covering the level-space box `[min, max]`, with a one-unit margin.
fn mask_over(min: Vec2, max: Vec2, inside: impl Fn(Vec2) -> bool) -> RegionMask {
    let origin = min - Vec2::new(1.0, 1.0);
    let size = (max - min + Vec2::new(2.0, 2.0)) * PIXELS_PER_UNIT;
    let (w, h) = (size.x.ceil() as u32, size.y.ceil() as u32);

    RegionMask::from_fn(w, h, |x, y| {
        let level = origin + Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / PIXELS_PER_UNIT;
        inside(level)
    })
    .with_placement(origin, PIXELS_PER_UNIT)
}

fn disc_mask(c: Point, r: f64) -> RegionMask {
    let c = Vec2::new(c.x as f32, c.y as f32);
    let r = r as f32;
    mask_over(c - Vec2::new(r, r), c + Vec2::new(r, r), |p| p.distance(c) <= r)
}

fn box_mask(min: Vec2, max: Vec2) -> RegionMask {
    mask_over(min, max, |p| p.x >= min.x && p.y >= min.y && p.x <= max.x && p.y <= max.y)
}
