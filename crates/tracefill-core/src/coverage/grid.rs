use tracefill_engine::coords::{Rect, Vec2};

use super::mask::RegionMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// No sampled pixel of the cell lies inside the region.
    Outside,
    Unvisited,
    Visited,
}

/// Coarse grid over a mask tracking which parts of the region the brush has
/// passed over.
#[derive(Debug, Clone)]
pub struct QuadrantGrid {
    cols: u32,
    rows: u32,
    cell_size: u32,
    cells: Vec<Quadrant>,

    unvisited_total: u32,
    visited: u32,
}

impl QuadrantGrid {
    /// Classifies every `cell_size` square of `mask` by sampling
    /// `samples_per_axis` evenly spaced pixels along each axis.
    pub fn from_mask(mask: &RegionMask, cell_size: u32, samples_per_axis: u32) -> Self {
        assert!(cell_size > 0, "quadrant cell size must be positive");

        let cols = mask.width().div_ceil(cell_size);
        let rows = mask.height().div_ceil(cell_size);
        let samples = samples_per_axis.max(1);

        let mut cells = Vec::with_capacity(cols as usize * rows as usize);
        let mut unvisited_total = 0;

        for row in 0..rows {
            for col in 0..cols {
                let any_inside = (0..samples).any(|sy| {
                    (0..samples).any(|sx| {
                        let x = sample_coord(col, sx, samples, cell_size, mask.width());
                        let y = sample_coord(row, sy, samples, cell_size, mask.height());
                        mask.is_inside(i64::from(x), i64::from(y))
                    })
                });

                if any_inside {
                    unvisited_total += 1;
                    cells.push(Quadrant::Unvisited);
                } else {
                    cells.push(Quadrant::Outside);
                }
            }
        }

        Self {
            cols,
            rows,
            cell_size,
            cells,
            unvisited_total,
            visited: 0,
        }
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Panics when `(col, row)` is outside the grid.
    #[inline]
    pub fn cell(&self, col: u32, row: u32) -> Quadrant {
        assert!(col < self.cols && row < self.rows);
        self.cells[(row * self.cols + col) as usize]
    }

    /// Cells that were inside the region when the grid was built.
    #[inline]
    pub fn unvisited_total(&self) -> u32 {
        self.unvisited_total
    }

    #[inline]
    pub fn visited_count(&self) -> u32 {
        self.visited
    }

    /// Pixel rectangle of cell `(col, row)`.
    pub fn cell_rect(&self, col: u32, row: u32) -> Rect {
        let s = self.cell_size as f32;
        Rect::new(col as f32 * s, row as f32 * s, s, s)
    }

    /// Marks every unvisited cell within `radius` pixels of `center` as
    /// visited and returns how many flipped.
    pub fn visit(&mut self, center: Vec2, radius: f32) -> u32 {
        if !center.is_finite() || self.cells.is_empty() {
            return 0;
        }

        let radius = radius.max(0.0);
        let s = self.cell_size as f32;
        let span = |lo: f32, hi: f32, n: u32| -> (u32, u32) {
            let a = (lo / s).floor().max(0.0) as u32;
            let b = ((hi / s).floor().max(-1.0) + 1.0) as u32;
            (a.min(n), b.min(n))
        };
        let (c0, c1) = span(center.x - radius, center.x + radius, self.cols);
        let (r0, r1) = span(center.y - radius, center.y + radius, self.rows);

        let mut flipped = 0;
        for row in r0..r1 {
            for col in c0..c1 {
                let idx = (row * self.cols + col) as usize;
                if self.cells[idx] != Quadrant::Unvisited {
                    continue;
                }
                if self.cell_rect(col, row).distance_to(center) <= radius {
                    self.cells[idx] = Quadrant::Visited;
                    flipped += 1;
                }
            }
        }

        self.visited += flipped;
        flipped
    }
}

/// Pixel coordinate of sample `k` of `n` inside cell `cell`, clamped to the image.
#[inline]
fn sample_coord(cell: u32, k: u32, n: u32, cell_size: u32, extent: u32) -> u32 {
    let offset = k * cell_size / n;
    (cell * cell_size + offset).min(extent.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_mask_has_one_unvisited_cell_per_column() {
        let mask = RegionMask::from_fn(1000, 25, |_, _| true);
        let grid = QuadrantGrid::from_mask(&mask, 25, 2);
        assert_eq!((grid.cols(), grid.rows()), (40, 1));
        assert_eq!(grid.unvisited_total(), 40);
    }

    #[test]
    fn cells_without_inside_samples_are_outside() {
        let mask = RegionMask::from_fn(50, 50, |x, y| x < 25 && y < 25);
        let grid = QuadrantGrid::from_mask(&mask, 25, 2);
        assert_eq!(grid.cell(0, 0), Quadrant::Unvisited);
        assert_eq!(grid.cell(1, 0), Quadrant::Outside);
        assert_eq!(grid.cell(0, 1), Quadrant::Outside);
        assert_eq!(grid.unvisited_total(), 1);
    }

    #[test]
    fn partial_edge_cells_are_sampled() {
        let mask = RegionMask::from_fn(60, 10, |x, _| x >= 55);
        let grid = QuadrantGrid::from_mask(&mask, 25, 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.cell(2, 0), Quadrant::Unvisited);
    }

    #[test]
    fn visit_flips_only_nearby_cells_once() {
        let mask = RegionMask::from_fn(100, 100, |_, _| true);
        let mut grid = QuadrantGrid::from_mask(&mask, 25, 2);

        assert_eq!(grid.visit(Vec2::new(12.0, 12.0), 0.0), 1);
        assert_eq!(grid.visit(Vec2::new(12.0, 12.0), 0.0), 0);

        // touches the four cells around the shared corner
        assert_eq!(grid.visit(Vec2::new(50.0, 50.0), 1.0), 4);
        assert_eq!(grid.visited_count(), 5);
    }

    #[test]
    fn outside_cells_are_never_visited() {
        let mask = RegionMask::from_fn(50, 25, |x, _| x < 25);
        let mut grid = QuadrantGrid::from_mask(&mask, 25, 2);
        assert_eq!(grid.visit(Vec2::new(37.0, 12.0), 0.0), 0);
        assert_eq!(grid.cell(1, 0), Quadrant::Outside);
    }

    #[test]
    fn brush_off_the_image_is_ignored() {
        let mask = RegionMask::from_fn(50, 50, |_, _| true);
        let mut grid = QuadrantGrid::from_mask(&mask, 25, 2);
        assert_eq!(grid.visit(Vec2::new(-500.0, -500.0), 10.0), 0);
        assert_eq!(grid.visit(Vec2::new(f32::NAN, 0.0), 10.0), 0);
    }
}
