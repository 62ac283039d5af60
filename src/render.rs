//! Strategies for bringing the escape-time grid up to date.
//!
//! Both strategies leave every cell inside the stable rectangle alone (apart
//! from re-evaluating its outline during border tracing) and fill everything
//! else. They differ in how much of "everything else" actually runs the
//! kernel.

use log::trace;

use crate::{
    arithmetic::Arithmetic,
    geometry::{Position, Rect},
    grid::{Cell, CountGrid, PENDING, UNRENDERED},
    kernel::escape_time,
    queue::FrontierQueue,
    viewport::Sampler,
};

/// Work done by one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Pixels the kernel ran for.
    pub evaluated: usize,
    /// Frontier pushes that found the queue full.
    pub dropped: usize,
}

/// Everything a strategy needs for one pass.
pub struct Pass<'a, A: Arithmetic> {
    pub grid: &'a mut CountGrid,
    pub queue: &'a mut FrontierQueue,
    pub sampler: &'a Sampler<A>,
    /// Cells already consistent with the view.
    pub stable: Rect,
    pub stats: ScanStats,
}

impl<'a, A: Arithmetic> Pass<'a, A> {
    /// Runs the kernel for `pos` and returns the packed cell value.
    fn evaluate(&mut self, pos: Position) -> u8 {
        self.stats.evaluated += 1;
        let (a, b) = self.sampler.plane(pos);
        Cell::Computed(escape_time::<A>(a, b)).raw()
    }

    /// Queues `pos` unless it is off the grid or (without `force`) already
    /// queued or computed. The cell is only marked pending once it is really
    /// in the queue.
    fn push(&mut self, pos: Position, force: bool) {
        match self.grid.get(pos) {
            None => return,
            Some(value) if value != UNRENDERED && !force => return,
            Some(_) => {}
        }
        if self.queue.push(pos) {
            self.grid[pos] = PENDING;
        } else {
            self.stats.dropped += 1;
        }
    }

    /// If the neighbour of `p` in direction `(dx, dy)` is computed and
    /// differs from `p`, queues the cells on either side of the pair.
    ///
    /// ```text
    ///   horizontal pair       vertical pair
    ///   +---+---+             +---+---+---+
    ///   | n | n |             | n | P | n |
    ///   +---+---+             +---+---+---+
    ///   | P | Q |             | n | Q | n |
    ///   +---+---+             +---+---+---+
    ///   | n | n |
    ///   +---+---+
    /// ```
    fn trace_edge(&mut self, p: Position, value_p: u8, dx: i32, dy: i32) {
        let q = p.offset(dx, dy);
        let Some(value_q) = self.grid.get(q) else {
            return;
        };
        if !Cell::is_computed(value_q) || value_q == value_p {
            return;
        }

        let (sx, sy) = if dx != 0 { (0, 1) } else { (1, 0) };
        self.push(p.offset(-sx, -sy), false);
        self.push(q.offset(-sx, -sy), false);
        self.push(p.offset(sx, sy), false);
        self.push(q.offset(sx, sy), false);
    }
}

/// A way of reconciling the grid with the current view.
pub trait Scan {
    fn scan<A: Arithmetic>(pass: Pass<'_, A>) -> ScanStats;
}

/// Evaluates every pixel outside the stable rectangle.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterScan;

impl Scan for RasterScan {
    fn scan<A: Arithmetic>(mut pass: Pass<'_, A>) -> ScanStats {
        trace!("begin raster scan");

        let stable = pass.stable;
        let bounds = pass.grid.bounds();
        for y in bounds.y..bounds.bottom() {
            for x in bounds.x..bounds.right() {
                let pos = Position::new(x, y);
                if !stable.contains(pos) {
                    let value = pass.evaluate(pos);
                    pass.grid[pos] = value;
                }
            }
        }

        trace!("end raster scan: {:?}", pass.stats);
        pass.stats
    }
}

/// Evaluates pixels along the borders between regions of equal escape time,
/// then fills region interiors from their left edge.
///
/// The interior fill assumes every region is contiguous along each row. That
/// is not true of every view: a cell whose row has no computed cell to its
/// left inherits the last value of the previous row.
#[derive(Clone, Copy, Debug, Default)]
pub struct BorderScan;

const NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Scan for BorderScan {
    fn scan<A: Arithmetic>(mut pass: Pass<'_, A>) -> ScanStats {
        trace!("begin border scan");

        pass.queue.clear();
        let bounds = pass.grid.bounds();
        for pos in bounds.perimeter() {
            pass.push(pos, false);
        }
        // Reopen the edge of the cached region so that contours running into
        // it are picked up again.
        let stable = pass.stable;
        for pos in stable.perimeter() {
            pass.push(pos, true);
        }

        while let Some(pos) = pass.queue.pop() {
            let mut value = pass.grid[pos];
            if !Cell::is_computed(value) {
                value = pass.evaluate(pos);
                pass.grid[pos] = value;
            }
            for (dx, dy) in NEIGHBOURS {
                pass.trace_edge(pos, value, dx, dy);
            }
        }

        fill_interiors(pass.grid);

        trace!("end border scan: {:?}", pass.stats);
        pass.stats
    }
}

/// Gives every unrendered cell the value of the last rendered cell before it
/// in raster order.
fn fill_interiors(grid: &mut CountGrid) {
    let mut last = UNRENDERED;
    for y in 0..grid.height() {
        for cell in grid.row_mut(y) {
            if *cell == UNRENDERED {
                *cell = last;
            } else {
                last = *cell;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arithmetic::SplitFixed,
        grid::Grid,
        queue::ArrayQueue,
        viewport::Viewport,
    };

    fn run<S: Scan>(grid: &mut CountGrid, queue: &mut FrontierQueue, stable: Rect) -> ScanStats {
        let viewport = Viewport::<SplitFixed>::new(SplitFixed::from_f64(-0.5), 0, 0);
        let sampler = viewport.sampler(grid.width(), grid.height());
        S::scan(Pass {
            grid,
            queue,
            sampler: &sampler,
            stable,
            stats: ScanStats::default(),
        })
    }

    #[test]
    fn raster_scan_skips_the_stable_rectangle() {
        let mut grid = Grid::new(16, 12);
        let mut queue = ArrayQueue::with_capacity_bits(4);
        let stable = Rect::new(4, 3, 5, 6);
        grid.fill(stable, 77);

        let stats = run::<RasterScan>(&mut grid, &mut queue, stable);

        assert_eq!(stats.evaluated, (16 * 12 - 5 * 6) as usize);
        for y in 0..12 {
            for x in 0..16 {
                let value = grid[Position::new(x, y)];
                if stable.contains(Position::new(x, y)) {
                    assert_eq!(value, 77);
                } else {
                    assert!(Cell::is_computed(value));
                }
            }
        }
    }

    #[test]
    fn border_scan_uniform_region_only_touches_the_border() {
        // Every pixel of this view escapes on the second iteration, so no
        // contour is found and only the perimeter runs the kernel.
        let mut grid = Grid::new(16, 12);
        let mut queue = ArrayQueue::with_capacity_bits(8);
        let corner = SplitFixed::from_f64(1.75);
        let viewport = Viewport::<SplitFixed>::new(corner, corner, 17);
        let sampler = viewport.sampler(16, 12);
        let stats = BorderScan::scan(Pass {
            grid: &mut grid,
            queue: &mut queue,
            sampler: &sampler,
            stable: Rect::default(),
            stats: ScanStats::default(),
        });

        assert_eq!(stats.evaluated, (2 * 16 + 2 * 12 - 4) as usize);
        let first = grid[Position::new(0, 0)];
        assert!(Cell::is_computed(first));
        for y in 0..12 {
            assert!(grid.row(y).iter().all(|&cell| cell == first));
        }
    }

    #[test]
    fn border_scan_leaves_no_sentinels() {
        let mut grid = Grid::new(48, 40);
        let mut queue = ArrayQueue::with_capacity_bits(10);
        let stats = run::<BorderScan>(&mut grid, &mut queue, Rect::default());

        assert_eq!(stats.dropped, 0);
        assert!(stats.evaluated < 48 * 40);
        for y in 0..40 {
            assert!(grid.row(y).iter().all(|&cell| Cell::is_computed(cell)));
        }
    }

    #[test]
    fn border_scan_survives_a_tiny_queue() {
        let mut grid = Grid::new(48, 40);
        let mut queue = ArrayQueue::with_capacity_bits(2);
        let stats = run::<BorderScan>(&mut grid, &mut queue, Rect::default());

        assert!(stats.dropped > 0);
        for y in 0..40 {
            assert!(grid.row(y).iter().all(|&cell| cell != PENDING));
        }
    }

    #[test]
    fn border_scan_reevaluates_the_stable_outline() {
        let mut grid = Grid::new(20, 20);
        let mut queue = ArrayQueue::with_capacity_bits(10);
        run::<RasterScan>(&mut grid, &mut queue, Rect::default());
        let reference: Vec<Vec<u8>> = (0..20).map(|y| grid.row(y).to_vec()).collect();

        // Pretend the left half is cached and the right half needs work.
        grid.fill(Rect::new(10, 0, 10, 20), UNRENDERED);
        let stable = Rect::new(0, 0, 10, 20);
        let stats = run::<BorderScan>(&mut grid, &mut queue, stable);

        assert!(stats.evaluated >= stable.perimeter().count());
        for y in 0..20 {
            assert_eq!(&grid.row(y)[..10], &reference[y as usize][..10]);
        }
    }

    #[test]
    fn interior_fill_carries_values_across_rows() {
        // Characterises the row-contiguity approximation: a row that starts
        // with unrendered cells takes the previous row's last value.
        let mut grid = Grid::<u8>::new(4, 3);
        grid[Position::new(0, 0)] = 5;
        grid[Position::new(2, 0)] = 9;
        grid[Position::new(3, 1)] = 6;
        fill_interiors(&mut grid);

        assert_eq!(grid.row(0), &[5, 5, 9, 9]);
        assert_eq!(grid.row(1), &[9, 9, 9, 6]);
        assert_eq!(grid.row(2), &[6, 6, 6, 6]);
    }

    #[test]
    fn interior_fill_leaves_leading_cells_unrendered_without_a_seed() {
        let mut grid = Grid::<u8>::new(3, 2);
        grid[Position::new(1, 1)] = 4;
        fill_interiors(&mut grid);
        assert_eq!(grid.row(0), &[UNRENDERED; 3]);
        assert_eq!(grid.row(1), &[UNRENDERED, 4, 4]);
    }
}
