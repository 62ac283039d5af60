//! The incremental rendering engine.

use std::marker::PhantomData;

use log::{debug, trace};

use crate::{
    arithmetic::Arithmetic,
    config::{DefaultArithmetic, DefaultScan, FAST_SCROLL, HEIGHT, QUEUE_SIZE_BITS, WIDTH},
    geometry::Rect,
    grid::{CountGrid, Grid, UNRENDERED},
    queue::FrontierQueue,
    render::{Pass, Scan, ScanStats},
    viewport::Viewport,
};

/// Escape-time grid for a pannable, zoomable view of the Mandelbrot set.
///
/// The engine remembers which part of the grid is still valid (the *stable
/// rectangle*). Panning by less than a screen scrolls the grid and only
/// invalidates the uncovered strips; zooming invalidates everything.
/// [`render`](Mandelbrot::render) fills in whatever is missing using the
/// scan strategy `S` and number representation `A`.
pub struct Mandelbrot<A: Arithmetic = DefaultArithmetic, S: Scan = DefaultScan> {
    grid: CountGrid,
    queue: FrontierQueue,
    viewport: Viewport<A>,
    stable_rect: Rect,
    phantom_data: PhantomData<S>,
}

impl<A: Arithmetic, S: Scan> Mandelbrot<A, S> {
    /// A `WIDTH × HEIGHT` engine centred on `-0.5 + 0i` at zoom 0.
    pub fn new() -> Self {
        Self::with_size(WIDTH, HEIGHT)
    }

    /// An engine with a grid of a different size. One pixel still spans the
    /// configured fraction of a plane unit, so a smaller grid shows less of the
    /// plane.
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            grid: Grid::new(width, height),
            queue: FrontierQueue::with_capacity_bits(QUEUE_SIZE_BITS),
            viewport: Viewport::new(A::from_f64(-0.5), A::from_f64(0.0), 0),
            stable_rect: Rect::default(),
            phantom_data: PhantomData,
        }
    }

    pub fn grid(&self) -> &CountGrid {
        &self.grid
    }

    pub fn viewport(&self) -> &Viewport<A> {
        &self.viewport
    }

    pub fn a(&self) -> A::Elem {
        self.viewport.a()
    }

    pub fn b(&self) -> A::Elem {
        self.viewport.b()
    }

    pub fn zoom(&self) -> i32 {
        self.viewport.zoom()
    }

    pub fn pixel_size(&self) -> A::Elem {
        self.viewport.pixel_size()
    }

    /// The part of the grid that was already valid before the next
    /// [`render`](Mandelbrot::render).
    pub fn stable_rect(&self) -> Rect {
        self.stable_rect
    }

    /// Whether the whole grid is up to date.
    pub fn no_change(&self) -> bool {
        self.stable_rect == self.grid.bounds()
    }

    /// Marks every pixel for recomputation.
    pub fn invalidate(&mut self) {
        debug!("invalidating the whole grid");
        self.grid.clear();
        self.stable_rect = Rect::default();
    }

    /// Centres the view on `a + bi`, clamped to the plane's range and rounded
    /// down to a whole pixel.
    pub fn set_position(&mut self, a: A::Elem, b: A::Elem) {
        let Some(delta) = self.viewport.set_position(a, b) else {
            return;
        };
        // An empty stable rectangle means nothing in the grid is worth keeping.
        if self.stable_rect.is_empty() {
            return;
        }
        if !FAST_SCROLL {
            self.invalidate();
            return;
        }

        let (dx, dy) = (delta.x, delta.y);
        let (width, height) = (self.grid.width(), self.grid.height());
        if dx.abs() >= width || dy.abs() >= height {
            self.invalidate();
            return;
        }

        trace!("scrolling cached grid by ({}, {})", -dx, -dy);
        self.grid.scroll(-dx, -dy);
        if dx > 0 {
            self.grid.fill(Rect::new(width - dx, 0, dx, height), UNRENDERED);
        } else if dx < 0 {
            self.grid.fill(Rect::new(0, 0, -dx, height), UNRENDERED);
        }
        if dy > 0 {
            self.grid.fill(Rect::new(0, height - dy, width, dy), UNRENDERED);
        } else if dy < 0 {
            self.grid.fill(Rect::new(0, 0, width, -dy), UNRENDERED);
        }
        self.stable_rect = self.stable_rect.intersect(&self.stable_rect.offset(-dx, -dy));
    }

    /// Pans by `(da, db)` pixels at the current zoom.
    pub fn scroll(&mut self, da: i32, db: i32) {
        let step = self.viewport.pixel_size();
        let a = A::add(self.viewport.a(), A::scale(step, da));
        let b = A::add(self.viewport.b(), A::scale(step, db));
        self.set_position(a, b);
    }

    /// Returns whether the zoom level changed; a change invalidates the grid.
    pub fn set_zoom(&mut self, zoom: i32) -> bool {
        if !self.viewport.set_zoom(zoom) {
            return false;
        }
        debug!("zoom level {}", self.viewport.zoom());
        self.invalidate();
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom() + 1)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom() - 1)
    }

    /// Brings the whole grid up to date with the current view.
    pub fn render(&mut self) -> ScanStats {
        let sampler = self.viewport.sampler(self.grid.width(), self.grid.height());
        let stats = S::scan(Pass {
            grid: &mut self.grid,
            queue: &mut self.queue,
            sampler: &sampler,
            stable: self.stable_rect,
            stats: ScanStats::default(),
        });
        self.stable_rect = self.grid.bounds();
        stats
    }
}

impl<A: Arithmetic, S: Scan> Default for Mandelbrot<A, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arithmetic::SplitFixed,
        geometry::Position,
        render::{BorderScan, RasterScan},
    };

    type Engine = Mandelbrot<SplitFixed, BorderScan>;

    #[test]
    fn starts_invalid() {
        let engine = Engine::new();
        assert!(engine.stable_rect().is_empty());
        assert!(!engine.no_change());
        assert_eq!(engine.grid().width(), WIDTH);
        assert_eq!(engine.grid().get(Position::new(0, 0)), Some(UNRENDERED));
        assert_eq!(engine.a(), SplitFixed::from_f64(-0.5));
        assert_eq!(engine.zoom(), 0);
    }

    #[test]
    fn render_marks_everything_stable() {
        let mut engine = Mandelbrot::<SplitFixed, RasterScan>::with_size(32, 24);
        engine.render();
        assert!(engine.no_change());
        assert_eq!(engine.stable_rect(), Rect::new(0, 0, 32, 24));
    }

    #[test]
    #[cfg(not(feature = "full-redraw"))]
    fn small_pan_shrinks_the_stable_rectangle() {
        let mut engine = Engine::with_size(32, 24);
        engine.render();

        engine.scroll(5, -3);
        assert_eq!(engine.stable_rect(), Rect::new(0, 3, 27, 21));
        for y in 0..24 {
            for x in 0..32 {
                let pos = Position::new(x, y);
                let value = engine.grid()[pos];
                assert_eq!(
                    value == UNRENDERED,
                    !engine.stable_rect().contains(pos),
                    "{:?}",
                    pos
                );
            }
        }
    }

    #[test]
    #[cfg(not(feature = "full-redraw"))]
    fn successive_pans_intersect() {
        let mut engine = Engine::with_size(32, 24);
        engine.render();
        engine.scroll(-4, 0);
        engine.scroll(0, 6);
        assert_eq!(engine.stable_rect(), Rect::new(4, 0, 28, 18));
    }

    #[test]
    fn large_pan_invalidates() {
        let mut engine = Engine::with_size(32, 24);
        engine.render();
        engine.scroll(0, 24);
        assert!(engine.stable_rect().is_empty());
        assert!((0..24).all(|y| engine.grid().row(y).iter().all(|&c| c == UNRENDERED)));
    }

    #[test]
    fn sub_pixel_pan_is_a_no_op() {
        let mut engine = Engine::with_size(32, 24);
        engine.render();
        let half = engine.pixel_size() / 2;
        engine.set_position(engine.a() + half, engine.b());
        assert!(engine.no_change());
    }

    #[test]
    fn zoom_changes_invalidate() {
        let mut engine = Engine::with_size(16, 16);
        engine.render();
        assert!(engine.zoom_in());
        assert_eq!(engine.zoom(), 1);
        assert!(engine.stable_rect().is_empty());
        assert!(engine.zoom_out());
        assert!(!engine.zoom_out());
        assert_eq!(engine.zoom(), 0);
    }

    #[test]
    fn position_is_clamped() {
        let mut engine = Engine::with_size(8, 8);
        engine.set_position(SplitFixed::from_f64(9.0), SplitFixed::from_f64(-9.0));
        assert_eq!(engine.a(), SplitFixed::from_f64(2.0));
        assert_eq!(engine.b(), SplitFixed::from_f64(-2.0));
    }
}
