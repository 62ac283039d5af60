//! Interactive exploration on top of [`Mandelbrot`].
//!
//! The explorer turns button input into pans and zoom steps, keeps a frame
//! buffer coloured in step with the escape-time grid, and animates each zoom
//! step by scaling a snapshot of the previous frame.

use log::{debug, trace};

use crate::{
    arithmetic::Arithmetic,
    colour::{HistogramColouring, Palette},
    config::{DefaultArithmetic, DefaultScan, HEIGHT, WIDTH},
    geometry::{Position, Rect},
    grid::{Grid, GridError},
    mandelbrot::Mandelbrot,
    pixel::Rgba,
    render::Scan,
};

/// Duration of the zoom animation.
pub const ZOOM_TIME_MS: u64 = 100;

/// A deep view that is slow to render, used to compare builds.
pub const BENCHMARK_A: f64 = -0.15422654151916504;
pub const BENCHMARK_B: f64 = -1.0307170152664185;
pub const BENCHMARK_ZOOM: i32 = 18;

/// Buttons sampled since the previous update.
///
/// Directions are level-triggered (held); the rest are edge-triggered and
/// should be set for one update per press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub benchmark: bool,
    pub toggle_colouring: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colouring {
    /// Fixed cyclic palette indexed by escape count. Only invalidated pixels
    /// are recoloured.
    Palette,
    /// Palette spread over the counts currently on screen. Every pixel is
    /// recoloured each frame.
    Histogram,
}

/// Pan accumulated since the last draw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    pub dx: i32,
    pub dy: i32,
    step_accum: f32,
}

impl ScrollState {
    /// Pans at 4 pixels per 25 ms while a direction is held.
    fn pan(&mut self, elapsed_ms: u64, max_step: i32, input: &Input) {
        self.step_accum += elapsed_ms as f32 * 4.0 / 25.0;
        let step = self.step_accum as i32;
        self.step_accum -= step as f32;
        let step = step.min(max_step);

        if input.left {
            self.dx -= step;
        }
        if input.right {
            self.dx += step;
        }
        if input.up {
            self.dy -= step;
        }
        if input.down {
            self.dy += step;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomState {
    pub end_ms: u64,
    pub zoom_in: bool,
    /// Whether the snapshot has been taken from the frame yet.
    captured: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State {
    Scroll(ScrollState),
    Zoom(ZoomState),
}

pub struct Explorer<A: Arithmetic = DefaultArithmetic, S: Scan = DefaultScan> {
    mandelbrot: Mandelbrot<A, S>,
    palette: Palette,
    histogram: HistogramColouring,
    colouring: Colouring,
    recolour: bool,
    state: State,
    snapshot: Grid<'static, Rgba>,
    last_ms: u64,
}

impl<A: Arithmetic, S: Scan> Explorer<A, S> {
    pub fn new() -> Self {
        Self::with_size(WIDTH, HEIGHT)
    }

    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            mandelbrot: Mandelbrot::with_size(width, height),
            palette: Palette::new(),
            histogram: HistogramColouring::new(),
            colouring: Colouring::Palette,
            recolour: false,
            state: State::Scroll(ScrollState::default()),
            snapshot: Grid::new(width / 2, height / 2),
            last_ms: 0,
        }
    }

    pub fn mandelbrot(&self) -> &Mandelbrot<A, S> {
        &self.mandelbrot
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn colouring(&self) -> Colouring {
        self.colouring
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn width(&self) -> i32 {
        self.mandelbrot.grid().width()
    }

    pub fn height(&self) -> i32 {
        self.mandelbrot.grid().height()
    }

    /// Switches between palette and histogram colouring. The next draw
    /// recolours the whole frame.
    pub fn toggle_colouring(&mut self) {
        self.colouring = match self.colouring {
            Colouring::Palette => Colouring::Histogram,
            Colouring::Histogram => Colouring::Palette,
        };
        debug!("colouring: {:?}", self.colouring);
        self.recolour = true;
    }

    /// Applies the input gathered since the previous update.
    pub fn update(&mut self, now_ms: u64, input: &Input) {
        let elapsed_ms = now_ms.saturating_sub(self.last_ms);
        self.last_ms = now_ms;

        if input.toggle_colouring {
            self.toggle_colouring();
        }

        match self.state {
            State::Scroll(_) => self.scroll_update(now_ms, elapsed_ms, input),
            State::Zoom(zoom) => {
                if now_ms > zoom.end_ms + elapsed_ms {
                    self.scroll_start();
                }
            }
        }
    }

    /// Brings `frame`, a `width × height` image, up to date.
    ///
    /// `frame` must hold whatever the previous call left in it; only the
    /// parts that changed are redrawn.
    pub fn draw(&mut self, now_ms: u64, frame: &mut [Rgba]) -> Result<(), GridError> {
        let (width, height) = (self.width(), self.height());
        let mut frame = Grid::view(width, height, width, frame)?;
        match self.state {
            State::Scroll(scroll) => self.scroll_draw(scroll, &mut frame),
            State::Zoom(zoom) => self.zoom_draw(now_ms, zoom, &mut frame),
        }
        Ok(())
    }

    fn scroll_start(&mut self) {
        debug!("scroll");
        self.state = State::Scroll(ScrollState::default());
    }

    fn scroll_update(&mut self, now_ms: u64, elapsed_ms: u64, input: &Input) {
        let max_step = self.width() / 10;
        if let State::Scroll(scroll) = &mut self.state {
            scroll.pan(elapsed_ms, max_step, input);
        }

        if input.zoom_in {
            self.zoom_start(now_ms, true);
        }
        if input.zoom_out {
            self.zoom_start(now_ms, false);
        }

        if input.benchmark {
            debug!("jumping to the benchmark view");
            self.mandelbrot.set_zoom(BENCHMARK_ZOOM);
            self.mandelbrot
                .set_position(A::from_f64(BENCHMARK_A), A::from_f64(BENCHMARK_B));
            self.mandelbrot.invalidate();
        }
    }

    fn scroll_draw(&mut self, scroll: ScrollState, frame: &mut Grid<Rgba>) {
        if scroll.dx == 0 && scroll.dy == 0 && self.mandelbrot.no_change() && !self.recolour {
            return;
        }
        trace!("scroll draw ({}, {})", scroll.dx, scroll.dy);

        // The view may move less than asked for at the edge of the plane.
        let before = self.mandelbrot.viewport().center_pixel();
        self.mandelbrot.scroll(scroll.dx, scroll.dy);
        let moved = self.mandelbrot.viewport().center_pixel() - before;

        let stable = self.mandelbrot.stable_rect();
        self.mandelbrot.render();
        frame.scroll(-moved.x, -moved.y);

        let counts = self.mandelbrot.grid();
        match self.colouring {
            Colouring::Palette => {
                // Border tracing may rewrite the outline of the stable rectangle.
                let keep = if self.recolour { Rect::default() } else { stable.inset(1) };
                self.palette.update_colours(counts, frame, keep);
            }
            Colouring::Histogram => self.histogram.update_colours(counts, &self.palette, frame),
        }

        self.recolour = false;
        self.state = State::Scroll(ScrollState {
            dx: 0,
            dy: 0,
            ..scroll
        });
    }

    fn zoom_start(&mut self, now_ms: u64, zoom_in: bool) {
        let changed = if zoom_in {
            self.mandelbrot.zoom_in()
        } else {
            self.mandelbrot.zoom_out()
        };
        if changed {
            debug!("zoom {} to level {}", if zoom_in { "in" } else { "out" }, self.mandelbrot.zoom());
            self.state = State::Zoom(ZoomState {
                end_ms: now_ms + ZOOM_TIME_MS,
                zoom_in,
                captured: false,
            });
        }
    }

    /// Copies the part of `frame` that the new view will cover: the centre
    /// quarter when zooming in, every other pixel when zooming out.
    fn capture(&mut self, zoom_in: bool, frame: &Grid<Rgba>) {
        let (width, height) = (self.snapshot.width(), self.snapshot.height());
        for y in 0..height {
            for x in 0..width {
                let source = if zoom_in {
                    Position::new(x + frame.width() / 4, y + frame.height() / 4)
                } else {
                    Position::new(x * 2, y * 2)
                };
                self.snapshot[Position::new(x, y)] = frame[source];
            }
        }
    }

    fn zoom_draw(&mut self, now_ms: u64, mut zoom: ZoomState, frame: &mut Grid<Rgba>) {
        if !zoom.captured {
            self.capture(zoom.zoom_in, frame);
            zoom.captured = true;
            self.state = State::Zoom(zoom);
        }

        let time = ZOOM_TIME_MS as i64;
        let mut p = (zoom.end_ms as i64 - now_ms as i64).clamp(0, time);
        if zoom.zoom_in {
            p = time - p;
        }

        let (width, height) = (frame.width(), frame.height());
        let dw = width / 2 + ((width / 2) as i64 * p / time) as i32;
        let dh = height / 2 + ((height / 2) as i64 * p / time) as i32;
        let target = Rect::new((width - dw) / 2, (height - dh) / 2, dw, dh);
        blit(&self.snapshot, frame, target);
    }
}

impl<A: Arithmetic, S: Scan> Default for Explorer<A, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scales all of `source` into `target` with nearest-neighbour sampling.
fn blit(source: &Grid<Rgba>, destination: &mut Grid<Rgba>, target: Rect) {
    if target.is_empty() || source.bounds().is_empty() {
        return;
    }
    for y in 0..target.height {
        let sy = y * source.height() / target.height;
        let row = destination.row_mut(target.y + y);
        for x in 0..target.width {
            let sx = x * source.width() / target.width;
            row[(target.x + x) as usize] = source[Position::new(sx, sy)];
        }
    }
}
