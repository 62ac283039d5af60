//! Mapping between the complex plane and the pixel grid.

use std::marker::PhantomData;

use crate::{
    arithmetic::Arithmetic,
    config::{MAX_ZOOM, PIXEL_SCALE_BITS},
    geometry::Position,
};

/// Centre of the view and zoom level.
///
/// At zoom `z` one pixel spans `1 / 2^(PIXEL_SCALE_BITS + z)` plane units.
/// The centre is quantized to a whole pixel when it is set, and again whenever
/// it is read for rendering, so panning moves the view by an exact number of
/// pixels.
pub struct Viewport<A: Arithmetic> {
    a: A::Elem,
    b: A::Elem,
    zoom: i32,
    phantom_data: PhantomData<A>,
}

impl<A: Arithmetic> Viewport<A> {
    /// Half the extent of the plane the centre may move in.
    pub const RANGE: f64 = 2.0;

    pub fn new(a: A::Elem, b: A::Elem, zoom: i32) -> Self {
        let zoom = zoom.clamp(0, MAX_ZOOM);
        let mut viewport = Self {
            a: A::Elem::default(),
            b: A::Elem::default(),
            zoom,
            phantom_data: PhantomData,
        };
        viewport.a = viewport.clamp_quantize(a);
        viewport.b = viewport.clamp_quantize(b);
        viewport
    }

    pub fn a(&self) -> A::Elem {
        self.a
    }

    pub fn b(&self) -> A::Elem {
        self.b
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Bit position of one pixel within the representation.
    pub fn pixel_lsb_pos(&self) -> i32 {
        A::FRACTION_BITS - PIXEL_SCALE_BITS - self.zoom
    }

    pub fn pixel_size(&self) -> A::Elem {
        A::pixel_size(PIXEL_SCALE_BITS + self.zoom)
    }

    /// Drops the part of `value` finer than one pixel.
    pub fn quantize(&self, value: A::Elem) -> A::Elem {
        A::quantize(value, self.pixel_lsb_pos())
    }

    fn clamp_quantize(&self, value: A::Elem) -> A::Elem {
        let range = A::from_f64(Self::RANGE);
        let low = A::sub(A::Elem::default(), range);
        let value = if value < low {
            low
        } else if value > range {
            range
        } else {
            value
        };
        self.quantize(value)
    }

    /// Pixel coordinates of the centre, counted from plane zero.
    pub fn center_pixel(&self) -> Position {
        let lsb_pos = self.pixel_lsb_pos();
        Position::new(A::to_pixel(self.a, lsb_pos), A::to_pixel(self.b, lsb_pos))
    }

    /// The centre rounded down to the current pixel size.
    pub fn quantized_center(&self) -> (A::Elem, A::Elem) {
        (self.quantize(self.a), self.quantize(self.b))
    }

    /// Moves the centre, returning how many pixels it moved by, or `None` if
    /// the quantized position did not change.
    pub fn set_position(&mut self, a: A::Elem, b: A::Elem) -> Option<Position> {
        let a = self.clamp_quantize(a);
        let b = self.clamp_quantize(b);
        if a == self.a && b == self.b {
            return None;
        }

        let before = self.center_pixel();
        self.a = a;
        self.b = b;
        Some(self.center_pixel() - before)
    }

    /// Returns whether the zoom level changed.
    ///
    /// The stored centre keeps its finer bits when zooming out, so zooming
    /// back in returns to the same spot.
    pub fn set_zoom(&mut self, zoom: i32) -> bool {
        let zoom = zoom.clamp(0, MAX_ZOOM);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Samples the plane for a `width × height` grid centred on the view.
    pub fn sampler(&self, width: i32, height: i32) -> Sampler<A> {
        let step = self.pixel_size();
        let (a, b) = self.quantized_center();
        Sampler {
            a_origin: A::sub(a, A::scale(step, width / 2)),
            b_origin: A::sub(b, A::scale(step, height / 2)),
            step,
        }
    }
}

/// Plane coordinates of grid pixels for one render pass.
///
/// Coordinates are `origin + step × index` rather than a running sum, so a
/// pixel always gets the same inputs no matter which order it is visited in.
pub struct Sampler<A: Arithmetic> {
    a_origin: A::Elem,
    b_origin: A::Elem,
    step: A::Elem,
}

impl<A: Arithmetic> Sampler<A> {
    pub fn plane(&self, pos: Position) -> (A::Elem, A::Elem) {
        (
            A::add(self.a_origin, A::scale(self.step, pos.x)),
            A::add(self.b_origin, A::scale(self.step, pos.y)),
        )
    }
}
