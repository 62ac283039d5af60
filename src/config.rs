//! Compile-time configuration.
//!
//! Everything here is fixed at build time; cargo features pick between the
//! alternatives.

use crate::arithmetic;

/// Grid width in pixels.
#[cfg(not(feature = "pixel-double"))]
pub const WIDTH: i32 = 240;
/// Grid height in pixels.
#[cfg(not(feature = "pixel-double"))]
pub const HEIGHT: i32 = 240;
/// Deepest zoom level.
#[cfg(not(feature = "pixel-double"))]
pub const MAX_ZOOM: i32 = 17;
/// `log2(WIDTH / 2)`: at zoom 0 the grid spans 2 plane units.
#[cfg(not(feature = "pixel-double"))]
pub const PIXEL_SCALE_BITS: i32 = 7;

#[cfg(feature = "pixel-double")]
pub const WIDTH: i32 = 120;
#[cfg(feature = "pixel-double")]
pub const HEIGHT: i32 = 120;
#[cfg(feature = "pixel-double")]
pub const MAX_ZOOM: i32 = 18;
#[cfg(feature = "pixel-double")]
pub const PIXEL_SCALE_BITS: i32 = 6;

/// Frontier queue capacity is `1 << QUEUE_SIZE_BITS`.
pub const QUEUE_SIZE_BITS: u32 = 12;

/// Iteration limit of the escape-time kernel.
pub const MAX_LOOPS: u8 = 128;

/// Whether a small pan scrolls the cached grid instead of redrawing it.
pub const FAST_SCROLL: bool = !cfg!(feature = "full-redraw");

#[cfg(feature = "float")]
pub type DefaultArithmetic = arithmetic::Float;
#[cfg(all(not(feature = "float"), feature = "direct-multiply"))]
pub type DefaultArithmetic = arithmetic::Fixed;
#[cfg(all(not(feature = "float"), not(feature = "direct-multiply")))]
pub type DefaultArithmetic = arithmetic::SplitFixed;

#[cfg(feature = "raster-scan")]
pub type DefaultScan = crate::render::RasterScan;
#[cfg(not(feature = "raster-scan"))]
pub type DefaultScan = crate::render::BorderScan;

const _: () = assert!(WIDTH > 0 && HEIGHT > 0);
const _: () = assert!(1 << (PIXEL_SCALE_BITS + 1) >= WIDTH);
const _: () = assert!(MAX_LOOPS as u16 + 2 <= u8::MAX as u16);
const _: () = assert!(arithmetic::FIXED_POINT_POS - PIXEL_SCALE_BITS - MAX_ZOOM >= 0);
