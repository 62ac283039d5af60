//! Number representations for plane coordinates.
//!
//! The renderer is generic over an [`Arithmetic`] policy so that the same
//! viewport and kernel code runs on Q8.24 fixed point (with either multiply
//! routine) or on `f32`. Fixed-point additions and products wrap at 32 bits;
//! the wraparound is part of the rendered output and is kept exact.

use std::fmt::Debug;

/// Fractional bits of the Q8.24 representation.
pub const FIXED_POINT_POS: i32 = 24;

pub trait Arithmetic {
    type Elem: Copy + Debug + Default + PartialEq + PartialOrd;

    /// Position of the binary point; `0` for floating point.
    const FRACTION_BITS: i32;

    fn from_f64(value: f64) -> Self::Elem;
    fn to_f64(value: Self::Elem) -> f64;

    fn add(a: Self::Elem, b: Self::Elem) -> Self::Elem;
    fn sub(a: Self::Elem, b: Self::Elem) -> Self::Elem;
    /// `value × n`.
    fn scale(value: Self::Elem, n: i32) -> Self::Elem;

    /// `(x², y², x·y)` for one kernel iteration.
    fn products(x: Self::Elem, y: Self::Elem) -> (Self::Elem, Self::Elem, Self::Elem);

    /// `1 / 2^bits`.
    fn pixel_size(bits: i32) -> Self::Elem;

    /// Rounds `value` down to a multiple of `2^lsb_pos` units of the
    /// representation (a pixel at the current zoom).
    fn quantize(value: Self::Elem, lsb_pos: i32) -> Self::Elem;

    /// Index of the pixel containing `value`, counted from plane zero.
    fn to_pixel(value: Self::Elem, lsb_pos: i32) -> i32;
}

/// `x · y` through a 64-bit product, truncated back to 32 bits.
pub fn mul_direct(x: i32, y: i32) -> i32 {
    ((x as i64 * y as i64) >> FIXED_POINT_POS) as i32
}

fn halves(value: i32) -> (i32, i32) {
    (value & 0xffff, (value >> 16) & 0xffff)
}

/// `x · y` using only 32-bit multiplies of 16-bit halves.
///
/// Agrees with [`mul_direct`] whenever both operands are non-negative and
/// below 8.0. A negative product truncates toward zero instead of flooring.
pub fn mul_split(x: i32, y: i32) -> i32 {
    let negative = (x < 0) != (y < 0);
    let (xl, xh) = halves(x.wrapping_abs());
    let (yl, yh) = halves(y.wrapping_abs());

    let mut product = xl.wrapping_mul(yl);
    product = (product >> 16) & 0xffff;
    product = product
        .wrapping_add(xl.wrapping_mul(yh))
        .wrapping_add(xh.wrapping_mul(yl));
    product = (product >> 8) & 0xff_ffff;
    product = product.wrapping_add(xh.wrapping_mul(yh) << 8);

    if negative {
        product.wrapping_neg()
    } else {
        product
    }
}

/// `x²` using only 32-bit multiplies of 16-bit halves.
pub fn square_split(x: i32) -> i32 {
    let (low, high) = halves(x.wrapping_abs());

    let mut square = low.wrapping_mul(low);
    square = (square >> 16) & 0xffff;
    square = square.wrapping_add(low.wrapping_mul(high).wrapping_mul(2));
    square = (square >> 8) & 0xff_ffff;
    square.wrapping_add(high.wrapping_mul(high) << 8)
}

macro_rules! fixed_point {
    ($name:ident, $products:expr) => {
        impl Arithmetic for $name {
            type Elem = i32;

            const FRACTION_BITS: i32 = FIXED_POINT_POS;

            fn from_f64(value: f64) -> i32 {
                (value * (1i64 << FIXED_POINT_POS) as f64) as i32
            }

            fn to_f64(value: i32) -> f64 {
                value as f64 / (1i64 << FIXED_POINT_POS) as f64
            }

            fn add(a: i32, b: i32) -> i32 {
                a.wrapping_add(b)
            }

            fn sub(a: i32, b: i32) -> i32 {
                a.wrapping_sub(b)
            }

            fn scale(value: i32, n: i32) -> i32 {
                value.wrapping_mul(n)
            }

            fn products(x: i32, y: i32) -> (i32, i32, i32) {
                $products(x, y)
            }

            fn pixel_size(bits: i32) -> i32 {
                (1 << FIXED_POINT_POS) >> bits
            }

            fn quantize(value: i32, lsb_pos: i32) -> i32 {
                value & !((1 << lsb_pos) - 1)
            }

            fn to_pixel(value: i32, lsb_pos: i32) -> i32 {
                Self::quantize(value, lsb_pos) >> lsb_pos
            }
        }
    };
}

/// Q8.24 fixed point, products through [`mul_direct`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Fixed;

/// Q8.24 fixed point, products through [`mul_split`] and [`square_split`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitFixed;

fixed_point!(Fixed, |x, y| (mul_direct(x, x), mul_direct(y, y), mul_direct(x, y)));
fixed_point!(SplitFixed, |x, y| (square_split(x), square_split(y), mul_split(x, y)));

/// Plain `f32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Float;

impl Arithmetic for Float {
    type Elem = f32;

    const FRACTION_BITS: i32 = 0;

    fn from_f64(value: f64) -> f32 {
        value as f32
    }

    fn to_f64(value: f32) -> f64 {
        value as f64
    }

    fn add(a: f32, b: f32) -> f32 {
        a + b
    }

    fn sub(a: f32, b: f32) -> f32 {
        a - b
    }

    fn scale(value: f32, n: i32) -> f32 {
        value * n as f32
    }

    fn products(x: f32, y: f32) -> (f32, f32, f32) {
        (x * x, y * y, x * y)
    }

    fn pixel_size(bits: i32) -> f32 {
        2f32.powi(-bits)
    }

    fn quantize(value: f32, lsb_pos: i32) -> f32 {
        let scale = 2f32.powi(-lsb_pos);
        (value * scale).floor() / scale
    }

    fn to_pixel(value: f32, lsb_pos: i32) -> i32 {
        (value * 2f32.powi(-lsb_pos)).floor() as i32
    }
}
