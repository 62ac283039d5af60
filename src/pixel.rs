use bytemuck::{Pod, Zeroable};

/// One frame-buffer pixel, laid out for an `Rgba8Unorm` texture.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Rgba::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Widens 4-bit channels to 8 bits.
    pub const fn from_rgb4(r: u8, g: u8, b: u8) -> Self {
        Self::new(r * 0x11, g * 0x11, b * 0x11)
    }
}
