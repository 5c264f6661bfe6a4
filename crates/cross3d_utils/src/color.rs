//! Application-neutral color values.
//!
//! Hosts convert these into whatever their native color representation is, the core never
//! interprets native colors itself.

use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RGB8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RGB8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<RGB8> for RGBA8 {
    #[inline]
    fn from(value: RGB8) -> Self {
        RGBA8 {
            r: value.r,
            g: value.g,
            b: value.b,
            a: 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RGBA8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RGBA8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs the color as `0xAARRGGBB`.
    ///
    /// ```
    /// # use cross3d_utils::color::RGBA8;
    /// assert_eq!(RGBA8::new(0x11, 0x22, 0x33, 0x44).to_argb(), 0x44112233);
    /// ```
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Inverse of [`RGBA8::to_argb`].
    pub const fn from_argb(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }
}

impl Display for RGBA8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn argb_packing() {
        let color = RGBA8::new(200, 10, 99, 255);
        assert_eq!(RGBA8::from_argb(color.to_argb()), color);
        assert_eq!(RGBA8::from(RGB8::new(1, 2, 3)), RGBA8::new(1, 2, 3, 255));
        assert_eq!(color.to_string(), "#c80a63ff");
    }
}
