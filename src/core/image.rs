// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector4f};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions(u8);

impl ImageOptions {
    pub const NONE: Self = Self(0);
    pub const HAS_ALPHA_CHANNEL: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ImageOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Linear RGBA texture with repeat wrapping and bilinear filtering.
#[derive(Debug, Clone)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Vector4f>,
    options: ImageOptions,
}

impl Image {
    /// Pixels are row-major, top row first. Returns `None` when sizes disagree.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<Vector4f>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return None;
        }
        let options = if pixels.iter().any(|p| p.w < 1.0) {
            ImageOptions::HAS_ALPHA_CHANNEL
        } else {
            ImageOptions::NONE
        };
        Some(Self { width, height, pixels, options })
    }

    pub fn constant(value: Vector4f) -> Self {
        let options = if value.w < 1.0 { ImageOptions::HAS_ALPHA_CHANNEL } else { ImageOptions::NONE };
        Self { width: 1, height: 1, pixels: vec![value], options }
    }

    pub fn options(&self) -> ImageOptions {
        self.options
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn texel(&self, x: isize, y: isize) -> Vector4f {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.pixels[x + y * self.width]
    }

    pub fn evaluate(&self, uv: &Vector2f) -> Vector4f {
        // v = 0 is the bottom row of the image.
        let fx = uv.x * self.width as Float - 0.5;
        let fy = (1.0 - uv.y) * self.height as Float - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let dx = fx - x0;
        let dy = fy - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let top = self.texel(x0, y0) * (1.0 - dx) + self.texel(x0 + 1, y0) * dx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - dx) + self.texel(x0 + 1, y0 + 1) * dx;
        top * (1.0 - dy) + bottom * dy
    }
}
