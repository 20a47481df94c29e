// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f, Vector4f};

/// Progressive per-pixel accumulator.
#[derive(Debug, Clone)]
pub struct Film {
    width: usize,
    height: usize,
    sum: Vec<Vector3f>,
    count: Vec<u32>,
}

impl Film {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sum: vec![Vector3f::zeros(); width * height],
            count: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.sum.len()
    }

    /// Adds one sample. Each backend commits a pixel's samples in iteration
    /// order, so progressive passes stay identical across backends.
    pub fn commit(&mut self, pixel_index: usize, rgb: &Vector3f) {
        match self.sum.get_mut(pixel_index) {
            Some(pixel) => {
                *pixel += rgb;
                self.count[pixel_index] += 1;
            }
            None => log::warn!("Dropping samples for invalid pixel {}", pixel_index),
        }
    }

    /// Running average in xyz and the number of committed samples in w.
    pub fn pixel(&self, pixel_index: usize) -> Vector4f {
        let n = self.count[pixel_index];
        let avg = if n > 0 { self.sum[pixel_index] / n as Float } else { Vector3f::zeros() };
        Vector4f::new(avg.x, avg.y, avg.z, n as Float)
    }

    pub fn min_sample_count(&self) -> u32 {
        self.count.iter().cloned().min().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.sum.iter_mut().for_each(|v| *v = Vector3f::zeros());
        self.count.iter_mut().for_each(|c| *c = 0);
    }

    pub fn resolve(&self) -> Bitmap {
        let mut bitmap = Bitmap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.pixel(x + self.width * y);
                bitmap[(x, y)] = Vector3f::new(p.x, p.y, p.z);
            }
        }
        bitmap
    }
}
