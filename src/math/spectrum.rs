// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

pub const SPECTRAL_SAMPLES: usize = 4;
pub const WAVELENGTH_MIN: Float = 380.0;
pub const WAVELENGTH_MAX: Float = 780.0;
pub const WAVELENGTH_RANGE: Float = WAVELENGTH_MAX - WAVELENGTH_MIN;

// Peaks of the piecewise-linear RGB basis, in nanometers.
const BLUE_PEAK: Float = 450.0;
const GREEN_PEAK: Float = 550.0;
const RED_PEAK: Float = 650.0;
const BASIS_SPACING: Float = 100.0;

// Integrals of each basis function over [WAVELENGTH_MIN, WAVELENGTH_MAX].
const RED_INTEGRAL: Float = 180.0;
const GREEN_INTEGRAL: Float = 100.0;
const BLUE_INTEGRAL: Float = 120.0;

const UNDEFINED_WAVELENGTH: Float = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_vector(rgb: Vector3f) -> Self {
        Self { rgb }
    }

    pub fn to_vector(&self) -> Vector3f {
        self.rgb
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0)
    }

    pub fn max_component(&self) -> Float {
        self.rgb.x.max(self.rgb.y).max(self.rgb.z)
    }

    pub fn luminance(&self) -> Float {
        0.2126 * self.rgb.x + 0.7152 * self.rgb.y + 0.0722 * self.rgb.z
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.rgb[idx]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = RGBSpectrum;

    fn add(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: RGBSpectrum) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = RGBSpectrum;

    fn sub(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb - rhs.rgb }
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, rhs: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb * rhs }
    }
}

/// Wavelengths carried by one path: a hero wavelength and its rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralQuery {
    hero: Float,
}

impl Default for SpectralQuery {
    fn default() -> Self {
        Self { hero: UNDEFINED_WAVELENGTH }
    }
}

impl SpectralQuery {
    /// Spectral sampler: maps a uniform draw to a hero wavelength.
    pub fn sample(u: Float) -> Self {
        let u = u.max(0.0).min(1.0 - Float::EPSILON);
        Self { hero: WAVELENGTH_MIN + u * WAVELENGTH_RANGE }
    }

    pub fn hero(&self) -> Float {
        self.hero
    }

    pub fn is_defined(&self) -> bool {
        self.hero >= WAVELENGTH_MIN
    }

    pub fn wavelength(&self, index: usize) -> Float {
        let offset = (self.hero - WAVELENGTH_MIN) / WAVELENGTH_RANGE
            + (index as Float) / (SPECTRAL_SAMPLES as Float);
        WAVELENGTH_MIN + (offset - offset.floor()) * WAVELENGTH_RANGE
    }

    pub fn wavelengths(&self) -> [Float; SPECTRAL_SAMPLES] {
        let mut result = [0.0; SPECTRAL_SAMPLES];
        for (i, w) in result.iter_mut().enumerate() {
            *w = self.wavelength(i);
        }
        result
    }

    /// Density of each individual wavelength.
    pub fn pdf(&self) -> Float {
        1.0 / WAVELENGTH_RANGE
    }

    pub fn constant(&self, value: Float) -> SpectralResponse {
        SpectralResponse { query: *self, values: [value; SPECTRAL_SAMPLES] }
    }

    pub fn zero(&self) -> SpectralResponse {
        self.constant(0.0)
    }

    /// Lifts an RGB triple to the sampled wavelengths.
    pub fn from_rgb(&self, rgb: &RGBSpectrum) -> SpectralResponse {
        let mut values = [0.0; SPECTRAL_SAMPLES];
        for (i, v) in values.iter_mut().enumerate() {
            let (r, g, b) = rgb_basis(self.wavelength(i));
            *v = rgb[0] * r + rgb[1] * g + rgb[2] * b;
        }
        SpectralResponse { query: *self, values }
    }
}

fn rgb_basis(lambda: Float) -> (Float, Float, Float) {
    let ramp = |from: Float, to: Float| ((lambda - from) / (to - from)).max(0.0).min(1.0);
    let b = 1.0 - ramp(BLUE_PEAK, GREEN_PEAK);
    let r = ramp(GREEN_PEAK, RED_PEAK);
    let g = if lambda <= GREEN_PEAK {
        ramp(BLUE_PEAK, GREEN_PEAK)
    } else {
        1.0 - ramp(GREEN_PEAK, GREEN_PEAK + BASIS_SPACING)
    };
    (r, g, b)
}

/// Per-wavelength values of a radiometric quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralResponse {
    query: SpectralQuery,
    values: [Float; SPECTRAL_SAMPLES],
}

impl Default for SpectralResponse {
    fn default() -> Self {
        Self { query: SpectralQuery::default(), values: [0.0; SPECTRAL_SAMPLES] }
    }
}

impl SpectralResponse {
    pub fn query(&self) -> SpectralQuery {
        self.query
    }

    pub fn component(&self, index: usize) -> Float {
        self.values[index]
    }

    /// Scalar reduction used for probability bookkeeping.
    pub fn monochromatic(&self) -> Float {
        self.values.iter().sum::<Float>() / (SPECTRAL_SAMPLES as Float)
    }

    pub fn maximum(&self) -> Float {
        self.values.iter().cloned().fold(0.0, Float::max)
    }

    pub fn minimum(&self) -> Float {
        self.values.iter().cloned().fold(Float::MAX, Float::min)
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.values.iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    pub fn exp(&self) -> SpectralResponse {
        self.map(|v| v.exp())
    }

    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> SpectralResponse {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = f(*v);
        }
        SpectralResponse { query: self.query, values }
    }

    /// Unbiased RGB estimate of this spectrum from its sampled wavelengths.
    pub fn to_rgb(&self) -> Vector3f {
        if !self.query.is_defined() {
            return Vector3f::zeros();
        }
        let mut rgb = Vector3f::zeros();
        for i in 0..SPECTRAL_SAMPLES {
            let (r, g, b) = rgb_basis(self.query.wavelength(i));
            let v = self.values[i];
            rgb += Vector3f::new(v * r / RED_INTEGRAL,
                                 v * g / GREEN_INTEGRAL,
                                 v * b / BLUE_INTEGRAL);
        }
        rgb * (WAVELENGTH_RANGE / SPECTRAL_SAMPLES as Float)
    }

    fn zip<F: Fn(Float, Float) -> Float>(&self, rhs: &SpectralResponse, f: F) -> SpectralResponse {
        let query = merge_queries(self.query, rhs.query);
        let mut values = [0.0; SPECTRAL_SAMPLES];
        for (i, v) in values.iter_mut().enumerate() {
            *v = f(self.values[i], rhs.values[i]);
        }
        SpectralResponse { query, values }
    }
}

fn merge_queries(a: SpectralQuery, b: SpectralQuery) -> SpectralQuery {
    if !a.is_defined() {
        return b;
    }
    debug_assert!(!b.is_defined() || a == b,
                  "mixing spectral values of different paths: {} vs {}", a.hero, b.hero);
    a
}

impl ops::Index<usize> for SpectralResponse {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.values[idx]
    }
}

impl ops::Add for SpectralResponse {
    type Output = SpectralResponse;

    fn add(self, rhs: SpectralResponse) -> SpectralResponse {
        self.zip(&rhs, |a, b| a + b)
    }
}

impl ops::AddAssign for SpectralResponse {
    fn add_assign(&mut self, rhs: SpectralResponse) {
        *self = *self + rhs;
    }
}

impl ops::Sub for SpectralResponse {
    type Output = SpectralResponse;

    fn sub(self, rhs: SpectralResponse) -> SpectralResponse {
        self.zip(&rhs, |a, b| a - b)
    }
}

impl ops::Mul for SpectralResponse {
    type Output = SpectralResponse;

    fn mul(self, rhs: SpectralResponse) -> SpectralResponse {
        self.zip(&rhs, |a, b| a * b)
    }
}

impl ops::MulAssign for SpectralResponse {
    fn mul_assign(&mut self, rhs: SpectralResponse) {
        *self = *self * rhs;
    }
}

impl ops::Div for SpectralResponse {
    type Output = SpectralResponse;

    // Components with a zero denominator evaluate to zero.
    fn div(self, rhs: SpectralResponse) -> SpectralResponse {
        self.zip(&rhs, |a, b| if b == 0.0 { 0.0 } else { a / b })
    }
}

impl ops::Mul<Float> for SpectralResponse {
    type Output = SpectralResponse;

    fn mul(self, rhs: Float) -> SpectralResponse {
        self.map(|v| v * rhs)
    }
}

impl ops::MulAssign<Float> for SpectralResponse {
    fn mul_assign(&mut self, rhs: Float) {
        *self = *self * rhs;
    }
}

impl ops::Div<Float> for SpectralResponse {
    type Output = SpectralResponse;

    fn div(self, rhs: Float) -> SpectralResponse {
        self.map(|v| v / rhs)
    }
}

impl ops::Neg for SpectralResponse {
    type Output = SpectralResponse;

    fn neg(self) -> SpectralResponse {
        self.map(|v| -v)
    }
}
