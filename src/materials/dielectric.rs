// Copyright @yucwang 2026

use crate::core::bsdf::{ is_delta_roughness, BSDFData, BSDFEval, BSDFProperties, BSDFSample, BSDF };
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::materials::microfacet::{ clamp_alpha, fresnel_dielectric, ggx_d, ggx_g1, reflect, refract, sample_ggx_vndf, vndf_pdf };
use crate::math::constants::{ Float, Vector2f, EPSILON };
use crate::math::frame::Frame;
use crate::math::spectrum::{ RGBSpectrum, SpectralQuery, SpectralResponse };
use crate::validate;

/// Smooth or rough interface between two indices of refraction, optionally
/// bounding an interior medium.
pub struct DielectricBSDF {
    roughness: Vector2f,
    int_ior: Float,
    ext_ior: Float,
    specular_reflectance: RGBSpectrum,
    specular_transmittance: RGBSpectrum,
    int_medium: Option<usize>,
    ext_medium: Option<usize>,
}

struct Side {
    frame: Frame,
    eta_i: Float,
    eta_t: Float,
    medium_t: Option<usize>,
}

impl DielectricBSDF {
    pub fn new(roughness: Vector2f, int_ior: Float, ext_ior: Float) -> Self {
        Self {
            roughness,
            int_ior,
            ext_ior,
            specular_reflectance: RGBSpectrum::splat(1.0),
            specular_transmittance: RGBSpectrum::splat(1.0),
            int_medium: None,
            ext_medium: None,
        }
    }

    pub fn with_tint(mut self, reflectance: RGBSpectrum, transmittance: RGBSpectrum) -> Self {
        self.specular_reflectance = reflectance;
        self.specular_transmittance = transmittance;
        self
    }

    pub fn with_media(mut self, int_medium: Option<usize>, ext_medium: Option<usize>) -> Self {
        self.int_medium = int_medium;
        self.ext_medium = ext_medium;
        self
    }

    pub fn media(&self) -> [Option<usize>; 2] {
        [self.int_medium, self.ext_medium]
    }

    fn side(&self, data: &BSDFData) -> Option<Side> {
        let frame = data.check_side()?;
        let entering = data.intersection.sh_normal.dot(&data.w_i) < 0.0;
        Some(if entering {
            Side { frame, eta_i: self.ext_ior, eta_t: self.int_ior, medium_t: self.int_medium }
        } else {
            Side { frame, eta_i: self.int_ior, eta_t: self.ext_ior, medium_t: self.ext_medium }
        })
    }

    // Radiance is compressed by (eta_i / eta_t)^2 when carried from the camera.
    fn transmission_scale(side: &Side) -> Float {
        let r = side.eta_i / side.eta_t;
        r * r
    }

    fn sample_delta(&self, data: &BSDFData, smp: &mut dyn Sampler) -> BSDFSample {
        let spect = &data.spectrum_sample;
        let side = match self.side(data) {
            Some(side) => side,
            None => return BSDFSample::invalid(spect),
        };

        let n = side.frame.nrm();
        let wi = -data.w_i;
        let f = fresnel_dielectric(wi.dot(&n), side.eta_i, side.eta_t);

        if smp.next() <= f {
            return BSDFSample {
                w_o: reflect(&wi, &n).normalize(),
                weight: spect.from_rgb(&self.specular_reflectance),
                pdf: f,
                eta: 1.0,
                medium_index: data.medium_index,
                properties: BSDFProperties::DELTA_REFLECTION,
            };
        }

        let w_o = match refract(&wi, &n, side.eta_i / side.eta_t) {
            Some(w_o) => w_o.normalize(),
            None => return BSDFSample::invalid(spect),
        };
        let weight = spect.from_rgb(&self.specular_transmittance) * Self::transmission_scale(&side);
        validate!(weight);
        BSDFSample {
            w_o,
            weight,
            pdf: 1.0 - f,
            eta: side.eta_t / side.eta_i,
            medium_index: side.medium_t,
            properties: BSDFProperties::DELTA_TRANSMISSION | BSDFProperties::MEDIUM_CHANGED,
        }
    }

    fn evaluate_rough(&self, data: &BSDFData, side: &Side) -> BSDFEval {
        let spect = &data.spectrum_sample;
        let wi = side.frame.to_local(&-data.w_i);
        let wo = side.frame.to_local(&data.w_o);
        let cos_i = wi.z;
        let cos_o = wo.z;
        if cos_i <= EPSILON || cos_o.abs() <= EPSILON {
            return BSDFEval::zero(spect);
        }
        let alpha = &clamp_alpha(&self.roughness);

        if cos_o > 0.0 {
            let m = (wi + wo).normalize();
            let cos_i_m = wi.dot(&m);
            let cos_o_m = wo.dot(&m);
            if m.z <= 0.0 || cos_i_m <= 0.0 || cos_o_m <= EPSILON {
                return BSDFEval::zero(spect);
            }

            let d = ggx_d(&m, alpha);
            let g = ggx_g1(&wi, &m, alpha) * ggx_g1(&wo, &m, alpha);
            let f = fresnel_dielectric(cos_i_m, side.eta_i, side.eta_t);
            let func = spect.from_rgb(&self.specular_reflectance) * (f * d * g / (4.0 * cos_i * cos_o));
            let pdf = f * vndf_pdf(&wi, &m, d, alpha) / (4.0 * cos_o_m);
            return Self::finish(func, cos_o, pdf, spect);
        }

        let eta = side.eta_t / side.eta_i;
        let mut m = wi + wo * eta;
        if m.norm_squared() <= 0.0 {
            return BSDFEval::zero(spect);
        }
        m = m.normalize();
        if m.z <= 0.0 {
            m = -m;
        }

        let cos_i_m = wi.dot(&m);
        let cos_o_m = wo.dot(&m);
        if cos_i_m <= 0.0 || cos_o_m >= 0.0 {
            return BSDFEval::zero(spect);
        }

        let denom = cos_i_m + eta * cos_o_m;
        if denom.abs() <= 1e-6 {
            return BSDFEval::zero(spect);
        }

        let d = ggx_d(&m, alpha);
        let g = ggx_g1(&wi, &m, alpha) * ggx_g1(&wo, &m, alpha);
        let f = fresnel_dielectric(cos_i_m, side.eta_i, side.eta_t);

        // eta^2 from the Jacobian cancels against the radiance scale.
        let value = (1.0 - f) * d * g * (cos_i_m * cos_o_m).abs() / (cos_i * cos_o.abs() * denom * denom);
        let func = spect.from_rgb(&self.specular_transmittance) * value;
        let pdf = (1.0 - f) * vndf_pdf(&wi, &m, d, alpha) * eta * eta * cos_o_m.abs() / (denom * denom);
        Self::finish(func, cos_o.abs(), pdf, spect)
    }

    fn finish(func: SpectralResponse, cos_o: Float, pdf: Float, spect: &SpectralQuery) -> BSDFEval {
        if pdf <= 0.0 || !pdf.is_finite() {
            return BSDFEval::zero(spect);
        }
        let bsdf = func * cos_o;
        let result = BSDFEval { func, bsdf, weight: bsdf / spect.constant(pdf), pdf };
        validate!(result.func);
        validate!(result.weight);
        validate!(result.pdf);
        result
    }
}

impl BSDF for DielectricBSDF {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        if is_delta_roughness(&self.roughness) {
            return self.sample_delta(data, smp);
        }

        let spect = &data.spectrum_sample;
        let side = match self.side(data) {
            Some(side) => side,
            None => return BSDFSample::invalid(spect),
        };

        let wi = side.frame.to_local(&-data.w_i);
        let m = sample_ggx_vndf(&wi, &smp.next_2d(), &clamp_alpha(&self.roughness));
        let cos_i_m = wi.dot(&m);
        if cos_i_m <= 0.0 {
            return BSDFSample::invalid(spect);
        }

        let f = fresnel_dielectric(cos_i_m, side.eta_i, side.eta_t);
        let refracted = if smp.next() < f { None } else { refract(&wi, &m, side.eta_i / side.eta_t) };

        let (wo, transmitted) = match refracted {
            Some(wt) if wt.z < 0.0 => (wt.normalize(), true),
            Some(_) => return BSDFSample::invalid(spect),
            None => (reflect(&wi, &m), false),
        };
        if !transmitted && wo.z <= 0.0 {
            return BSDFSample::invalid(spect);
        }

        let w_o = side.frame.from_local(&wo);
        let eval = self.evaluate(&data.with_w_o(w_o), images);
        let mut result = BSDFSample::from_eval(w_o, &eval, BSDFProperties::NONE);
        if transmitted {
            result.eta = side.eta_t / side.eta_i;
            result.medium_index = side.medium_t;
            result.properties = BSDFProperties::MEDIUM_CHANGED;
        }
        result
    }

    fn evaluate(&self, data: &BSDFData, _images: &[Image]) -> BSDFEval {
        if is_delta_roughness(&self.roughness) {
            return BSDFEval::zero(&data.spectrum_sample);
        }
        match self.side(data) {
            Some(side) => self.evaluate_rough(data, &side),
            None => BSDFEval::zero(&data.spectrum_sample),
        }
    }

    fn pdf(&self, data: &BSDFData, images: &[Image]) -> Float {
        if is_delta_roughness(&self.roughness) {
            return 0.0;
        }
        self.evaluate(data, images).pdf
    }

    fn continue_tracing(&self, _tex: &Vector2f, _images: &[Image], _smp: &mut dyn Sampler) -> bool {
        false
    }
}
