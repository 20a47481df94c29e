// Copyright @yucwang 2026

use crate::core::bsdf::{ alpha_continue_tracing, apply_image, is_delta_roughness, BSDFData, BSDFEval, BSDFProperties, BSDFSample, BSDF };
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::materials::microfacet::{ fresnel_dielectric_dir, half_vector, reflect, NormalDistribution };
use crate::math::constants::{ Float, Vector2f, EPSILON, INV_PI };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_cosine_hemisphere;
use crate::validate;

/// Dielectric coating over a diffuse substrate.
pub struct PlasticBSDF {
    diffuse: RGBSpectrum,
    diffuse_image: Option<usize>,
    specular: RGBSpectrum,
    roughness: Vector2f,
    int_ior: Float,
    ext_ior: Float,
}

impl PlasticBSDF {
    pub fn new(diffuse: RGBSpectrum, specular: RGBSpectrum, roughness: Vector2f, int_ior: Float, ext_ior: Float) -> Self {
        Self {
            diffuse,
            diffuse_image: None,
            specular,
            roughness,
            int_ior,
            ext_ior,
        }
    }

    pub fn with_diffuse_image(mut self, image_index: usize) -> Self {
        self.diffuse_image = Some(image_index);
        self
    }

    fn sample_delta(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        let spect = &data.spectrum_sample;
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFSample::invalid(spect),
        };

        let f = fresnel_dielectric_dir(&data.w_i, &frame.nrm(), self.ext_ior, self.int_ior);
        let reflection = smp.next() <= f;

        let mut properties = BSDFProperties::DIFFUSE;
        let w_o = if reflection {
            properties |= BSDFProperties::DELTA_REFLECTION;
            reflect(&-data.w_i, &frame.nrm()).normalize()
        } else {
            frame.from_local(&sample_cosine_hemisphere(&smp.next_2d()))
        };

        let n_dot_o = frame.nrm().dot(&w_o);
        if n_dot_o <= EPSILON {
            return BSDFSample::invalid(spect);
        }

        let diffuse = apply_image(spect, &self.diffuse, self.diffuse_image, &data.tex(), images);
        let (weight, pdf) = if reflection {
            let bsdf = diffuse * (INV_PI * n_dot_o * (1.0 - f)) + spect.from_rgb(&self.specular) * f;
            let pdf = INV_PI * n_dot_o * (1.0 - f) + f;
            (bsdf / spect.constant(pdf), pdf)
        } else {
            (diffuse, INV_PI * n_dot_o * (1.0 - f))
        };
        validate!(weight);
        validate!(pdf);

        BSDFSample {
            w_o,
            weight,
            pdf,
            eta: 1.0,
            medium_index: None,
            properties,
        }
    }

    fn evaluate_delta(&self, data: &BSDFData, images: &[Image]) -> BSDFEval {
        let spect = &data.spectrum_sample;
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFEval::zero(spect),
        };

        let n_dot_o = frame.nrm().dot(&data.w_o);
        if n_dot_o <= EPSILON {
            return BSDFEval::zero(spect);
        }

        // Probability of the diffuse branch depends only on the incident direction.
        let f = fresnel_dielectric_dir(&data.w_i, &frame.nrm(), self.ext_ior, self.int_ior);
        let diffuse = apply_image(spect, &self.diffuse, self.diffuse_image, &data.tex(), images);

        let result = BSDFEval {
            func: diffuse * (INV_PI * (1.0 - f)),
            bsdf: diffuse * (INV_PI * n_dot_o * (1.0 - f)),
            weight: diffuse,
            pdf: INV_PI * n_dot_o * (1.0 - f),
        };
        validate!(result.func);
        validate!(result.bsdf);
        validate!(result.weight);
        validate!(result.pdf);
        result
    }

    fn pdf_delta(&self, data: &BSDFData) -> Float {
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return 0.0,
        };

        let n_dot_o = frame.nrm().dot(&data.w_o);
        if n_dot_o <= EPSILON {
            return 0.0;
        }

        let f = fresnel_dielectric_dir(&data.w_i, &frame.nrm(), self.ext_ior, self.int_ior);
        INV_PI * n_dot_o * (1.0 - f)
    }
}

impl BSDF for PlasticBSDF {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        if is_delta_roughness(&self.roughness) {
            return self.sample_delta(data, images, smp);
        }

        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFSample::invalid(&data.spectrum_sample),
        };

        let ggx = NormalDistribution::new(&frame, self.roughness);
        let m = ggx.sample(smp, &data.w_i);
        let f = fresnel_dielectric_dir(&data.w_i, &m, self.ext_ior, self.int_ior);

        let (w_o, properties) = if smp.next() <= f {
            (reflect(&-data.w_i, &m).normalize(), BSDFProperties::NONE)
        } else {
            (frame.from_local(&sample_cosine_hemisphere(&smp.next_2d())), BSDFProperties::DIFFUSE)
        };

        let eval = self.evaluate(&data.with_w_o(w_o), images);
        BSDFSample::from_eval(w_o, &eval, properties)
    }

    fn evaluate(&self, data: &BSDFData, images: &[Image]) -> BSDFEval {
        if is_delta_roughness(&self.roughness) {
            return self.evaluate_delta(data, images);
        }

        let spect = &data.spectrum_sample;
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFEval::zero(spect),
        };
        let m = match half_vector(&data.w_i, &data.w_o) {
            Some(m) => m,
            None => return BSDFEval::zero(spect),
        };

        let n_dot_o = frame.nrm().dot(&data.w_o);
        let n_dot_i = -frame.nrm().dot(&data.w_i);
        let m_dot_o = m.dot(&data.w_o);
        if n_dot_o <= EPSILON || n_dot_i <= EPSILON || m_dot_o <= EPSILON {
            return BSDFEval::zero(spect);
        }

        let f = fresnel_dielectric_dir(&data.w_i, &m, self.ext_ior, self.int_ior);
        let ggx = NormalDistribution::new(&frame, self.roughness);
        let eval = ggx.evaluate(&m, &data.w_i, &data.w_o);
        let j = 1.0 / (4.0 * m_dot_o);

        let diffuse = apply_image(spect, &self.diffuse, self.diffuse_image, &data.tex(), images);
        let specular = spect.from_rgb(&self.specular);
        let microfacet = f * eval.ndf * eval.visibility / (4.0 * n_dot_i);

        let func = diffuse * (INV_PI * (1.0 - f)) + specular * (microfacet / n_dot_o);
        let bsdf = diffuse * (INV_PI * n_dot_o * (1.0 - f)) + specular * microfacet;
        let pdf = INV_PI * n_dot_o * (1.0 - f) + eval.pdf * j * f;
        let weight = bsdf / spect.constant(pdf);
        validate!(func);
        validate!(bsdf);
        validate!(pdf);
        validate!(weight);
        BSDFEval { func, bsdf, weight, pdf }
    }

    fn pdf(&self, data: &BSDFData, _images: &[Image]) -> Float {
        if is_delta_roughness(&self.roughness) {
            return self.pdf_delta(data);
        }

        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return 0.0,
        };
        let m = match half_vector(&data.w_i, &data.w_o) {
            Some(m) => m,
            None => return 0.0,
        };

        let m_dot_o = m.dot(&data.w_o);
        let n_dot_o = frame.nrm().dot(&data.w_o);
        if n_dot_o <= EPSILON || m_dot_o <= EPSILON {
            return 0.0;
        }

        let f = fresnel_dielectric_dir(&data.w_i, &m, self.ext_ior, self.int_ior);
        let ggx = NormalDistribution::new(&frame, self.roughness);
        let j = 1.0 / (4.0 * m_dot_o);
        let result = INV_PI * n_dot_o * (1.0 - f) + ggx.pdf(&m, &data.w_i, &data.w_o) * j * f;
        validate!(result);
        result
    }

    fn continue_tracing(&self, tex: &Vector2f, images: &[Image], smp: &mut dyn Sampler) -> bool {
        alpha_continue_tracing(self.diffuse_image, tex, images, smp)
    }
}
