// Copyright @yucwang 2026

use crate::core::bsdf::{ alpha_continue_tracing, apply_image, BSDFData, BSDFEval, BSDFProperties, BSDFSample, BSDF };
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::materials::microfacet::{ fresnel_dielectric_dir, half_vector, reflect, NormalDistribution };
use crate::math::constants::{ Float, Vector2f, EPSILON, INV_PI, PI };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_cosine_hemisphere;
use crate::validate;

/// Glossy coat over a diffuse base, with a 50/50 lobe selection.
pub struct CoatingBSDF {
    diffuse: RGBSpectrum,
    diffuse_image: Option<usize>,
    specular: RGBSpectrum,
    specular_image: Option<usize>,
    roughness: Vector2f,
    int_ior: Float,
    ext_ior: Float,
}

fn remap_alpha(a: &Vector2f) -> Vector2f {
    let x = a.x.max(1.0 / 16.0);
    let y = a.y.max(1.0 / 16.0);
    Vector2f::new(x * x, y * y)
}

fn pow5(value: Float) -> Float {
    let v2 = value * value;
    v2 * v2 * value.abs()
}

impl CoatingBSDF {
    pub fn new(diffuse: RGBSpectrum, specular: RGBSpectrum, roughness: Vector2f, int_ior: Float, ext_ior: Float) -> Self {
        Self {
            diffuse,
            diffuse_image: None,
            specular,
            specular_image: None,
            roughness,
            int_ior,
            ext_ior,
        }
    }

    pub fn with_images(mut self, diffuse_image: Option<usize>, specular_image: Option<usize>) -> Self {
        self.diffuse_image = diffuse_image;
        self.specular_image = specular_image;
        self
    }
}

impl BSDF for CoatingBSDF {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFSample::invalid(&data.spectrum_sample),
        };

        let (w_o, properties) = if smp.next() <= 0.5 {
            let ggx = NormalDistribution::new(&frame, remap_alpha(&self.roughness));
            let m = ggx.sample(smp, &data.w_i);
            (reflect(&-data.w_i, &m).normalize(), BSDFProperties::NONE)
        } else {
            (frame.from_local(&sample_cosine_hemisphere(&smp.next_2d())), BSDFProperties::DIFFUSE)
        };

        let eval = self.evaluate(&data.with_w_o(w_o), images);
        BSDFSample::from_eval(w_o, &eval, properties)
    }

    fn evaluate(&self, data: &BSDFData, images: &[Image]) -> BSDFEval {
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
        let ggx = NormalDistribution::new(&frame, remap_alpha(&self.roughness));
        let eval = ggx.evaluate(&m, &data.w_i, &data.w_o);

        let tex = data.tex();
        let specular_value = apply_image(spect, &self.specular, self.specular_image, &tex, images);
        let diffuse_value = apply_image(spect, &self.diffuse, self.diffuse_image, &tex, images);
        let one = spect.constant(1.0);
        let fresnel = specular_value + (one - specular_value) * f;

        let retro = (1.0 - pow5(1.0 - 0.5 * n_dot_i)) * (1.0 - pow5(1.0 - 0.5 * n_dot_o));
        let diffuse_factor = (one - specular_value) * (28.0 / (23.0 * PI) * retro);
        let specular = fresnel * (eval.ndf / (4.0 * m_dot_o * m_dot_o));

        let func = diffuse_value * diffuse_factor + specular;
        let bsdf = func * n_dot_o;
        let pdf = 0.5 * (INV_PI * n_dot_o + eval.pdf / (4.0 * m_dot_o));
        let weight = bsdf / spect.constant(pdf);
        validate!(func);
        validate!(bsdf);
        validate!(pdf);
        validate!(weight);
        BSDFEval { func, bsdf, weight, pdf }
    }

    fn pdf(&self, data: &BSDFData, _images: &[Image]) -> Float {
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

        let ggx = NormalDistribution::new(&frame, remap_alpha(&self.roughness));
        let result = 0.5 * (INV_PI * n_dot_o + ggx.pdf(&m, &data.w_i, &data.w_o) / (4.0 * m_dot_o));
        validate!(result);
        result
    }

    fn continue_tracing(&self, tex: &Vector2f, images: &[Image], smp: &mut dyn Sampler) -> bool {
        alpha_continue_tracing(self.diffuse_image, tex, images, smp)
    }
}
