// Copyright @yucwang 2023

use crate::core::bsdf::{ alpha_continue_tracing, apply_image, BSDFData, BSDFEval, BSDFProperties, BSDFSample, BSDF };
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::math::constants::{ Float, Vector2f, EPSILON, INV_PI };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_cosine_hemisphere;
use crate::validate;

pub struct LambertianDiffuseBSDF {
    color: RGBSpectrum,
    image_index: Option<usize>,
}

impl LambertianDiffuseBSDF {
    pub fn new(rgb: RGBSpectrum, image_index: Option<usize>) -> Self {
        Self {
            color: rgb,
            image_index,
        }
    }
}

impl BSDF for LambertianDiffuseBSDF {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFSample::invalid(&data.spectrum_sample),
        };

        let w_o = frame.from_local(&sample_cosine_hemisphere(&smp.next_2d()));
        let eval = self.evaluate(&data.with_w_o(w_o), images);
        BSDFSample::from_eval(w_o, &eval, BSDFProperties::DIFFUSE)
    }

    fn evaluate(&self, data: &BSDFData, images: &[Image]) -> BSDFEval {
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFEval::zero(&data.spectrum_sample),
        };

        let n_dot_o = frame.nrm().dot(&data.w_o);
        if n_dot_o <= EPSILON {
            return BSDFEval::zero(&data.spectrum_sample);
        }

        let diffuse = apply_image(&data.spectrum_sample, &self.color, self.image_index, &data.tex(), images);
        let result = BSDFEval {
            func: diffuse * INV_PI,
            bsdf: diffuse * (INV_PI * n_dot_o),
            weight: diffuse,
            pdf: INV_PI * n_dot_o,
        };
        validate!(result.bsdf);
        validate!(result.pdf);
        result
    }

    fn pdf(&self, data: &BSDFData, _images: &[Image]) -> Float {
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return 0.0,
        };

        let n_dot_o = frame.nrm().dot(&data.w_o);
        if n_dot_o <= EPSILON {
            return 0.0;
        }
        INV_PI * n_dot_o
    }

    fn continue_tracing(&self, tex: &Vector2f, images: &[Image], smp: &mut dyn Sampler) -> bool {
        alpha_continue_tracing(self.image_index, tex, images, smp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::tests::sample_hit;
    use crate::core::sampler::LcgRng;
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::SpectralQuery;
    use crate::math::warp::{ sample_uniform_sphere, sample_uniform_sphere_pdf };

    fn assert_close(a: Float, b: Float, eps: Float) {
        assert!((a - b).abs() < eps, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_hemispherical_integral_equals_albedo() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.7), None);
        let hit = sample_hit();
        let spect = SpectralQuery::sample(0.42);
        let w_i = Vector3f::new(0.2, -0.1, -1.0).normalize();
        let data = BSDFData::new(spect, None, &hit, w_i, Vector3f::zeros());

        let mut rng = LcgRng::new(5);
        let count = 100000;
        let mut sum = 0.0;
        for _ in 0..count {
            let w_o = sample_uniform_sphere(&rng.next_2d());
            let eval = bsdf.evaluate(&data.with_w_o(w_o), &[]);
            sum += eval.bsdf.monochromatic() / sample_uniform_sphere_pdf();
        }
        assert_close(sum / count as Float, 0.7, 0.02);
    }

    #[test]
    fn test_sample_matches_evaluate() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::new(0.2, 0.5, 0.8), None);
        let hit = sample_hit();
        let spect = SpectralQuery::sample(0.1);
        let w_i = Vector3f::new(0.0, 0.0, -1.0);
        let data = BSDFData::new(spect, None, &hit, w_i, Vector3f::zeros());

        let mut rng = LcgRng::new(9);
        for _ in 0..64 {
            let sample = bsdf.sample(&data, &[], &mut rng);
            if !sample.valid() {
                continue;
            }
            assert!(sample.w_o.z > 0.0);
            assert!(!sample.is_delta());
            assert_close(sample.pdf, bsdf.pdf(&data.with_w_o(sample.w_o), &[]), 1e-5);
        }
    }

    #[test]
    fn test_back_side_is_two_sided() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5), None);
        let hit = sample_hit();
        let spect = SpectralQuery::sample(0.6);
        let w_i = Vector3f::new(0.0, 0.0, 1.0);
        let data = BSDFData::new(spect, None, &hit, w_i, Vector3f::new(0.0, 0.0, -1.0));
        assert_close(bsdf.pdf(&data, &[]), INV_PI, 1e-6);
        // Transmission through an opaque surface contributes nothing.
        assert_close(bsdf.pdf(&data.with_w_o(Vector3f::new(0.0, 0.0, 1.0)), &[]), 0.0, 1e-9);
    }
}
