// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::frame::Frame;
use crate::math::spectrum::SpectralResponse;

const MIN_ALPHA: Float = 1e-4;

fn clamp01(v: Float) -> Float {
    if v < 0.0 {
        0.0
    } else if v > 1.0 {
        1.0
    } else {
        v
    }
}

/// Microfacet density, masking and sampling density evaluated for one half vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdfEval {
    pub ndf: Float,
    pub visibility: Float,
    pub pdf: Float,
}

/// Anisotropic GGX distribution attached to a shading frame.
/// Directions passed in are world space; `w_i` points towards the surface.
pub struct NormalDistribution {
    frame: Frame,
    alpha: Vector2f,
}

impl NormalDistribution {
    pub fn new(frame: &Frame, alpha: Vector2f) -> Self {
        Self {
            frame: *frame,
            alpha: clamp_alpha(&alpha),
        }
    }

    pub fn sample(&self, smp: &mut dyn Sampler, w_i: &Vector3f) -> Vector3f {
        let wi = self.frame.to_local(&-w_i);
        let m = sample_ggx_vndf(&wi, &smp.next_2d(), &self.alpha);
        self.frame.from_local(&m)
    }

    pub fn evaluate(&self, m: &Vector3f, w_i: &Vector3f, w_o: &Vector3f) -> NdfEval {
        let m = self.frame.to_local(m);
        let wi = self.frame.to_local(&-w_i);
        let wo = self.frame.to_local(w_o);
        let ndf = ggx_d(&m, &self.alpha);
        NdfEval {
            ndf,
            visibility: ggx_g1(&wi, &m, &self.alpha) * ggx_g1(&wo, &m, &self.alpha),
            pdf: vndf_pdf(&wi, &m, ndf, &self.alpha),
        }
    }

    /// Density of sampling `m` when looking from `w_i`.
    pub fn pdf(&self, m: &Vector3f, w_i: &Vector3f, _w_o: &Vector3f) -> Float {
        let m = self.frame.to_local(m);
        let wi = self.frame.to_local(&-w_i);
        vndf_pdf(&wi, &m, ggx_d(&m, &self.alpha), &self.alpha)
    }
}

pub fn clamp_alpha(alpha: &Vector2f) -> Vector2f {
    Vector2f::new(alpha.x.max(MIN_ALPHA), alpha.y.max(MIN_ALPHA))
}

/// Visible-normal density of `m` seen from `wi`, both in the local frame.
pub fn vndf_pdf(wi: &Vector3f, m: &Vector3f, ndf: Float, alpha: &Vector2f) -> Float {
    if wi.z <= 1e-6 || m.z <= 0.0 {
        return 0.0;
    }
    ggx_g1(wi, m, alpha) * wi.dot(m).max(0.0) * ndf / wi.z
}

pub fn ggx_d(m: &Vector3f, alpha: &Vector2f) -> Float {
    if m.z <= 0.0 {
        return 0.0;
    }
    let x = m.x / alpha.x;
    let y = m.y / alpha.y;
    let denom = x * x + y * y + m.z * m.z;
    1.0 / (PI * alpha.x * alpha.y * denom * denom)
}

fn ggx_lambda(w: &Vector3f, alpha: &Vector2f) -> Float {
    let cos2 = w.z * w.z;
    if cos2 <= 0.0 {
        return Float::MAX;
    }
    let a2_tan2 = (alpha.x * alpha.x * w.x * w.x + alpha.y * alpha.y * w.y * w.y) / cos2;
    0.5 * (-1.0 + (1.0 + a2_tan2).sqrt())
}

/// Smith masking for one direction; zero when `w` sees the back of the microfacet.
pub fn ggx_g1(w: &Vector3f, m: &Vector3f, alpha: &Vector2f) -> Float {
    if w.z == 0.0 || w.dot(m) * w.z <= 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + ggx_lambda(w, alpha))
}

pub fn sample_ggx_vndf(wi: &Vector3f, u: &Vector2f, alpha: &Vector2f) -> Vector3f {
    let wi = Vector3f::new(alpha.x * wi.x, alpha.y * wi.y, wi.z).normalize();

    let mut t1 = Vector3f::new(1.0, 0.0, 0.0);
    if wi.z < 0.9999 {
        t1 = Vector3f::new(0.0, 0.0, 1.0).cross(&wi).normalize();
    }
    let t2 = wi.cross(&t1);

    let u1 = clamp01(u.x);
    let u2 = clamp01(u.y);
    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    let t1p = r * phi.cos();
    let mut t2p = r * phi.sin();
    let s = 0.5 * (1.0 + wi.z);
    t2p = (1.0 - s) * (1.0 - t1p * t1p).max(0.0).sqrt() + s * t2p;

    let nh = t1 * t1p + t2 * t2p + wi * (1.0 - t1p * t1p - t2p * t2p).max(0.0).sqrt();
    Vector3f::new(alpha.x * nh.x, alpha.y * nh.y, nh.z.max(0.0)).normalize()
}

/// Normalized `w_o - w_i`, or `None` when the two directions coincide.
pub fn half_vector(w_i: &Vector3f, w_o: &Vector3f) -> Option<Vector3f> {
    let h = w_o - w_i;
    let len2 = h.norm_squared();
    if len2 <= 1e-12 {
        None
    } else {
        Some(h / len2.sqrt())
    }
}

/// Mirrors `wi` (pointing away from the surface) about `m`.
pub fn reflect(wi: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * wi.dot(m) * m - wi
}

/// Refracts `wi` (pointing away from the surface, on the side of `m`); `eta` is eta_i / eta_t.
pub fn refract(wi: &Vector3f, m: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_i = wi.dot(m).max(-1.0).min(1.0);
    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let wt = -eta * wi + (eta * cos_i - cos_t) * m;
    Some(wt)
}

pub fn fresnel_dielectric(cos_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_i = cos_i.max(-1.0).min(1.0);
    let entering = cos_i > 0.0;
    let (eta_i, eta_t) = if entering { (eta_i, eta_t) } else { (eta_t, eta_i) };
    cos_i = cos_i.abs();

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let eta = eta_i / eta_t;
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_parl = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

/// Dielectric Fresnel for an incoming direction `w_i` hitting a surface with normal `n`,
/// exterior index `eta_e` on the side `n` points to.
pub fn fresnel_dielectric_dir(w_i: &Vector3f, n: &Vector3f, eta_e: Float, eta_i: Float) -> Float {
    fresnel_dielectric(-w_i.dot(n), eta_e, eta_i)
}

pub fn fresnel_schlick(f0: &SpectralResponse, cos_theta: Float) -> SpectralResponse {
    let cos_theta = clamp01(cos_theta);
    let one_minus = (1.0 - cos_theta).powi(5);
    *f0 + (f0.query().constant(1.0) - *f0) * one_minus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::LcgRng;
    use crate::math::spectrum::SpectralQuery;

    fn assert_close(a: Float, b: Float, eps: Float) {
        assert!((a - b).abs() < eps, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_fresnel_normal_incidence() {
        let f = fresnel_dielectric(1.0, 1.0, 1.5);
        assert_close(f, 0.04, 1e-4);
        // Leaving the denser side past the critical angle.
        assert_close(fresnel_dielectric(-0.1, 1.0, 1.5), 1.0, 1e-6);
    }

    #[test]
    fn test_fresnel_schlick_limits() {
        let spect = SpectralQuery::sample(0.3);
        let f0 = spect.constant(0.25);
        assert_close(fresnel_schlick(&f0, 1.0).component(0), 0.25, 1e-6);
        assert_close(fresnel_schlick(&f0, 0.0).component(2), 1.0, 1e-6);
    }

    #[test]
    fn test_reflect_refract() {
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let r = reflect(&wi, &n);
        assert_close(r.x, -0.6, 1e-6);
        assert_close(r.z, 0.8, 1e-6);

        let t = refract(&wi, &n, 1.0 / 1.5).unwrap();
        assert!(t.z < 0.0);
        // Snell: sin_t = sin_i / 1.5
        assert_close(t.x, -0.4, 1e-5);
        assert!(refract(&Vector3f::new(0.9, 0.0, 0.43589).normalize(), &n, 1.5).is_none());
    }

    #[test]
    fn test_ndf_projected_area_is_one() {
        // Integral of D(m) cos(theta_m) over the hemisphere equals one.
        let alpha = Vector2f::new(0.3, 0.6);
        let mut rng = LcgRng::new(7);
        let count = 200000;
        let mut sum = 0.0;
        for _ in 0..count {
            let u = rng.next_2d();
            let m = crate::math::warp::sample_cosine_hemisphere(&u);
            let pdf = crate::math::warp::sample_cosine_hemisphere_pdf(m.z);
            if pdf > 0.0 {
                sum += ggx_d(&m, &alpha) * m.z / pdf;
            }
        }
        assert_close(sum / count as Float, 1.0, 0.05);
    }

    #[test]
    fn test_vndf_samples_upper_hemisphere() {
        let frame = Frame::from_normal(Vector3f::new(0.0, 0.0, 1.0));
        let ndf = NormalDistribution::new(&frame, Vector2f::new(0.2, 0.2));
        let w_i = Vector3f::new(0.3, 0.1, -1.0).normalize();
        let mut rng = LcgRng::new(11);
        for _ in 0..256 {
            let m = ndf.sample(&mut rng, &w_i);
            assert!(m.z >= 0.0);
            let w_o = reflect(&-w_i, &m);
            let eval = ndf.evaluate(&m, &w_i, &w_o);
            assert!(eval.pdf >= 0.0);
            assert!(eval.visibility <= 1.0);
        }
    }
}
