// Copyright @yucwang 2026

use super::constants::Float;

/// Piecewise-constant discrete distribution built from non-negative weights.
#[derive(Debug, Clone, Default)]
pub struct Distribution1D {
    cdf: Vec<Float>,
    total: Float,
}

impl Distribution1D {
    pub fn new(weights: &[Float]) -> Self {
        let mut cdf = vec![0.0; weights.len() + 1];
        let mut total = 0.0;
        for (i, w) in weights.iter().enumerate() {
            total += w.max(0.0);
            cdf[i + 1] = total;
        }

        Self { cdf, total }
    }

    pub fn len(&self) -> usize {
        self.cdf.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 || self.total <= 0.0
    }

    /// Returns the selected index and its discrete probability.
    pub fn sample(&self, u: Float) -> Option<(usize, Float)> {
        if self.is_empty() {
            return None;
        }

        let target = u.max(0.0).min(1.0) * self.total;
        // First bucket whose upper edge exceeds the target; zero-weight buckets are skipped.
        let mut lo = 0usize;
        let mut hi = self.len() - 1;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.cdf[mid + 1] > target {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        while lo > 0 && self.cdf[lo + 1] == self.cdf[lo] {
            lo -= 1;
        }

        Some((lo, self.pdf(lo)))
    }

    pub fn pdf(&self, index: usize) -> Float {
        if index >= self.len() || self.total <= 0.0 {
            return 0.0;
        }
        (self.cdf[index + 1] - self.cdf[index]) / self.total
    }
}

#[cfg(test)]
mod tests {
    use super::Distribution1D;
    use crate::math::constants::Float;

    #[test]
    fn test_sampling_matches_weights() {
        let dist = Distribution1D::new(&[1.0, 0.0, 3.0]);
        assert_eq!(dist.len(), 3);
        assert!((dist.pdf(0) - 0.25).abs() < 1e-6);
        assert_eq!(dist.pdf(1), 0.0);
        assert!((dist.pdf(2) - 0.75).abs() < 1e-6);

        let mut counts = [0usize; 3];
        let n = 1000;
        for i in 0..n {
            let (idx, pdf) = dist.sample((i as Float + 0.5) / n as Float).unwrap();
            assert!(pdf > 0.0);
            counts[idx] += 1;
        }
        assert_eq!(counts[1], 0);
        assert_eq!(counts[0], 250);
        assert_eq!(counts[2], 750);
    }

    #[test]
    fn test_empty_distribution() {
        assert!(Distribution1D::new(&[]).sample(0.5).is_none());
        assert!(Distribution1D::new(&[0.0, 0.0]).sample(0.5).is_none());
    }

    #[test]
    fn test_upper_edge_is_clamped() {
        let dist = Distribution1D::new(&[1.0, 1.0, 0.0]);
        let (idx, _) = dist.sample(1.0).unwrap();
        assert_eq!(idx, 1);
    }
}
