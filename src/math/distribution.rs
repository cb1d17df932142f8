// Copyright @yucwang 2026

use crate::math::constants::Float;

#[derive(Debug, Clone)]
pub struct DiscreteDistribution {
    values: Vec<Float>,
    cdf: Vec<Float>,
}

impl DiscreteDistribution {
    pub fn new(values: Vec<Float>, weights: &[Float]) -> Option<Self> {
        if values.is_empty() || values.len() != weights.len() {
            return None;
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }

        let mut cdf = Vec::with_capacity(weights.len() + 1);
        let mut total = 0.0;
        cdf.push(0.0);
        for w in weights {
            total += w;
            cdf.push(total);
        }
        if total <= 0.0 {
            return None;
        }
        for c in cdf.iter_mut() {
            *c /= total;
        }

        Some(Self { values, cdf })
    }

    pub fn sample(&self, u: Float) -> Float {
        let idx = self.cdf[1..].partition_point(|c| *c <= u);
        self.values[idx.min(self.values.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_tables() {
        assert!(DiscreteDistribution::new(vec![], &[]).is_none());
        assert!(DiscreteDistribution::new(vec![1.0, 2.0], &[1.0]).is_none());
        assert!(DiscreteDistribution::new(vec![1.0], &[0.0]).is_none());
        assert!(DiscreteDistribution::new(vec![1.0, 2.0], &[1.0, -1.0]).is_none());
    }

    #[test]
    fn test_sample_inverts_cdf() {
        let dist = DiscreteDistribution::new(vec![10.0, 20.0, 30.0], &[1.0, 0.0, 3.0]).unwrap();
        assert_eq!(dist.cdf, vec![0.0, 0.25, 0.25, 1.0]);
        assert_eq!(dist.sample(0.0), 10.0);
        assert_eq!(dist.sample(0.2499), 10.0);
        assert_eq!(dist.sample(0.25), 30.0);
        assert_eq!(dist.sample(0.9999), 30.0);
    }
}
