//! Bounded, order-preserving sampling of route coordinates for spatial queries.

use crate::error::{PoiError, Result};
use crate::models::LatLng;
use crate::polyline;
use serde::{Deserialize, Serialize};

/// Thresholds controlling how long routes are thinned out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Routes with fewer points than this are returned unchanged.
    pub min_points_for_sampling: usize,
    /// Fraction of points kept on long routes.
    pub sample_ratio: f64,
    /// Lower bound on the target sample count.
    pub min_samples: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_points_for_sampling: 100,
            sample_ratio: 0.25,
            min_samples: 5,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.sample_ratio.is_finite() || self.sample_ratio <= 0.0 {
            return Err(PoiError::invalid(format!(
                "sample ratio must be a positive number, got {}",
                self.sample_ratio
            )));
        }
        Ok(())
    }

    /// Step between kept indices for a route of `n` points. `1` keeps everything.
    pub fn step_for(&self, n: usize) -> usize {
        if n < self.min_points_for_sampling {
            return 1;
        }
        let by_ratio = (n as f64 * self.sample_ratio).floor() as usize;
        let target = self.min_samples.max(by_ratio);
        if target == 0 {
            return 1;
        }
        (n / target).max(1)
    }
}

/// Thin `coords` according to `config`, preserving order and always keeping index 0.
pub fn sample(coords: &[LatLng], config: &SamplerConfig) -> Vec<LatLng> {
    let step = config.step_for(coords.len());
    if step == 1 {
        return coords.to_vec();
    }
    coords.iter().step_by(step).copied().collect()
}

/// Indices that [`sample`] keeps, for callers that carry extra per-point data.
pub fn sample_indices(n: usize, config: &SamplerConfig) -> Vec<usize> {
    (0..n).step_by(config.step_for(n)).collect()
}

pub fn sample_encoded(encoded: &str, config: &SamplerConfig) -> Result<Vec<LatLng>> {
    let coords = polyline::decode(encoded)?;
    Ok(sample(&coords, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<LatLng> {
        (0..n)
            .map(|i| LatLng::new(45.0 + i as f64 * 1e-4, 7.0 + i as f64 * 1e-4))
            .collect()
    }

    #[test]
    fn test_short_route_unchanged() {
        let coords = line(50);
        let sampled = sample(&coords, &SamplerConfig::default());
        assert_eq!(sampled, coords);
    }

    #[test]
    fn test_threshold_boundary() {
        let config = SamplerConfig::default();
        assert_eq!(sample(&line(99), &config).len(), 99);
        // 100 points: target 25, step 4.
        assert_eq!(sample(&line(100), &config).len(), 25);
    }

    #[test]
    fn test_long_route_subsequence() {
        let coords = line(1000);
        let config = SamplerConfig::default();
        let indices = sample_indices(coords.len(), &config);
        let sampled = sample(&coords, &config);

        assert_eq!(indices[0], 0);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(sampled.len() >= 5 && sampled.len() <= 1000);
        assert_eq!(sampled.len(), indices.len());
        for (point, index) in sampled.iter().zip(&indices) {
            assert_eq!(*point, coords[*index]);
        }
        // target = 250, step = 4
        assert_eq!(sampled.len(), 250);
    }

    #[test]
    fn test_min_samples_floor() {
        let config = SamplerConfig {
            min_points_for_sampling: 10,
            sample_ratio: 0.01,
            min_samples: 5,
        };
        // floor(20 * 0.01) = 0 -> target 5 -> step 4
        assert_eq!(sample(&line(20), &config).len(), 5);
    }

    #[test]
    fn test_ratio_above_one_keeps_everything() {
        let config = SamplerConfig {
            sample_ratio: 3.0,
            ..SamplerConfig::default()
        };
        assert_eq!(sample(&line(400), &config).len(), 400);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let config = SamplerConfig {
            sample_ratio: 0.0,
            ..SamplerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(SamplerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_sample_encoded_round_trips() {
        let coords = line(200);
        let encoded = polyline::encode(&coords);
        let sampled = sample_encoded(&encoded, &SamplerConfig::default()).unwrap();
        assert_eq!(sampled.len(), 50);
        assert!((sampled[1].lat - coords[4].lat).abs() < 1e-5);
    }
}
