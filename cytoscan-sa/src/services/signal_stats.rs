//! Byte-signal statistics
//!
//! Mean, variance, and standard deviation over a sample set, used as a
//! proxy for visual activity in the absence of real decoding.

use super::byte_sampler::SampleSet;

/// Statistical summary of a sample set
///
/// Derived purely from the samples; `variance >= 0` always holds. A
/// zero-valued summary from an empty set is the signal that
/// short-circuits the pipeline into the no-content branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalSummary {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl StatisticalSummary {
    /// Compute the summary for a sample set
    pub fn from_samples(samples: &SampleSet) -> Self {
        if samples.is_empty() {
            return Self::zeroed();
        }

        let values = samples.as_slice();
        let mean = values.iter().map(|&b| b as f64).sum::<f64>() / values.len() as f64;
        let variance = values
            .iter()
            .map(|&b| {
                let diff = b as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / values.len() as f64;

        Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// Zero-valued summary for an empty sample set
    pub fn zeroed() -> Self {
        Self {
            mean: 0.0,
            variance: 0.0,
            std_dev: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::byte_sampler::ByteSampler;

    fn sample(buffer: &[u8]) -> SampleSet {
        ByteSampler::new(10_000).sample(buffer)
    }

    #[test]
    fn empty_set_yields_zeroed_summary() {
        let summary = StatisticalSummary::from_samples(&sample(&[]));
        assert_eq!(summary, StatisticalSummary::zeroed());
    }

    #[test]
    fn constant_buffer_has_zero_variance() {
        let summary = StatisticalSummary::from_samples(&sample(&[7u8; 1024]));
        assert_eq!(summary.mean, 7.0);
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn known_values() {
        // Samples 0 and 10: mean 5, variance 25, std dev 5
        let summary = StatisticalSummary::from_samples(&sample(&[0, 10]));
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.variance, 25.0);
        assert_eq!(summary.std_dev, 5.0);
    }

    #[test]
    fn variance_is_never_negative() {
        for buffer in [&[0u8][..], &[255u8; 64][..], &[0, 255, 0, 255][..]] {
            let summary = StatisticalSummary::from_samples(&sample(buffer));
            assert!(summary.variance >= 0.0);
            assert!(summary.std_dev >= 0.0);
        }
    }
}
