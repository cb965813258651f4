//! Media quality scoring
//!
//! Combines sharpness (high-frequency byte transitions) with a file-size
//! proxy. The clamp to a realistic display range exists because raw
//! heuristic output is not a trustworthy absolute confidence and must
//! never be presented as 0% or 100%.

use super::byte_sampler::SampleSet;

/// Quality assessor
pub struct QualityAssessor {
    jump_threshold: f64,
    sharpness_weight: f64,
    size_weight: f64,
    floor: f64,
    ceiling: f64,
}

impl QualityAssessor {
    pub fn new(
        jump_threshold: f64,
        sharpness_weight: f64,
        size_weight: f64,
        floor: f64,
        ceiling: f64,
    ) -> Self {
        Self {
            jump_threshold,
            sharpness_weight,
            size_weight,
            floor,
            ceiling,
        }
    }

    /// Score media quality from samples and total byte length
    ///
    /// Quality is independent of whether biological content was found,
    /// so the orchestrator calls this on both result paths.
    pub fn assess(&self, samples: &SampleSet, byte_length: u64) -> f64 {
        let sharpness = self.sharpness_percent(samples);
        let size_quality = Self::size_quality_percent(byte_length);

        let score = sharpness * self.sharpness_weight + size_quality * self.size_weight;
        score.clamp(self.floor, self.ceiling)
    }

    /// Fraction of adjacent deltas above the jump threshold, as a percent
    fn sharpness_percent(&self, samples: &SampleSet) -> f64 {
        if samples.len() < 2 {
            return 0.0;
        }

        let jumps = samples
            .successive_deltas()
            .iter()
            .filter(|&&delta| delta > self.jump_threshold)
            .count();

        (jumps as f64 / samples.len() as f64) * 100.0
    }

    /// Bounded linear file-size proxy: 100KiB maps to 1%, capped at 100
    fn size_quality_percent(byte_length: u64) -> f64 {
        (byte_length as f64 / (1024.0 * 100.0)).min(100.0)
    }
}
