//! Bounded byte sampling over upload buffers
//!
//! Draws an evenly-strided subset of bytes so the rest of the pipeline
//! never touches the full payload. Pure function of the buffer and cap.

/// Ordered, bounded subset of an upload buffer
#[derive(Debug, Clone)]
pub struct SampleSet {
    samples: Vec<u8>,
    stride: usize,
    source_len: usize,
}

impl SampleSet {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Stride used to draw the samples (1 for short buffers)
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Length of the buffer the samples were drawn from
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.samples
    }

    /// Absolute successive-sample deltas
    ///
    /// The shared motion signal consumed by the movement classifier,
    /// quality assessor, and morphology estimator. Empty for fewer than
    /// two samples.
    pub fn successive_deltas(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .map(|pair| (pair[1] as f64 - pair[0] as f64).abs())
            .collect()
    }

    /// Mean of the absolute successive deltas, 0.0 when degenerate
    pub fn mean_abs_delta(&self) -> f64 {
        let deltas = self.successive_deltas();
        if deltas.is_empty() {
            return 0.0;
        }
        deltas.iter().sum::<f64>() / deltas.len() as f64
    }
}

/// Byte sampler with a fixed sample-count cap
pub struct ByteSampler {
    cap: usize,
}

impl ByteSampler {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    /// Draw at most `cap` evenly-spaced bytes from the buffer
    ///
    /// Buffers shorter than the cap are taken whole; empty buffers yield
    /// an empty set, which downstream components treat as "no content".
    pub fn sample(&self, buffer: &[u8]) -> SampleSet {
        if buffer.is_empty() || self.cap == 0 {
            return SampleSet {
                samples: Vec::new(),
                stride: 1,
                source_len: buffer.len(),
            };
        }

        if buffer.len() <= self.cap {
            return SampleSet {
                samples: buffer.to_vec(),
                stride: 1,
                source_len: buffer.len(),
            };
        }

        // Stride covers the full buffer span for large inputs
        let stride = (buffer.len() / self.cap).max(1);
        let samples: Vec<u8> = buffer.iter().step_by(stride).take(self.cap).copied().collect();

        SampleSet {
            samples,
            stride,
            source_len: buffer.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_yields_empty_set() {
        let set = ByteSampler::new(5000).sample(&[]);
        assert!(set.is_empty());
        assert_eq!(set.source_len(), 0);
    }

    #[test]
    fn short_buffer_is_taken_whole() {
        let buffer: Vec<u8> = (0..10).collect();
        let set = ByteSampler::new(5000).sample(&buffer);
        assert_eq!(set.as_slice(), buffer.as_slice());
        assert_eq!(set.stride(), 1);
    }

    #[test]
    fn sample_count_never_exceeds_cap() {
        let buffer = vec![0xAB; 1_000_000];
        let set = ByteSampler::new(5000).sample(&buffer);
        assert!(set.len() <= 5000);
    }

    #[test]
    fn stride_covers_buffer_span() {
        let buffer = vec![0u8; 123_457];
        let set = ByteSampler::new(5000).sample(&buffer);
        // Last drawn index stays inside the buffer while spanning it
        assert!(set.stride() * (set.len() - 1) < buffer.len());
        assert!(set.stride() * set.len() >= buffer.len() - set.stride());
    }

    #[test]
    fn sampling_is_deterministic() {
        let buffer: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let sampler = ByteSampler::new(5000);
        assert_eq!(
            sampler.sample(&buffer).as_slice(),
            sampler.sample(&buffer).as_slice()
        );
    }

    #[test]
    fn deltas_are_absolute() {
        let buffer = [10u8, 250, 10];
        let set = ByteSampler::new(10).sample(&buffer);
        assert_eq!(set.successive_deltas(), vec![240.0, 240.0]);
        assert_eq!(set.mean_abs_delta(), 240.0);
    }

    #[test]
    fn single_sample_has_no_deltas() {
        let set = ByteSampler::new(10).sample(&[42]);
        assert!(set.successive_deltas().is_empty());
        assert_eq!(set.mean_abs_delta(), 0.0);
    }
}
