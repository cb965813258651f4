//! Edge/contour heuristics and the content-detection gate
//!
//! Counts byte-gradient crossings as stand-ins for object boundaries and
//! blob counts. The compound content gate here is the single policy that
//! separates the zero-result path from the populated-result path.

use super::byte_sampler::SampleSet;
use super::signal_stats::StatisticalSummary;
use crate::models::AnalysisParameters;

/// Edge and contour counts over one sample set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourCounts {
    /// Adjacent-triple gradients above the edge threshold
    pub edges: usize,
    /// Rising crossings of the sample mean
    pub contours: usize,
}

/// Edge/contour detector
pub struct ContourDetector {
    edge_threshold: f64,
    variance_threshold: f64,
    std_dev_threshold: f64,
    edge_count_threshold: usize,
    min_cell_count: i64,
    max_cell_count: i64,
}

impl ContourDetector {
    pub fn new(params: &AnalysisParameters) -> Self {
        Self {
            edge_threshold: params.edge_threshold,
            variance_threshold: params.variance_threshold,
            std_dev_threshold: params.std_dev_threshold,
            edge_count_threshold: params.edge_count_threshold,
            min_cell_count: params.min_cell_count,
            max_cell_count: params.max_cell_count,
        }
    }

    /// Count edges and contours in one pass over the samples
    pub fn detect(&self, samples: &SampleSet, summary: &StatisticalSummary) -> ContourCounts {
        ContourCounts {
            edges: self.count_edges(samples),
            contours: self.count_contours(samples, summary.mean),
        }
    }

    /// Edges: adjacent-triple gradient |s[i+1] - s[i-1]| above threshold
    fn count_edges(&self, samples: &SampleSet) -> usize {
        samples
            .as_slice()
            .windows(3)
            .filter(|w| (w[2] as f64 - w[0] as f64).abs() > self.edge_threshold)
            .count()
    }

    /// Contours: rising crossings of the mean
    ///
    /// Two-state machine: a contour opens when a sample rises above the
    /// mean while not inside one, and closes when a sample falls back to
    /// or below the mean.
    fn count_contours(&self, samples: &SampleSet, mean: f64) -> usize {
        let mut contours = 0;
        let mut in_contour = false;

        for &sample in samples.as_slice() {
            if (sample as f64) > mean {
                if !in_contour {
                    contours += 1;
                    in_contour = true;
                }
            } else {
                in_contour = false;
            }
        }

        contours
    }

    /// Compound content-detection predicate
    ///
    /// All three signals must clear their thresholds; failing any one
    /// routes the whole pipeline to the zero-result path.
    pub fn content_detected(&self, summary: &StatisticalSummary, counts: &ContourCounts) -> bool {
        summary.variance > self.variance_threshold
            && summary.std_dev > self.std_dev_threshold
            && counts.edges > self.edge_count_threshold
    }

    /// Derive a bounded cell count from edge and contour counts
    ///
    /// Only meaningful when the content gate passed; clamped so the
    /// result never leaves the configured realistic range.
    pub fn cell_count(&self, counts: &ContourCounts) -> i64 {
        let raw = (counts.edges as i64 * counts.contours as i64) / 10;
        raw.clamp(self.min_cell_count, self.max_cell_count)
    }
}
