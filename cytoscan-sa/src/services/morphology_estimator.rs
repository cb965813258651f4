//! Shape-category estimation from the byte-delta signal
//!
//! Derives normal/abnormal shape percentages from the mean absolute
//! successive delta. Values are quantized to whole percent with the
//! remainder assigned to the midpiece category, so the four always sum
//! to exactly 100.

use crate::models::MorphologyBreakdown;

/// Morphology estimator
///
/// Pure function of the delta signal; the category formulas are fixed
/// shape heuristics, not tunable gates.
pub struct MorphologyEstimator;

impl MorphologyEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate shape-category percentages from the mean absolute delta
    pub fn estimate(&self, mean_abs_delta: f64) -> MorphologyBreakdown {
        let normal = (85.0 - mean_abs_delta / 5.0).max(60.0).round();
        let abnormal_head = (mean_abs_delta / 8.0).min(20.0).round();
        let abnormal_tail = (mean_abs_delta / 10.0).min(15.0).round();

        // The three categories above never reach 100 combined, so the
        // midpiece remainder is always non-negative
        let abnormal_midpiece = 100.0 - normal - abnormal_head - abnormal_tail;

        MorphologyBreakdown {
            normal,
            abnormal_head,
            abnormal_tail,
            abnormal_midpiece,
        }
    }
}

impl Default for MorphologyEstimator {
    fn default() -> Self {
        Self::new()
    }
}
