//! Analysis orchestrator
//!
//! Sequences the heuristic pipeline over one uploaded buffer and
//! assembles the final metrics.
//!
//! # State Progression
//! Received → Sampled → ContentGateEvaluated → {ZeroResult | PopulatedResult} → Finalized
//!
//! Each invocation is a self-contained synchronous computation: no
//! shared state, no I/O, no retained buffers. Malformed or empty input
//! degrades to the zero-result path; it is never a failure.

use crate::models::{
    AnalysisParameters, AnalysisStatus, MediaKind, MorphologyBreakdown, MovementPattern,
};
use crate::services::byte_sampler::ByteSampler;
use crate::services::contour_detector::ContourDetector;
use crate::services::morphology_estimator::MorphologyEstimator;
use crate::services::motion_classifier::MotionClassifier;
use crate::services::quality_assessor::QualityAssessor;
use crate::services::result_jitter::ResultJitter;
use crate::services::signal_stats::StatisticalSummary;

/// One uploaded media payload, consumed by a single analysis pass
#[derive(Debug)]
pub struct UploadedMedia {
    pub bytes: Vec<u8>,
    pub kind: MediaKind,
    pub filename: String,
}

/// States of one analysis pass, for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisState {
    Received,
    Sampled,
    ContentGateEvaluated,
    ZeroResult,
    PopulatedResult,
    Finalized,
}

/// Core output of one analysis pass
///
/// Immutable after creation; the caller attaches identity and storage
/// metadata and hands the combined record to the result store.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub cell_count: i64,
    pub average_speed: f64,
    pub motility_percent: f64,
    pub concentration: f64,
    pub total_motile_count: i64,
    pub morphology: MorphologyBreakdown,
    pub movement_pattern: MovementPattern,
    pub quality_score: f64,
    pub processing_time_seconds: i64,
    pub status: AnalysisStatus,
}

// Derived-metric constants of the populated path
const MOTILITY_VARIANCE_DIVISOR: f64 = 20.0;
const MOTILITY_STD_DEV_DIVISOR: f64 = 5.0;
const VIDEO_SPEED_DIVISOR: f64 = 15.0;
const IMAGE_SPEED_FACTOR: f64 = 0.3;
const CONCENTRATION_SCALE: f64 = 1024.0 * 1024.0 * 10.0;

// Display jitter amplitude in percentage points (only used when a
// jitter seed is configured)
const JITTER_AMPLITUDE: f64 = 2.0;

/// Analysis orchestrator
pub struct AnalysisOrchestrator {
    params: AnalysisParameters,
    sampler: ByteSampler,
    contour_detector: ContourDetector,
    motion_classifier: MotionClassifier,
    quality_assessor: QualityAssessor,
    morphology_estimator: MorphologyEstimator,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator with explicit parameters
    ///
    /// All thresholds come from the parameter struct; the orchestrator
    /// reads no ambient configuration.
    pub fn new(params: AnalysisParameters) -> Self {
        let sampler = ByteSampler::new(params.sample_cap);
        let contour_detector = ContourDetector::new(&params);
        let motion_classifier =
            MotionClassifier::new(params.high_motion_tier, params.mid_motion_tier);
        let quality_assessor = QualityAssessor::new(
            params.jump_threshold,
            params.sharpness_weight,
            params.size_weight,
            params.quality_floor,
            params.quality_ceiling,
        );

        Self {
            params,
            sampler,
            contour_detector,
            motion_classifier,
            quality_assessor,
            morphology_estimator: MorphologyEstimator::new(),
        }
    }

    /// Run one full analysis pass over an uploaded buffer
    pub fn analyze(&self, media: &UploadedMedia) -> AnalysisOutcome {
        let mut state = AnalysisState::Received;
        let byte_length = media.bytes.len() as u64;

        tracing::debug!(
            filename = %media.filename,
            kind = media.kind.as_str(),
            byte_length,
            ?state,
            "Analysis pass started"
        );

        // Received → Sampled
        let samples = self.sampler.sample(&media.bytes);
        state = AnalysisState::Sampled;
        tracing::debug!(samples = samples.len(), stride = samples.stride(), ?state, "Sampling complete");

        // Sampled → ContentGateEvaluated
        let summary = StatisticalSummary::from_samples(&samples);
        let counts = self.contour_detector.detect(&samples, &summary);
        let detected = self.contour_detector.content_detected(&summary, &counts);
        state = AnalysisState::ContentGateEvaluated;
        tracing::debug!(
            variance = summary.variance,
            std_dev = summary.std_dev,
            edges = counts.edges,
            contours = counts.contours,
            detected,
            ?state,
            "Content gate evaluated"
        );

        // Quality is independent of content detection; computed on both paths
        let quality_score = round_to(self.quality_assessor.assess(&samples, byte_length), 1);

        let outcome = if detected {
            state = AnalysisState::PopulatedResult;

            let cell_count = self.contour_detector.cell_count(&counts);
            let mut motility = (summary.variance / MOTILITY_VARIANCE_DIVISOR
                + summary.std_dev / MOTILITY_STD_DEV_DIVISOR)
                .clamp(0.0, 100.0);
            let mut average_speed = match media.kind {
                MediaKind::Video => summary.variance.sqrt() / VIDEO_SPEED_DIVISOR,
                // For images, estimate potential speed from motility
                MediaKind::Image => motility * IMAGE_SPEED_FACTOR,
            };

            // Optional display jitter; clamps are re-applied below so
            // field invariants survive it
            if let Some(seed) = self.params.jitter_seed {
                let mut jitter = ResultJitter::from_seed(seed);
                motility = jitter.perturb(motility, JITTER_AMPLITUDE).clamp(0.0, 100.0);
                average_speed = jitter.perturb(average_speed, JITTER_AMPLITUDE).max(0.0);
            }

            let concentration =
                (cell_count as f64 * byte_length as f64) / CONCENTRATION_SCALE;
            let total_motile_count = (cell_count as f64 * motility / 100.0).floor() as i64;
            let mean_abs_delta = samples.mean_abs_delta();

            AnalysisOutcome {
                cell_count,
                average_speed: round_to(average_speed.max(0.0), 2),
                motility_percent: round_to(motility, 1),
                concentration: round_to(concentration.max(0.0), 1),
                total_motile_count,
                morphology: self.morphology_estimator.estimate(mean_abs_delta),
                movement_pattern: self.movement_pattern(mean_abs_delta, media.kind),
                quality_score,
                processing_time_seconds: processing_time_proxy(byte_length),
                status: AnalysisStatus::Completed,
            }
        } else {
            state = AnalysisState::ZeroResult;

            AnalysisOutcome {
                cell_count: 0,
                average_speed: 0.0,
                motility_percent: 0.0,
                concentration: 0.0,
                total_motile_count: 0,
                morphology: MorphologyBreakdown::zeroed(),
                movement_pattern: MovementPattern::all_static(self.note_for(media.kind)),
                quality_score,
                processing_time_seconds: processing_time_proxy(byte_length),
                status: AnalysisStatus::NoContentDetected,
            }
        };

        tracing::debug!(?state, "Result path selected");

        state = AnalysisState::Finalized;
        tracing::debug!(
            cell_count = outcome.cell_count,
            status = outcome.status.as_str(),
            quality = outcome.quality_score,
            ?state,
            "Analysis pass finished"
        );

        outcome
    }

    /// Classify movement and attach the method note
    fn movement_pattern(&self, mean_abs_delta: f64, kind: MediaKind) -> MovementPattern {
        let p = self.motion_classifier.classify(mean_abs_delta);
        MovementPattern {
            linear: p.linear,
            circular: p.circular,
            static_: p.static_,
            hyperactive: p.hyperactive,
            analysis_note: self.note_for(kind).to_string(),
        }
    }

    /// Honest description of the heuristic method per media kind
    fn note_for(&self, kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Video => "Byte-signal delta heuristic over the sampled video stream",
            MediaKind::Image => "Byte-signal distribution heuristic over the still image",
        }
    }
}

/// Processing time is a declared proxy of file size, never wall clock
fn processing_time_proxy(byte_length: u64) -> i64 {
    (byte_length as f64 / (1024.0 * 512.0)).max(3.0).floor() as i64
}

/// Round to a fixed number of decimal places for display parity
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
