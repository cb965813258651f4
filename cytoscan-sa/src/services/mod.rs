//! Heuristic analysis services
//!
//! Leaf components of the pipeline plus the orchestrator that sequences
//! them. All components are pure functions of their inputs; thresholds
//! arrive through `AnalysisParameters`.

pub mod analysis_orchestrator;
pub mod byte_sampler;
pub mod contour_detector;
pub mod morphology_estimator;
pub mod motion_classifier;
pub mod quality_assessor;
pub mod result_jitter;
pub mod signal_stats;

pub use analysis_orchestrator::{AnalysisOrchestrator, AnalysisOutcome, UploadedMedia};
pub use byte_sampler::{ByteSampler, SampleSet};
pub use contour_detector::{ContourCounts, ContourDetector};
pub use morphology_estimator::MorphologyEstimator;
pub use motion_classifier::{MotionClassifier, MotionProportions};
pub use quality_assessor::QualityAssessor;
pub use result_jitter::ResultJitter;
pub use signal_stats::StatisticalSummary;
