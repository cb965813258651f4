//! Data models for cytoscan-sa

pub mod analysis;
pub mod parameters;

pub use analysis::{
    AnalysisRecord, AnalysisStatus, MediaKind, MorphologyBreakdown, MovementPattern,
};
pub use parameters::AnalysisParameters;
