//! Analysis result record and supporting types
//!
//! The persisted record shape is the canonical output contract of the
//! analysis pipeline. Field names are stable for persistence; adapters at
//! the boundary normalize to these names rather than growing variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of uploaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Parse from a MIME type string (e.g. "video/mp4")
    ///
    /// Returns None for anything that is neither video nor image;
    /// callers treat that as a hard input error, not a degraded signal.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Storage bucket name for this media kind
    pub fn bucket(&self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Image => "images",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaKind::Video),
            "image" => Ok(MediaKind::Image),
            other => Err(format!("Unsupported media kind: {}", other)),
        }
    }
}

/// Outcome classification of one analysis pass
///
/// "Completed with zero findings" and "request failed" are distinct
/// outcomes; this enum only covers the former family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStatus {
    /// Content gate passed and biological metrics were populated
    #[serde(rename = "completed")]
    Completed,
    /// Content gate failed; all biological fields are zeroed
    #[serde(rename = "no-content-detected")]
    NoContentDetected,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::NoContentDetected => "no-content-detected",
        }
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(AnalysisStatus::Completed),
            "no-content-detected" => Ok(AnalysisStatus::NoContentDetected),
            other => Err(format!("Unknown analysis status: {}", other)),
        }
    }
}

/// Shape-category percentages, always summing to exactly 100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologyBreakdown {
    pub normal: f64,
    pub abnormal_head: f64,
    pub abnormal_tail: f64,
    pub abnormal_midpiece: f64,
}

impl MorphologyBreakdown {
    /// All-zero breakdown for the no-content path
    pub fn zeroed() -> Self {
        Self {
            normal: 0.0,
            abnormal_head: 0.0,
            abnormal_tail: 0.0,
            abnormal_midpiece: 0.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.normal + self.abnormal_head + self.abnormal_tail + self.abnormal_midpiece
    }
}

/// Movement-pattern percentages, always summing to exactly 100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPattern {
    pub linear: f64,
    pub circular: f64,
    #[serde(rename = "static")]
    pub static_: f64,
    pub hyperactive: f64,
    /// Human-readable note on how the pattern was derived
    pub analysis_note: String,
}

impl MovementPattern {
    /// Fully static pattern for the no-content path
    pub fn all_static(note: &str) -> Self {
        Self {
            linear: 0.0,
            circular: 0.0,
            static_: 100.0,
            hyperactive: 0.0,
            analysis_note: note.to_string(),
        }
    }

    pub fn sum(&self) -> f64 {
        self.linear + self.circular + self.static_ + self.hyperactive
    }
}

/// Persisted analysis result record
///
/// Created once per analysis invocation, immutable after creation.
/// Ownership transfers to the result store for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub filename: String,
    pub media_type: MediaKind,
    pub sperm_count: i64,
    pub speed_avg: f64,
    pub motility: f64,
    pub morphology: MorphologyBreakdown,
    pub concentration: f64,
    pub total_motile_count: i64,
    pub processing_time_seconds: i64,
    pub movement_pattern: MovementPattern,
    pub confidence_score: f64,
    pub analysis_status: AnalysisStatus,
    /// Public URL of the stored media, if the media store accepted it
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
