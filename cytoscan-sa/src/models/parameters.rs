//! Analysis pipeline tuning parameters
//!
//! Every threshold of the heuristic pipeline lives here so it can be
//! constructor-injected, persisted, and tuned independently. Nothing in
//! the services reads ambient/global configuration.

use serde::{Deserialize, Serialize};

/// Tuning parameters for the heuristic analysis pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    /// Maximum number of bytes sampled from an upload (default: 5000)
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,

    /// Gradient magnitude above which an adjacent triple counts as an edge (default: 15.0)
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,

    /// Variance gate for content detection (default: 150.0)
    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f64,

    /// Standard deviation gate for content detection (default: 10.0)
    #[serde(default = "default_std_dev_threshold")]
    pub std_dev_threshold: f64,

    /// Minimum edge count for content detection (default: 5)
    #[serde(default = "default_edge_count_threshold")]
    pub edge_count_threshold: usize,

    /// Lower clamp on the derived cell count when content is detected (default: 1)
    #[serde(default = "default_min_cell_count")]
    pub min_cell_count: i64,

    /// Upper clamp on the derived cell count (default: 500)
    #[serde(default = "default_max_cell_count")]
    pub max_cell_count: i64,

    /// Average-delta boundary between the mid and hyperactive movement tiers (default: 20.0)
    #[serde(default = "default_high_motion_tier")]
    pub high_motion_tier: f64,

    /// Average-delta boundary between the static and mid movement tiers (default: 10.0)
    #[serde(default = "default_mid_motion_tier")]
    pub mid_motion_tier: f64,

    /// Adjacent-delta magnitude that counts toward sharpness (default: 10.0)
    #[serde(default = "default_jump_threshold")]
    pub jump_threshold: f64,

    /// Weight of sharpness in the quality score (default: 0.6)
    #[serde(default = "default_sharpness_weight")]
    pub sharpness_weight: f64,

    /// Weight of the file-size proxy in the quality score (default: 0.4)
    #[serde(default = "default_size_weight")]
    pub size_weight: f64,

    /// Lower clamp of the displayed quality score (default: 60.0)
    #[serde(default = "default_quality_floor")]
    pub quality_floor: f64,

    /// Upper clamp of the displayed quality score (default: 98.0)
    #[serde(default = "default_quality_ceiling")]
    pub quality_ceiling: f64,

    /// Seed for the optional display jitter component
    ///
    /// None (the default) disables jitter entirely; the core math is
    /// deterministic either way.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
}

// Default value functions

fn default_sample_cap() -> usize {
    5000
}

fn default_edge_threshold() -> f64 {
    15.0
}

fn default_variance_threshold() -> f64 {
    150.0
}

fn default_std_dev_threshold() -> f64 {
    10.0
}

fn default_edge_count_threshold() -> usize {
    5
}

fn default_min_cell_count() -> i64 {
    1
}

fn default_max_cell_count() -> i64 {
    500
}

fn default_high_motion_tier() -> f64 {
    20.0
}

fn default_mid_motion_tier() -> f64 {
    10.0
}

fn default_jump_threshold() -> f64 {
    10.0
}

fn default_sharpness_weight() -> f64 {
    0.6
}

fn default_size_weight() -> f64 {
    0.4
}

fn default_quality_floor() -> f64 {
    60.0
}

fn default_quality_ceiling() -> f64 {
    98.0
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            sample_cap: default_sample_cap(),
            edge_threshold: default_edge_threshold(),
            variance_threshold: default_variance_threshold(),
            std_dev_threshold: default_std_dev_threshold(),
            edge_count_threshold: default_edge_count_threshold(),
            min_cell_count: default_min_cell_count(),
            max_cell_count: default_max_cell_count(),
            high_motion_tier: default_high_motion_tier(),
            mid_motion_tier: default_mid_motion_tier(),
            jump_threshold: default_jump_threshold(),
            sharpness_weight: default_sharpness_weight(),
            size_weight: default_size_weight(),
            quality_floor: default_quality_floor(),
            quality_ceiling: default_quality_ceiling(),
            jitter_seed: None,
        }
    }
}

impl AnalysisParameters {
    /// Validate parameter ranges
    ///
    /// # Errors
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_cap == 0 {
            return Err("sample_cap must be > 0".to_string());
        }
        if self.edge_threshold < 0.0 {
            return Err("edge_threshold must be >= 0".to_string());
        }
        if self.variance_threshold < 0.0 {
            return Err("variance_threshold must be >= 0".to_string());
        }
        if self.std_dev_threshold < 0.0 {
            return Err("std_dev_threshold must be >= 0".to_string());
        }
        if self.min_cell_count < 0 || self.max_cell_count < self.min_cell_count {
            return Err("cell count clamp range is inverted".to_string());
        }
        if self.mid_motion_tier < 0.0 || self.high_motion_tier <= self.mid_motion_tier {
            return Err("motion tiers must satisfy 0 <= mid < high".to_string());
        }
        if self.jump_threshold < 0.0 {
            return Err("jump_threshold must be >= 0".to_string());
        }
        if self.sharpness_weight < 0.0 || self.size_weight < 0.0 {
            return Err("quality weights must be >= 0".to_string());
        }
        if self.quality_floor >= self.quality_ceiling {
            return Err("quality clamp range is inverted".to_string());
        }
        Ok(())
    }
}
