//! Grader configuration stored under `.grader/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::path::DEFAULT_PAD_WIDTH;
use crate::core::types::DEFAULT_TOTAL_POINTS;

/// Smallest accepted `feedback.pad_width`.
pub const MIN_PAD_WIDTH: usize = 3;

/// Grader configuration (TOML).
///
/// Edited by hand; missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraderConfig {
    /// Total points for a freshly created or reset session.
    pub default_total_points: f64,

    pub feedback: FeedbackConfig,

    pub export: ExportConfig,

    pub roster: RosterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Zero-padding width of each path component when ordering feedback lines.
    ///
    /// Feedback follows rubric order only while every node has fewer than
    /// `10^pad_width` children.
    pub pad_width: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    /// Emit score and feedback even for students marked as not submitted.
    pub include_unsubmitted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RosterConfig {
    /// Skip the first CSV row on roster import.
    pub has_header: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            pad_width: DEFAULT_PAD_WIDTH,
        }
    }
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            default_total_points: DEFAULT_TOTAL_POINTS,
            feedback: FeedbackConfig::default(),
            export: ExportConfig::default(),
            roster: RosterConfig::default(),
        }
    }
}

impl GraderConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.default_total_points.is_finite() || self.default_total_points < 0.0 {
            return Err(anyhow!("default_total_points must be a non-negative number"));
        }
        if self.feedback.pad_width < MIN_PAD_WIDTH {
            return Err(anyhow!("feedback.pad_width must be at least {MIN_PAD_WIDTH}"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GraderConfig::default()`.
pub fn load_config(path: &Path) -> Result<GraderConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        return Ok(GraderConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GraderConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn write_config(path: &Path, cfg: &GraderConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
