//! # Progression Configuration
//!
//! Curriculum shape and recovery thresholds. All fields default, so an empty
//! JSON object is a valid configuration describing six chapters of three
//! sections each.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};

/// Where the linear curriculum ordering comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingSource {
    /// `chapter_count` × `sections_per_chapter` table
    Fixed,
    /// Knowledge ids present in the graph; falls back to the fixed table
    Graph,
}

impl Default for OrderingSource {
    fn default() -> Self {
        OrderingSource::Fixed
    }
}

/// Thresholds of the test-attempt recovery policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Tutor questions before the first smart hint
    pub hint_min_asks: u32,

    /// Hints fire on multiples of this ask count
    pub hint_ask_interval: u32,

    /// Tutor questions before the answer is revealed or a return is forced
    pub answer_min_asks: u32,

    /// Failed submissions required alongside `answer_min_asks`
    pub answer_min_failures: u32,

    /// A jump attempt offers a return every this many failures
    pub return_offer_interval: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            hint_min_asks: 4,
            hint_ask_interval: 2,
            answer_min_asks: 10,
            answer_min_failures: 4,
            return_offer_interval: 4,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumConfig {
    pub chapter_count: u32,
    pub sections_per_chapter: u32,
    pub ordering: OrderingSource,
    pub recovery: RecoveryConfig,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            chapter_count: 6,
            sections_per_chapter: 3,
            ordering: OrderingSource::Fixed,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl CurriculumConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CurriculumConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chapter_count == 0 {
            return Err(ProgressionError::Config("chapter_count must be at least 1".to_string()));
        }
        if self.sections_per_chapter == 0 {
            return Err(ProgressionError::Config(
                "sections_per_chapter must be at least 1".to_string(),
            ));
        }
        let r = &self.recovery;
        let thresholds = [
            ("hint_ask_interval", r.hint_ask_interval),
            ("answer_min_asks", r.answer_min_asks),
            ("return_offer_interval", r.return_offer_interval),
        ];
        if let Some((name, _)) = thresholds.iter().find(|(_, value)| *value == 0) {
            return Err(ProgressionError::Config(format!("recovery.{} must be at least 1", name)));
        }
        if r.hint_min_asks >= r.answer_min_asks {
            return Err(ProgressionError::Config(
                "recovery.hint_min_asks must be below recovery.answer_min_asks".to_string(),
            ));
        }
        Ok(())
    }
}
