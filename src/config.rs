//! Stream configuration
//!
//! Selects how a stream reacts to over-reads and over-writes, and whether
//! a logging observer is attached when the stream is built.

use serde::{Deserialize, Serialize};
use std::fs;
use crate::error::Result;

/// How a stream handles requests that exceed the bits available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Clamp silently: missing bits read as zero, excess source bits are ignored.
    #[default]
    Lenient,
    /// Report truncation as an error.
    Strict,
}

/// Per-stream settings, usually loaded from JSON.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub mode: ReadMode,

    /// Attach a `LogObserver` that dumps the stream at trace level.
    #[serde(default)]
    pub trace: bool,
}

impl StreamConfig {
    pub fn lenient() -> Self {
        Self { mode: ReadMode::Lenient, trace: false }
    }

    pub fn strict() -> Self {
        Self { mode: ReadMode::Strict, trace: false }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: StreamConfig = serde_json::from_str(json)?;
        Ok(config)
    }
}
