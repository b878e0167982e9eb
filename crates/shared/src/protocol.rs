use serde::{Deserialize, Serialize};

use crate::domain::JobStatus;

/// Name the test-mode result is offered under.
pub const TEST_OUTPUT_FILENAME: &str = "puncher.mid";

/// Body of `POST /punch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRequest {
    #[serde(rename = "midiFile")]
    pub midi_file_base64: String,
    pub filename: String,
    pub transpose: i32,
    pub autofit: bool,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Fraction complete, 0.0..=1.0.
    #[serde(default)]
    pub progress: f64,
}

impl ServerStatus {
    pub fn job_status(&self) -> JobStatus {
        if self.active {
            JobStatus::Punching
        } else {
            JobStatus::Idle
        }
    }

    /// Progress scaled to a whole percentage.
    pub fn progress_percent(&self) -> u8 {
        if !self.progress.is_finite() {
            return 0;
        }
        (self.progress * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// File reported for an active job. An active job always yields a name so
    /// that `Punching` never appears without one.
    pub fn active_filename(&self) -> Option<String> {
        if self.active {
            Some(self.file.clone().unwrap_or_default())
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
