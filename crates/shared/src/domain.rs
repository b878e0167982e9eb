use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Punching,
    Error,
}

impl JobStatus {
    /// Text shown on the status badge.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Punching => "Punching",
            Self::Error => "Unable to get status",
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Punching
    }
}

/// Identifies one observable field of [`JobState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobField {
    Status,
    Filename,
    Progress,
}

impl JobField {
    pub const ALL: [JobField; 3] = [JobField::Status, JobField::Filename, JobField::Progress];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Filename => "filename",
            Self::Progress => "progress",
        }
    }
}

/// Last known state of the remote job as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobState {
    pub status: JobStatus,
    pub filename: Option<String>,
    /// Percentage, 0..=100.
    pub progress: u8,
}
