use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Idle,
    Running,
    Paused,
    Stopping,
    Stopped,
    Completed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(!JobStatus::Idle.is_terminal());
        assert!(!JobStatus::Paused.is_terminal());
        assert!(!JobStatus::Stopping.is_terminal());
        assert!(JobStatus::Stopped.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&JobStatus::Stopping).unwrap(), "\"STOPPING\"");
    }
}
