use mv_core::{AssetRef, JobStatus, SlotOrdinal};
use serde::Serialize;

/// Live progress notifications published by a running job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    StatusChanged {
        project_id: String,
        status: JobStatus,
    },
    SlotStarted {
        project_id: String,
        ordinal: SlotOrdinal,
    },
    SlotCompleted {
        project_id: String,
        ordinal: SlotOrdinal,
        asset: AssetRef,
        completed: usize,
    },
    SlotErrored {
        project_id: String,
        ordinal: SlotOrdinal,
        error: String,
        completed: usize,
    },
}

impl JobEvent {
    /// Completion count carried by slot-finish events
    pub fn completed(&self) -> Option<usize> {
        match self {
            Self::SlotCompleted { completed, .. } | Self::SlotErrored { completed, .. } => {
                Some(*completed)
            }
            _ => None,
        }
    }
}
