use serde::{Deserialize, Serialize};

use crate::angle::{CameraAngle, SlotOrdinal};
use crate::bundle::AssetRef;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotState {
    Pending,
    InProgress,
    Completed,
    Errored,
}

impl SlotState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

/// One of the ten output positions of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub ordinal: SlotOrdinal,
    pub angle: CameraAngle,
    pub state: SlotState,
    pub result: Option<AssetRef>,
    pub error: Option<String>,
}

impl Slot {
    pub fn new(ordinal: SlotOrdinal) -> Self {
        Self {
            ordinal,
            angle: ordinal.angle(),
            state: SlotState::Pending,
            result: None,
            error: None,
        }
    }

    /// Pending -> InProgress
    pub fn begin(&mut self) -> Result<()> {
        self.transition(SlotState::Pending, SlotState::InProgress)
    }

    /// InProgress -> Completed, keeping the produced asset
    pub fn complete(&mut self, asset: AssetRef) -> Result<()> {
        self.transition(SlotState::InProgress, SlotState::Completed)?;
        self.result = Some(asset);
        Ok(())
    }

    /// InProgress -> Errored
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(SlotState::InProgress, SlotState::Errored)?;
        self.error = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, expected: SlotState, to: SlotState) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidSlotTransition {
                ordinal: self.ordinal.get(),
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
