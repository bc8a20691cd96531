use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of output slots in every generation job
pub const SLOT_COUNT: usize = 10;

/// Fixed camera framing assigned to each slot, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    WideEstablishing,
    Medium,
    CloseUp,
    ThreeQuarter,
    SideProfile,
    OverTheShoulder,
    LowAngle,
    HighAngle,
    Dutch,
    ExtremeCloseUp,
}

impl CameraAngle {
    const TABLE: [CameraAngle; SLOT_COUNT] = [
        Self::WideEstablishing,
        Self::Medium,
        Self::CloseUp,
        Self::ThreeQuarter,
        Self::SideProfile,
        Self::OverTheShoulder,
        Self::LowAngle,
        Self::HighAngle,
        Self::Dutch,
        Self::ExtremeCloseUp,
    ];

    /// Short name for display
    pub fn name(&self) -> &str {
        match self {
            Self::WideEstablishing => "Wide establishing shot",
            Self::Medium => "Medium shot",
            Self::CloseUp => "Close-up",
            Self::ThreeQuarter => "3/4 angle",
            Self::SideProfile => "Side profile",
            Self::OverTheShoulder => "Over-the-shoulder",
            Self::LowAngle => "Low angle",
            Self::HighAngle => "High angle",
            Self::Dutch => "Dutch angle",
            Self::ExtremeCloseUp => "Extreme close-up",
        }
    }

    /// Cinematographic phrase appended to the slot prompt
    pub fn descriptor(&self) -> &'static str {
        match self {
            Self::WideEstablishing => {
                "wide establishing shot, full scene visible, subject small in frame"
            }
            Self::Medium => "medium shot, subject framed from the waist up, eye level",
            Self::CloseUp => "close-up shot, face and shoulders filling the frame",
            Self::ThreeQuarter => "3/4 angle view, subject turned partially toward the camera",
            Self::SideProfile => "side profile view, subject seen in strict profile",
            Self::OverTheShoulder => {
                "over-the-shoulder shot, looking past the subject into the scene"
            }
            Self::LowAngle => "low angle shot, camera below the subject looking up",
            Self::HighAngle => "high angle shot, camera above the subject looking down",
            Self::Dutch => "dutch angle shot, camera tilted for a dynamic diagonal horizon",
            Self::ExtremeCloseUp => "extreme close-up, a single detail filling the frame",
        }
    }

    /// All angles in slot order
    pub fn all() -> [CameraAngle; SLOT_COUNT] {
        Self::TABLE
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One-based position of a slot within a job. Always in `1..=SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotOrdinal(u8);

impl SlotOrdinal {
    pub const FIRST: SlotOrdinal = SlotOrdinal(1);
    pub const LAST: SlotOrdinal = SlotOrdinal(SLOT_COUNT as u8);

    pub fn new(value: u8) -> Result<Self> {
        if (1..=SLOT_COUNT as u8).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidOrdinal(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into slot arrays
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    pub fn angle(self) -> CameraAngle {
        CameraAngle::TABLE[self.index()]
    }

    /// Every ordinal from `FIRST` to `LAST`
    pub fn all() -> impl Iterator<Item = SlotOrdinal> {
        (1..=SLOT_COUNT as u8).map(SlotOrdinal)
    }

    /// Ordinals in `first..=last`, clamped to the valid range
    pub fn range(first: u8, last: u8) -> impl Iterator<Item = SlotOrdinal> {
        (first.max(1)..=last.min(SLOT_COUNT as u8)).map(SlotOrdinal)
    }
}

impl TryFrom<u8> for SlotOrdinal {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SlotOrdinal> for u8 {
    fn from(ordinal: SlotOrdinal) -> u8 {
        ordinal.0
    }
}

impl fmt::Display for SlotOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
