use thiserror::Error;

use crate::slot::SlotState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("slot ordinal {0} is outside 1..=10")]
    InvalidOrdinal(u8),
    #[error("a reference bundle holds at most {max} extra assets")]
    TooManyExtras { max: usize },
    #[error("slot {ordinal} cannot move from {from:?} to {to:?}")]
    InvalidSlotTransition {
        ordinal: u8,
        from: SlotState,
        to: SlotState,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
