mod angle;
mod bundle;
pub mod error;
pub mod prompt;
mod provenance;
mod slot;
mod status;

pub use angle::{CameraAngle, SLOT_COUNT, SlotOrdinal};
pub use bundle::{AssetRef, MAX_EXTRAS, ReferenceBundle};
pub use error::{Error, Result};
pub use provenance::{GUEST, OwnerKey, ProvenanceRecord, StorageTier};
pub use slot::{Slot, SlotState};
pub use status::JobStatus;
