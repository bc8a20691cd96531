pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod job;
pub mod orchestrator;
pub mod provenance;
pub mod server;
mod worker;

pub use config::AppConfig;
pub use error::{AppError, GenerationError, ProvenanceError};
pub use events::JobEvent;
pub use generator::{ArtifactGenerator, HttpGenerator};
pub use job::{GenerationJob, JobSnapshot, JobSummary, WORKER_RANGES};
pub use orchestrator::Orchestrator;
pub use provenance::{FallbackLog, HttpProvenanceSink, ProvenanceSink, ProvenanceStore};
pub use worker::PAUSE_POLL_INTERVAL;
