use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use mv_core::{ProvenanceRecord, SLOT_COUNT, SlotOrdinal};
use tokio::time;

use crate::generator::ArtifactGenerator;
use crate::job::{Gate, JobShared};
use crate::provenance::ProvenanceStore;

/// Upper bound on how long a paused worker sleeps before re-checking status
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Drives a contiguous range of slots, one at a time, in ascending order
pub(crate) struct Worker {
    id: usize,
    ordinals: Vec<SlotOrdinal>,
    shared: Arc<JobShared>,
    generator: Arc<dyn ArtifactGenerator>,
    provenance: Arc<ProvenanceStore>,
}

impl Worker {
    pub fn new(
        id: usize,
        ordinals: Vec<SlotOrdinal>,
        shared: Arc<JobShared>,
        generator: Arc<dyn ArtifactGenerator>,
        provenance: Arc<ProvenanceStore>,
    ) -> Self {
        Self {
            id,
            ordinals,
            shared,
            generator,
            provenance,
        }
    }

    pub async fn run(self) {
        debug!("Worker {} owns slots {:?}", self.id, self.ordinals);

        for &ordinal in &self.ordinals {
            match self.acquire(ordinal).await {
                Gate::Started => self.execute(ordinal).await,
                Gate::Skip => continue,
                Gate::Halt | Gate::Wait => {
                    info!("Worker {} stopping before slot {}", self.id, ordinal);
                    break;
                }
            }
        }

        debug!("Worker {} exited", self.id);
    }

    /// Wait out a pause, then either begin `ordinal` or report a halt.
    /// Never returns `Gate::Wait`.
    async fn acquire(&self, ordinal: SlotOrdinal) -> Gate {
        let mut status = self.shared.subscribe_status();
        loop {
            match self.shared.try_begin(ordinal) {
                Gate::Wait => {
                    // Woken early by resume/stop, otherwise re-check after one interval
                    if let Ok(Err(_)) = time::timeout(PAUSE_POLL_INTERVAL, status.changed()).await {
                        return Gate::Halt;
                    }
                }
                gate => return gate,
            }
        }
    }

    async fn execute(&self, ordinal: SlotOrdinal) {
        let prompt = self.shared.prompt_for(ordinal);
        let references = self.shared.bundle.urls();
        info!("Generating slot {} ({})", ordinal, ordinal.angle());

        match self.generator.generate(prompt, &references).await {
            Ok(asset) => {
                let completed = self.shared.finish_slot(ordinal, Ok(asset.clone()));
                info!("Slot {} done: {} ({}/{})", ordinal, asset, completed, SLOT_COUNT);

                let record = ProvenanceRecord::new(
                    self.shared.owner.clone(),
                    self.shared.project_id.clone(),
                    ordinal,
                    prompt,
                    references,
                    &asset,
                );
                match self.provenance.record(record).await {
                    Ok(tier) => debug!("Slot {} provenance stored ({:?})", ordinal, tier),
                    Err(e) => error!("Slot {} provenance lost: {}", ordinal, e),
                }
            }
            Err(e) => {
                warn!("Slot {} failed: {}", ordinal, e);
                let completed = self.shared.finish_slot(ordinal, Err(e.to_string()));
                debug!(
                    "Worker {} continuing after failure ({}/{})",
                    self.id, completed, SLOT_COUNT
                );
            }
        }
    }
}
