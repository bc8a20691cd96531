//! Two-tier provenance persistence.
//!
//! Records for a known owner go to the durable primary sink. Guest records,
//! and any record the primary refuses, land in the bounded in-process log.

use std::sync::Arc;

use log::{debug, warn};
use mv_core::{ProvenanceRecord, StorageTier};

use crate::error::ProvenanceError;

pub mod local;
pub mod remote;

pub use local::{FALLBACK_CAPACITY, FallbackLog};
pub use remote::{HttpProvenanceSink, ProvenanceSink};

pub struct ProvenanceStore {
    primary: Option<Arc<dyn ProvenanceSink>>,
    fallback: FallbackLog,
}

impl ProvenanceStore {
    pub fn new(primary: Option<Arc<dyn ProvenanceSink>>) -> Self {
        Self {
            primary,
            fallback: FallbackLog::new(),
        }
    }

    /// Store that only ever writes to the local log
    pub fn local_only() -> Self {
        Self::new(None)
    }

    /// Persist one record, reporting which tier accepted it
    pub async fn record(&self, record: ProvenanceRecord) -> Result<StorageTier, ProvenanceError> {
        let primary_error = match &self.primary {
            Some(_) if record.owner.is_guest() => "guest owner".to_string(),
            Some(sink) => match sink.append(&record.owner, &record).await {
                Ok(()) => {
                    debug!(
                        "Provenance for {} slot {} stored in primary tier",
                        record.project_id, record.slot
                    );
                    return Ok(StorageTier::Primary);
                }
                Err(e) => {
                    warn!(
                        "Primary provenance write failed for {} slot {}, using local log: {}",
                        record.project_id, record.slot, e
                    );
                    e.to_string()
                }
            },
            None => "no primary store configured".to_string(),
        };

        self.fallback
            .push(record)
            .map(|()| StorageTier::Fallback)
            .map_err(|fallback| ProvenanceError {
                primary: primary_error,
                fallback,
            })
    }

    /// Local log entries, newest first
    pub fn fallback_history(&self) -> Vec<ProvenanceRecord> {
        self.fallback.recent()
    }

    #[cfg(test)]
    pub(crate) fn poison_fallback(&self) {
        self.fallback.poison();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use mv_core::{AssetRef, OwnerKey, SlotOrdinal};

    use super::*;
    use crate::error::AppError;

    #[derive(Default)]
    struct CountingSink {
        fail: bool,
        appended: AtomicUsize,
    }

    #[async_trait]
    impl ProvenanceSink for CountingSink {
        async fn append(&self, _owner: &OwnerKey, _record: &ProvenanceRecord) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::BackendError("HTTP 503: unavailable".into()));
            }
            self.appended.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn record(owner: OwnerKey, n: u8) -> ProvenanceRecord {
        ProvenanceRecord::new(
            owner,
            "proj",
            SlotOrdinal::new(n).unwrap(),
            "cat",
            vec![],
            &AssetRef::new("https://cdn/out.png"),
        )
    }

    #[tokio::test]
    async fn test_owner_with_working_primary() {
        let sink = Arc::new(CountingSink::default());
        let store = ProvenanceStore::new(Some(sink.clone() as Arc<dyn ProvenanceSink>));

        let tier = store.record(record(OwnerKey::parse("0xabc"), 1)).await.unwrap();

        assert_eq!(tier, StorageTier::Primary);
        assert_eq!(sink.appended.load(Ordering::SeqCst), 1);
        assert_eq!(store.fallback_history().len(), 0);
    }

    #[tokio::test]
    async fn test_guest_skips_primary() {
        let sink = Arc::new(CountingSink::default());
        let store = ProvenanceStore::new(Some(sink.clone() as Arc<dyn ProvenanceSink>));

        let tier = store.record(record(OwnerKey::Guest, 1)).await.unwrap();

        assert_eq!(tier, StorageTier::Fallback);
        assert_eq!(sink.appended.load(Ordering::SeqCst), 0);
        assert_eq!(store.fallback_history().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_primary_falls_back_and_stays_bounded() {
        let sink: Arc<dyn ProvenanceSink> = Arc::new(CountingSink {
            fail: true,
            ..Default::default()
        });
        let store = ProvenanceStore::new(Some(sink));

        for i in 0..120u32 {
            let n = (i % 10) as u8 + 1;
            let tier = store.record(record(OwnerKey::parse("0xabc"), n)).await.unwrap();
            assert_eq!(tier, StorageTier::Fallback);
            assert_eq!(store.fallback_history().len(), (i as usize + 1).min(FALLBACK_CAPACITY));
        }
    }

    #[tokio::test]
    async fn test_local_only_store() {
        let store = ProvenanceStore::local_only();
        let tier = store.record(record(OwnerKey::parse("0xabc"), 3)).await.unwrap();
        assert_eq!(tier, StorageTier::Fallback);
        assert_eq!(store.fallback_history()[0].slot, SlotOrdinal::new(3).unwrap());
    }

    #[tokio::test]
    async fn test_both_tiers_down() {
        let sink: Arc<dyn ProvenanceSink> = Arc::new(CountingSink {
            fail: true,
            ..Default::default()
        });
        let store = ProvenanceStore::new(Some(sink));
        store.poison_fallback();

        let err = store
            .record(record(OwnerKey::parse("0xabc"), 1))
            .await
            .unwrap_err();

        assert!(err.primary.contains("HTTP 503"));
        assert_eq!(err.fallback, "fallback log poisoned");
        assert!(store.fallback_history().is_empty());
    }
}
