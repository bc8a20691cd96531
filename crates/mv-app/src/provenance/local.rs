use std::collections::VecDeque;
use std::sync::Mutex;

use mv_core::ProvenanceRecord;

pub const FALLBACK_CAPACITY: usize = 100;

/// In-process bounded log, newest entry first. Oldest entries are evicted
/// once the capacity is reached.
#[derive(Debug)]
pub struct FallbackLog {
    entries: Mutex<VecDeque<ProvenanceRecord>>,
    capacity: usize,
}

impl FallbackLog {
    pub fn new() -> Self {
        Self::with_capacity(FALLBACK_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Fails only when the log is unusable after a panic in another writer
    pub fn push(&self, record: ProvenanceRecord) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "fallback log poisoned".to_string())?;

        entries.push_front(record);
        entries.truncate(self.capacity);
        Ok(())
    }

    pub fn recent(&self) -> Vec<ProvenanceRecord> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    /// Leave the log in the state a panicking writer would
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _entries = self.entries.lock().unwrap();
            panic!("writer panicked while holding the fallback log");
        }));
    }
}

impl Default for FallbackLog {
    fn default() -> Self {
        Self::new()
    }
}
