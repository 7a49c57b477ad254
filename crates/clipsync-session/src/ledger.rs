//! Persisted list of recently ended sessions.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use clipsync_core::{RecentSessionEntry, sample, traits::KeyValueStore};

/// Storage slot holding the serialized ledger.
pub const LEDGER_KEY: &str = "clipsync_recent";

/// Maximum number of remembered sessions.
pub const LEDGER_CAPACITY: usize = 10;

/// Newest-first ledger of ended sessions, capped at [`LEDGER_CAPACITY`].
///
/// Every storage failure is logged and swallowed: unreadable data loads as an
/// empty ledger and a failed write leaves the in-memory copy authoritative.
///
/// Sample mode only changes what [`displayed`](Self::displayed) returns; the
/// real entries keep being recorded and persisted underneath.
pub struct RecentSessionsLedger {
    store: Arc<dyn KeyValueStore>,
    entries: Mutex<Vec<RecentSessionEntry>>,
    writer: tokio::sync::Mutex<()>,
    sample_mode: AtomicBool,
}

impl RecentSessionsLedger {
    /// Create an empty ledger over `store`. Call [`load`](Self::load) to read
    /// persisted entries.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            entries: Mutex::new(Vec::new()),
            writer: tokio::sync::Mutex::new(()),
            sample_mode: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecentSessionEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reload the persisted entries. Absent or malformed data yields an empty list.
    pub async fn load(&self) -> Vec<RecentSessionEntry> {
        let loaded = match self.store.get(LEDGER_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<RecentSessionEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(LEDGER_CAPACITY);
                    entries
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed recent sessions: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read recent sessions: {e}");
                Vec::new()
            }
        };
        self.lock().clone_from(&loaded);
        loaded
    }

    /// Prepend `entry`, evict beyond capacity, persist.
    pub async fn record(&self, entry: RecentSessionEntry) {
        let _writer = self.writer.lock().await;
        let updated = {
            let mut entries = self.lock();
            entries.insert(0, entry);
            entries.truncate(LEDGER_CAPACITY);
            entries.clone()
        };
        self.persist(&updated).await;
    }

    /// Forget every entry and remove the persisted slot.
    pub async fn clear(&self) {
        let _writer = self.writer.lock().await;
        self.lock().clear();
        if let Err(e) = self.store.remove(LEDGER_KEY).await {
            tracing::warn!("Failed to clear recent sessions: {e}");
        }
    }

    /// Real entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<RecentSessionEntry> {
        self.lock().clone()
    }

    /// Entries to show: the fixed sample set in sample mode, otherwise the real ones.
    #[must_use]
    pub fn displayed(&self) -> Vec<RecentSessionEntry> {
        if self.sample_mode() {
            sample::sample_recent_sessions()
        } else {
            self.entries()
        }
    }

    pub fn set_sample_mode(&self, enabled: bool) {
        self.sample_mode.store(enabled, Ordering::Relaxed);
    }

    #[must_use]
    pub fn sample_mode(&self) -> bool {
        self.sample_mode.load(Ordering::Relaxed)
    }

    async fn persist(&self, entries: &[RecentSessionEntry]) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize recent sessions: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(LEDGER_KEY, &raw).await {
            tracing::warn!("Failed to persist recent sessions: {e}");
        }
    }
}
