//! Process-wide "assistant is working" indicator.

use std::sync::Arc;

use tokio::sync::watch;

/// Counts in-flight assistant calls. Busy while the count is non-zero.
///
/// Cloning shares the same counter.
#[derive(Debug, Clone)]
pub struct BusyIndicator {
    tx: Arc<watch::Sender<usize>>,
}

impl Default for BusyIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyIndicator {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Mark one call as in flight until the guard is dropped.
    #[must_use]
    pub fn enter(&self) -> BusyGuard {
        self.tx.send_modify(|n| *n += 1);
        BusyGuard {
            tx: Arc::clone(&self.tx),
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        *self.tx.borrow() > 0
    }

    /// Receiver notified whenever the in-flight count changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}

/// Clears its share of the busy state on drop, on every exit path.
#[derive(Debug)]
pub struct BusyGuard {
    tx: Arc<watch::Sender<usize>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.tx.send_modify(|n| *n = n.saturating_sub(1));
    }
}
