//! Session controller: lifecycle, shared items and timers.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use chrono::Local;
use clipsync_assistant::{HistorySidebar, SmartActionPanel};
use clipsync_core::{
    FileMeta, ItemStore, RecentSessionEntry, SenderSide, Session, SessionCodeGenerator,
    TransferItem,
    code::normalize_code,
    format::{format_elapsed, format_ledger_date},
    sample,
};
use serde::Serialize;
use tokio::{sync::broadcast, task::JoinHandle, time::Instant};

use crate::{config::DEFAULT_DEVICE_NAME, ledger::RecentSessionsLedger};

/// Delay before the simulated peer acknowledges a join.
pub const JOIN_ACK_DELAY: Duration = Duration::from_millis(1500);

/// Content of the simulated peer acknowledgment.
pub const JOIN_ACK_MESSAGE: &str = "Connected! Ready to share.";

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Change notification for views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session became active with this code.
    Started { code: String },
    /// An item was prepended.
    ItemAdded { id: String },
    /// Elapsed time changed.
    Tick { elapsed: String },
    /// The session ended; carries the recorded ledger entry.
    Ended { entry: RecentSessionEntry },
    SampleModeChanged { enabled: bool },
    /// The recent-sessions ledger changed.
    HistoryChanged,
}

/// Consistent view of the controller, taken under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub items: Vec<TransferItem>,
    pub elapsed: String,
    pub sample_mode: bool,
    /// Code currently offered for pairing (QR/code display), if shown.
    pub pairing_code: Option<String>,
    pub recent_sessions: Vec<RecentSessionEntry>,
}

/// Aborts the wrapped task when dropped.
struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct ActiveSession {
    session: Session,
    started: Instant,
    /// Distinguishes this session from later ones for delayed tasks.
    epoch: u64,
    items: ItemStore,
    elapsed: String,
    _ticker: TaskGuard,
    _join_ack: Option<TaskGuard>,
}

#[derive(Default)]
struct ControllerState {
    active: Option<ActiveSession>,
    sample_mode: bool,
    pairing_code: Option<String>,
    next_epoch: u64,
}

/// Panels reset when a session ends.
#[derive(Clone)]
pub struct Panels {
    pub smart: Arc<SmartActionPanel>,
    pub sidebar: Arc<HistorySidebar>,
}

struct Shared {
    state: Mutex<ControllerState>,
    ledger: Arc<RecentSessionsLedger>,
    events: broadcast::Sender<SessionEvent>,
    generator: SessionCodeGenerator,
    device_name: String,
    panels: Option<Panels>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event); // no listeners is fine
    }
}

/// Orchestrates the idle → active → idle session lifecycle.
///
/// Owns the active session and its item store. Every transition is applied
/// under one lock, so snapshots never observe a half-applied change. The
/// elapsed-time ticker and the join acknowledgment run as tasks owned by the
/// active session and are aborted when it ends or the controller is dropped.
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(ledger: Arc<RecentSessionsLedger>) -> Self {
        Self::with_options(ledger, DEFAULT_DEVICE_NAME, None)
    }

    /// Create an idle controller with a device label and panels to reset on disconnect.
    #[must_use]
    pub fn with_options(
        ledger: Arc<RecentSessionsLedger>,
        device_name: impl Into<String>,
        panels: Option<Panels>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        let sample_mode = ledger.sample_mode();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState {
                    sample_mode,
                    ..ControllerState::default()
                }),
                ledger,
                events,
                generator: SessionCodeGenerator::new(),
                device_name: device_name.into(),
                panels,
            }),
        }
    }

    /// Receiver for change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<RecentSessionsLedger> {
        &self.shared.ledger
    }

    /// Start a new session with a generated code and show it for pairing.
    ///
    /// An already active session is replaced and recorded.
    pub async fn create_session(&self) -> String {
        let code = self.shared.generator.generate();
        self.start(code.clone(), false).await;
        code
    }

    /// Join a session by code. Blank codes are ignored.
    ///
    /// The code is trimmed and uppercased. After [`JOIN_ACK_DELAY`] a remote
    /// acknowledgment item is added, unless the session has ended by then.
    pub async fn join_session(&self, raw_code: &str) -> Option<String> {
        let code = normalize_code(raw_code)?;
        self.start(code.clone(), true).await;
        Some(code)
    }

    /// End the active session and record it in the ledger. No-op when idle.
    pub async fn disconnect(&self) -> Option<RecentSessionEntry> {
        let ended = {
            let mut state = self.shared.lock();
            let ended = state.active.take()?;
            state.pairing_code = None;
            ended
        };
        Some(self.finish(ended).await)
    }

    /// Share text. Blank text is ignored.
    pub fn share_text(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        self.share(TransferItem::text(text, SenderSide::Local))
    }

    /// Share a code snippet. Blank code is ignored.
    pub fn share_code(&self, code: &str, language: &str) -> Option<String> {
        if code.trim().is_empty() {
            return None;
        }
        self.share(TransferItem::code(code, language, SenderSide::Local))
    }

    /// Share file metadata. Zero-byte files are allowed.
    pub fn share_file(&self, meta: FileMeta) -> Option<String> {
        self.share(TransferItem::file(meta, SenderSide::Local))
    }

    /// Toggle sample mode. Turning it on during a session with no items seeds
    /// the sample items; the persisted ledger is never touched.
    pub fn set_sample_mode(&self, enabled: bool) {
        self.shared.ledger.set_sample_mode(enabled);
        {
            let mut state = self.shared.lock();
            state.sample_mode = enabled;
            if enabled {
                if let Some(active) = state.active.as_mut() {
                    if active.items.is_empty() {
                        active.items = ItemStore::seeded(sample::sample_items());
                    }
                }
            }
        }
        self.shared.emit(SessionEvent::SampleModeChanged { enabled });
    }

    /// Hide the pairing code display.
    pub fn dismiss_pairing(&self) {
        self.shared.lock().pairing_code = None;
    }

    /// Forget every recorded session.
    pub async fn clear_history(&self) {
        self.shared.ledger.clear().await;
        self.shared.emit(SessionEvent::HistoryChanged);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.lock().active.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.shared.lock().active.as_ref().map(|a| a.session.clone())
    }

    /// Items of the active session, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<TransferItem> {
        self.shared
            .lock()
            .active
            .as_ref()
            .map(|a| a.items.items())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<TransferItem> {
        self.shared
            .lock()
            .active
            .as_ref()
            .and_then(|a| a.items.get(id).cloned())
    }

    /// Search summary of the active session's items.
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.shared
            .lock()
            .active
            .as_ref()
            .map(|a| a.items.summary())
            .unwrap_or_default()
    }

    /// Elapsed time as last computed by the ticker, `00:00` when idle.
    #[must_use]
    pub fn elapsed(&self) -> String {
        self.shared
            .lock()
            .active
            .as_ref()
            .map_or_else(|| format_elapsed(0), |a| a.elapsed.clone())
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.lock();
        let active = state.active.as_ref();
        SessionSnapshot {
            session: active.map(|a| a.session.clone()),
            items: active.map(|a| a.items.items()).unwrap_or_default(),
            elapsed: active.map_or_else(|| format_elapsed(0), |a| a.elapsed.clone()),
            sample_mode: state.sample_mode,
            pairing_code: state.pairing_code.clone(),
            recent_sessions: self.shared.ledger.displayed(),
        }
    }

    /// Install a new session and record the one it replaces, if any.
    async fn start(&self, code: String, simulate_peer: bool) {
        if let Some(replaced) = self.activate(&code, simulate_peer) {
            self.finish(replaced).await;
        }
        self.shared.emit(SessionEvent::Started { code });
    }

    /// Swap in a new active session under one lock, returning the previous one.
    fn activate(&self, code: &str, simulate_peer: bool) -> Option<ActiveSession> {
        let mut state = self.shared.lock();
        state.next_epoch += 1;
        let epoch = state.next_epoch;

        let items = if state.sample_mode {
            ItemStore::seeded(sample::sample_items())
        } else {
            ItemStore::new()
        };
        let started = Instant::now();
        let weak = Arc::downgrade(&self.shared);

        let ticker = TaskGuard(tokio::spawn(run_ticker(weak.clone(), epoch, started)));
        let join_ack = simulate_peer.then(|| TaskGuard(tokio::spawn(acknowledge_join(weak, epoch))));

        // Only a created session is offered for pairing; a joined one already has a peer.
        state.pairing_code = (!simulate_peer).then(|| code.to_string());
        let replaced = state.active.replace(ActiveSession {
            session: Session::new(code, self.shared.device_name.clone()),
            started,
            epoch,
            items,
            elapsed: format_elapsed(0),
            _ticker: ticker,
            _join_ack: join_ack,
        });
        drop(state);

        tracing::info!(%code, joined = simulate_peer, "Session started");
        replaced
    }

    fn share(&self, item: TransferItem) -> Option<String> {
        let id = item.id.clone();
        {
            let mut state = self.shared.lock();
            let active = state.active.as_mut()?;
            active.items.prepend(item);
        }
        self.shared.emit(SessionEvent::ItemAdded { id: id.clone() });
        Some(id)
    }

    /// Record a session that is no longer active and reset the panels.
    async fn finish(&self, ended: ActiveSession) -> RecentSessionEntry {
        let entry = RecentSessionEntry::new(
            ended.session.code.clone(),
            format_ledger_date(&Local::now()),
            ended.items.len(),
        );
        let elapsed = ended.started.elapsed().as_secs();
        // Dropping the session aborts its ticker and any pending acknowledgment.
        drop(ended);

        if let Some(panels) = &self.shared.panels {
            panels.smart.close();
            panels.sidebar.reset();
        }

        self.shared.ledger.record(entry.clone()).await;
        tracing::info!(code = %entry.code, items = entry.item_count, elapsed_secs = elapsed, "Session ended");
        self.shared.emit(SessionEvent::Ended {
            entry: entry.clone(),
        });
        entry
    }
}

async fn run_ticker(shared: Weak<Shared>, epoch: u64, started: Instant) {
    let mut interval = tokio::time::interval_at(started + TICK_INTERVAL, TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let elapsed = {
            let mut state = shared.lock();
            match state.active.as_mut() {
                Some(active) if active.epoch == epoch => {
                    active.elapsed = format_elapsed(started.elapsed().as_secs());
                    active.elapsed.clone()
                }
                _ => return,
            }
        };
        tracing::trace!(%elapsed, "Session tick");
        shared.emit(SessionEvent::Tick { elapsed });
    }
}

async fn acknowledge_join(shared: Weak<Shared>, epoch: u64) {
    tokio::time::sleep(JOIN_ACK_DELAY).await;
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let item = TransferItem::text(JOIN_ACK_MESSAGE, SenderSide::Remote);
    let id = item.id.clone();
    {
        let mut state = shared.lock();
        match state.active.as_mut() {
            Some(active) if active.epoch == epoch => active.items.prepend(item),
            _ => {
                tracing::debug!("Session ended before join acknowledgment");
                return;
            }
        }
    }
    tracing::debug!("Simulated peer acknowledged join");
    shared.emit(SessionEvent::ItemAdded { id });
}

#[cfg(test)]
mod tests {
    use clipsync_assistant::{Assistant, AssistantOptions, BusyIndicator, StaticGateway};
    use clipsync_core::{
        ItemKind,
        code::{CODE_ALPHABET, CODE_LENGTH},
        traits::{AgentResponse, KeyValueStore, StorageError},
    };

    use super::*;
    use crate::storage::MemoryStore;

    fn controller() -> SessionController {
        SessionController::new(Arc::new(RecentSessionsLedger::new(Arc::new(MemoryStore::new()))))
    }

    #[tokio::test]
    async fn test_create_then_share_orders_newest_first() {
        let controller = controller();
        let code = controller.create_session().await;
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert_eq!(controller.snapshot().pairing_code.as_deref(), Some(code.as_str()));

        controller.share_text("hello");
        controller.share_code("print(1)", "Python");

        let items = controller.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind(), ItemKind::Code);
        assert_eq!(items[0].language(), Some("Python"));
        assert_eq!(items[1].kind(), ItemKind::Text);
        assert!(items.iter().all(|i| i.sender == SenderSide::Local));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let controller = controller();
        assert!(controller.join_session("   \t").await.is_none());
        assert!(!controller.is_active());

        controller.create_session().await;
        assert!(controller.share_text("  \n ").is_none());
        assert!(controller.share_code("   ", "Rust").is_none());
        assert!(controller.items().is_empty());

        assert!(controller.share_file(FileMeta::new("empty.bin", 0)).is_some());
        assert_eq!(controller.items().len(), 1);
    }

    #[tokio::test]
    async fn test_share_while_idle_is_noop() {
        let controller = controller();
        assert!(controller.share_text("hello").is_none());
        assert!(controller.items().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_normalizes_and_acknowledges() {
        let controller = controller();
        let code = controller.join_session("  ab12cd ").await;
        assert_eq!(code.as_deref(), Some("AB12CD"));
        assert_eq!(controller.session().unwrap().code, "AB12CD");
        assert!(controller.items().is_empty());

        tokio::time::sleep(Duration::from_millis(1600)).await;

        let items = controller.items();
        assert_eq!(items[0].content(), JOIN_ACK_MESSAGE);
        assert_eq!(items[0].sender, SenderSide::Remote);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_ack_skipped_after_disconnect() {
        let controller = controller();
        controller.join_session("abc234").await;
        controller.disconnect().await;
        controller.create_session().await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(controller.items().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_formats_elapsed_and_stops_on_disconnect() {
        let controller = controller();
        let mut events = controller.subscribe();
        controller.create_session().await;
        assert_eq!(controller.elapsed(), "00:00");

        tokio::time::sleep(Duration::from_millis(65_500)).await;
        assert_eq!(controller.elapsed(), "01:05");

        controller.disconnect().await;
        assert_eq!(controller.elapsed(), "00:00");

        // Drain, then confirm no further ticks arrive.
        while events.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_records_and_clears() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let ledger = Arc::new(RecentSessionsLedger::new(Arc::clone(&store)));
        let controller = SessionController::new(Arc::clone(&ledger));

        let code = controller.create_session().await;
        controller.share_text("a");
        controller.share_text("b");
        controller.share_file(FileMeta::new("c.txt", 3));

        let entry = controller.disconnect().await.unwrap();
        assert_eq!(entry.item_count, 3);
        assert_eq!(entry.code, code);
        assert!(!controller.is_active());
        assert!(controller.items().is_empty());
        assert!(controller.snapshot().pairing_code.is_none());

        let reloaded = RecentSessionsLedger::new(store).load().await;
        assert_eq!(reloaded.first(), Some(&entry));

        assert!(controller.disconnect().await.is_none());
    }

    #[tokio::test]
    async fn test_starting_again_ends_previous_session() {
        let controller = controller();
        let first = controller.create_session().await;
        controller.share_text("x");
        controller.join_session("zz9zz9").await;

        let recent = controller.ledger().entries();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].code, first);
        assert_eq!(recent[0].item_count, 1);
        assert_eq!(controller.session().unwrap().code, "ZZ9ZZ9");
    }

    /// Store whose writes take a while, widening the window between a
    /// session ending and its entry being persisted.
    struct SlowStore(MemoryStore);

    #[async_trait::async_trait]
    impl KeyValueStore for SlowStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_starts_record_every_session() {
        let store = Arc::new(SlowStore(MemoryStore::new()));
        let controller = SessionController::new(Arc::new(RecentSessionsLedger::new(store)));
        let mut events = controller.subscribe();

        let first = controller.create_session().await;
        let (a, b) = tokio::join!(controller.create_session(), controller.join_session("zz9zz9"));
        let b = b.unwrap();
        let last = controller.disconnect().await.unwrap();

        let mut recorded: Vec<String> = controller
            .ledger()
            .entries()
            .into_iter()
            .map(|entry| entry.code)
            .collect();
        assert_eq!(recorded.len(), 3);
        assert!(!controller.is_active());

        let mut started = vec![first, a, b];
        started.sort();
        recorded.sort();
        assert_eq!(recorded, started);
        assert!(started.contains(&last.code));

        let mut ended = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, SessionEvent::Ended { .. }) {
                ended += 1;
            }
        }
        assert_eq!(ended, 3);
    }

    #[tokio::test]
    async fn test_replacing_session_ends_before_start() {
        let controller = controller();
        let first = controller.create_session().await;
        let mut events = controller.subscribe();
        let second = controller.create_session().await;

        match events.recv().await.unwrap() {
            SessionEvent::Ended { entry } => assert_eq!(entry.code, first),
            other => panic!("expected Ended, got {other:?}"),
        }
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Started { code: second });
    }

    #[tokio::test]
    async fn test_sample_mode_seeds_items() {
        let controller = controller();
        controller.set_sample_mode(true);
        controller.create_session().await;
        assert_eq!(controller.items().len(), 4);
        assert_eq!(controller.snapshot().recent_sessions, sample::sample_recent_sessions());
        controller.disconnect().await;

        controller.set_sample_mode(false);
        controller.create_session().await;
        controller.share_text("mine");
        controller.set_sample_mode(true);
        assert_eq!(controller.items().len(), 1);
    }

    #[tokio::test]
    async fn test_sample_mode_during_empty_session_seeds() {
        let controller = controller();
        controller.create_session().await;
        controller.set_sample_mode(true);
        assert_eq!(controller.items().len(), 4);
    }

    #[tokio::test]
    async fn test_disconnect_resets_panels() {
        let gateway = Arc::new(StaticGateway::always(AgentResponse::failed("boom")));
        let assistant = Arc::new(Assistant::new(
            gateway,
            AssistantOptions::default(),
            BusyIndicator::new(),
        ));
        let panels = Panels {
            smart: Arc::new(SmartActionPanel::new(Arc::clone(&assistant))),
            sidebar: Arc::new(HistorySidebar::new(assistant)),
        };
        let controller = SessionController::with_options(
            Arc::new(RecentSessionsLedger::new(Arc::new(MemoryStore::new()))),
            "Laptop",
            Some(panels.clone()),
        );
        controller.create_session().await;
        assert_eq!(controller.session().unwrap().device_name, "Laptop");

        let id = controller.share_text("note").unwrap();
        panels.smart.open(controller.item(&id).unwrap());
        panels.sidebar.toggle();

        controller.disconnect().await;
        assert!(!panels.smart.snapshot().open);
        assert!(!panels.sidebar.snapshot().open);
    }

    #[tokio::test]
    async fn test_events_follow_lifecycle() {
        let controller = controller();
        let mut events = controller.subscribe();
        let code = controller.create_session().await;
        let id = controller.share_text("hi").unwrap();
        controller.clear_history().await;
        controller.disconnect().await;

        assert_eq!(events.recv().await.unwrap(), SessionEvent::Started { code });
        assert_eq!(events.recv().await.unwrap(), SessionEvent::ItemAdded { id });
        assert_eq!(events.recv().await.unwrap(), SessionEvent::HistoryChanged);
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::Ended { .. }));
    }
}
