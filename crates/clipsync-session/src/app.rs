//! Application state: the controller plus its assistant-backed panels.

use std::sync::Arc;

use clipsync_assistant::{
    Assistant, BusyIndicator, HistorySidebar, HttpAssistantGateway, SmartAction,
    SmartActionPanel,
    panel::{SidebarState, SmartPanelState},
};
use clipsync_core::{
    ItemKind, TransferItem,
    traits::{AssistantGateway, KeyValueStore},
};
use serde::Serialize;

use crate::{
    config::ClipSyncConfig,
    controller::{Panels, SessionController, SessionSnapshot},
    ledger::RecentSessionsLedger,
    storage::FileStore,
};

/// Everything a view renders, taken in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    #[serde(flatten)]
    pub session: SessionSnapshot,
    pub smart_panel: SmartPanelState,
    pub sidebar: SidebarState,
    /// Items passing the sidebar's type filter.
    pub sidebar_items: Vec<TransferItem>,
    /// True while any assistant call is queued or in flight.
    pub busy: bool,
}

/// Explicitly owned application state. Nothing here is global; build one per
/// process (or per test).
pub struct App {
    controller: SessionController,
    smart_panel: Arc<SmartActionPanel>,
    sidebar: Arc<HistorySidebar>,
    busy: BusyIndicator,
}

impl App {
    /// Wire the application over the given collaborators and load the ledger.
    pub async fn init(
        config: &ClipSyncConfig,
        store: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn AssistantGateway>,
    ) -> Self {
        let busy = BusyIndicator::new();
        let assistant = Arc::new(Assistant::new(gateway, config.assistant.options(), busy.clone()));
        let smart_panel = Arc::new(SmartActionPanel::new(Arc::clone(&assistant)));
        let sidebar = Arc::new(HistorySidebar::new(assistant));

        let ledger = Arc::new(RecentSessionsLedger::new(store));
        let loaded = ledger.load().await;
        tracing::info!(recent_sessions = loaded.len(), "Loaded session history");

        let controller = SessionController::with_options(
            ledger,
            config.device_name.clone(),
            Some(Panels {
                smart: Arc::clone(&smart_panel),
                sidebar: Arc::clone(&sidebar),
            }),
        );
        controller.set_sample_mode(config.sample_mode);

        Self {
            controller,
            smart_panel,
            sidebar,
            busy,
        }
    }

    /// File-backed history under `data_dir` and the HTTP assistant endpoint.
    pub async fn from_config(config: &ClipSyncConfig) -> Self {
        let store = Arc::new(FileStore::new(&config.data_dir));
        let gateway = Arc::new(HttpAssistantGateway::new(&config.assistant.endpoint));
        Self::init(config, store, gateway).await
    }

    #[must_use]
    pub const fn controller(&self) -> &SessionController {
        &self.controller
    }

    #[must_use]
    pub const fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    /// Open the smart-action panel for an item of the active session.
    pub fn open_smart_action(&self, item_id: &str) -> bool {
        match self.controller.item(item_id) {
            Some(item) => {
                self.smart_panel.open(item);
                true
            }
            None => false,
        }
    }

    pub fn close_smart_action(&self) {
        self.smart_panel.close();
    }

    pub async fn run_smart_action(&self, action: SmartAction) {
        self.smart_panel.execute(action).await;
    }

    pub fn toggle_history(&self) {
        self.sidebar.toggle();
    }

    pub fn set_history_filter(&self, filter: Option<ItemKind>) {
        self.sidebar.set_filter(filter);
    }

    /// Search the active session's items.
    pub async fn search(&self, query: &str) {
        let summary = self.controller.items_summary();
        self.sidebar.search(query, &summary).await;
    }

    #[must_use]
    pub fn snapshot(&self) -> AppSnapshot {
        let session = self.controller.snapshot();
        let sidebar = self.sidebar.snapshot();
        let sidebar_items = session
            .items
            .iter()
            .filter(|item| sidebar.filter.is_none_or(|kind| item.kind() == kind))
            .cloned()
            .collect();
        AppSnapshot {
            session,
            smart_panel: self.smart_panel.snapshot(),
            sidebar,
            sidebar_items,
            busy: self.busy.is_busy(),
        }
    }
}
