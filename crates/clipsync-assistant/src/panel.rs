//! View models for the smart-action panel and the history sidebar.
//!
//! Both hold their state behind a lock that is never held across an await.
//! Each assistant request is tagged; a response only lands if its tag is
//! still current, so results for a closed panel or a replaced query are dropped.
//! A request that is cancelled before it settles clears its own loading flag.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use clipsync_core::{ItemKind, SmartActionResult, TransferItem};
use serde::Serialize;

use crate::{actions::SmartAction, assistant::Assistant};

/// State carrying a request tag and a loading flag for that request.
trait PendingState {
    fn request(&self) -> u64;
    fn clear_loading(&mut self);
}

/// Outstanding assistant request against a panel's state.
///
/// Dropped without [`Pending::settle`], it clears the loading flag if the
/// request is still current.
struct Pending<'a, S: PendingState> {
    state: &'a Mutex<S>,
    request: u64,
    settled: bool,
}

impl<'a, S: PendingState> Pending<'a, S> {
    const fn new(state: &'a Mutex<S>, request: u64) -> Self {
        Self {
            state,
            request,
            settled: false,
        }
    }

    /// Lock the state for applying the outcome; `None` when the request is stale.
    fn settle(mut self) -> Option<MutexGuard<'a, S>> {
        self.settled = true;
        let mutex: &'a Mutex<S> = self.state;
        let state = mutex.lock().unwrap_or_else(PoisonError::into_inner);
        (state.request() == self.request).then_some(state)
    }
}

impl<S: PendingState> Drop for Pending<'_, S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.request() == self.request {
            tracing::debug!("Assistant request cancelled");
            state.clear_loading();
        }
    }
}

/// Smart-action panel state, as rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPanelState {
    pub open: bool,
    pub item: Option<TransferItem>,
    pub loading: bool,
    pub result: Option<SmartActionResult>,
    /// Empty when there is no error.
    pub error: String,
    #[serde(skip)]
    request: u64,
}

impl PendingState for SmartPanelState {
    fn request(&self) -> u64 {
        self.request
    }

    fn clear_loading(&mut self) {
        self.loading = false;
    }
}

impl SmartPanelState {
    /// Actions offered for the selected item.
    #[must_use]
    pub fn actions(&self) -> Vec<SmartAction> {
        self.item
            .as_ref()
            .map(|item| SmartAction::available_for(item.kind()))
            .unwrap_or_default()
    }
}

/// Panel that runs smart actions for one selected item.
pub struct SmartActionPanel {
    assistant: Arc<Assistant>,
    state: Mutex<SmartPanelState>,
}

impl SmartActionPanel {
    #[must_use]
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            state: Mutex::new(SmartPanelState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SmartPanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> SmartPanelState {
        self.lock().clone()
    }

    /// Select an item and show the panel with a clean result area.
    pub fn open(&self, item: TransferItem) {
        let mut state = self.lock();
        state.request += 1;
        state.open = true;
        state.item = Some(item);
        state.loading = false;
        state.result = None;
        state.error.clear();
    }

    /// Hide the panel and forget the selection.
    pub fn close(&self) {
        let mut state = self.lock();
        let request = state.request + 1;
        *state = SmartPanelState {
            request,
            ..SmartPanelState::default()
        };
    }

    /// Run `action` on the selected item. No-op when nothing is selected.
    pub async fn execute(&self, action: SmartAction) {
        let (request, content) = {
            let mut state = self.lock();
            let Some(item) = state.item.as_ref() else {
                return;
            };
            let content = item.content().to_string();
            state.request += 1;
            state.loading = true;
            state.result = None;
            state.error.clear();
            (state.request, content)
        };

        let pending = Pending::new(&self.state, request);
        let outcome = self.assistant.run_action(&action, &content).await;

        let Some(mut state) = pending.settle() else {
            tracing::debug!(%action, "Discarding stale smart action result");
            return;
        };
        state.loading = false;
        match outcome {
            Ok(result) => state.result = Some(result),
            Err(message) => state.error = message,
        }
    }
}

/// History sidebar state, as rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarState {
    pub open: bool,
    /// `None` shows every kind.
    pub filter: Option<ItemKind>,
    pub search_loading: bool,
    pub search_result: String,
    #[serde(skip)]
    request: u64,
}

impl PendingState for SidebarState {
    fn request(&self) -> u64 {
        self.request
    }

    fn clear_loading(&mut self) {
        self.search_loading = false;
    }
}

/// Sidebar listing the session's items with type filter and assistant search.
pub struct HistorySidebar {
    assistant: Arc<Assistant>,
    state: Mutex<SidebarState>,
}

impl HistorySidebar {
    #[must_use]
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            state: Mutex::new(SidebarState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SidebarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> SidebarState {
        self.lock().clone()
    }

    pub fn toggle(&self) {
        let mut state = self.lock();
        state.open = !state.open;
    }

    pub fn set_filter(&self, filter: Option<ItemKind>) {
        self.lock().filter = filter;
    }

    /// Close and reset, discarding any pending search.
    pub fn reset(&self) {
        let mut state = self.lock();
        let request = state.request + 1;
        *state = SidebarState {
            request,
            ..SidebarState::default()
        };
    }

    /// Search the items described by `items_summary`. Blank queries are ignored.
    pub async fn search(&self, query: &str, items_summary: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let request = {
            let mut state = self.lock();
            state.request += 1;
            state.search_loading = true;
            state.search_result.clear();
            state.request
        };

        let pending = Pending::new(&self.state, request);
        let result = self.assistant.search(query, items_summary).await;

        if let Some(mut state) = pending.settle() {
            state.search_loading = false;
            state.search_result = result;
        }
    }
}
