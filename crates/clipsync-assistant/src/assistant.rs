//! Smart actions and search over the assistant gateway.

use std::{sync::Arc, time::Duration};

use clipsync_core::{
    SmartActionResult,
    traits::{AgentRequest, AgentResponse, AssistantGateway, GatewayError},
};
use tokio::sync::Mutex;

use crate::{actions::{SmartAction, search_instruction}, busy::BusyIndicator};

/// Agent identifier used when none is configured.
pub const DEFAULT_AGENT_ID: &str = "69a282af8e6d0e51fd5cd42b";

const ACTION_FAILED: &str = "Failed to process. Please try again.";
const ACTION_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";
const SEARCH_EMPTY: &str = "No matching items found.";
const SEARCH_FAILED: &str = "Search failed. Please try again.";
const SEARCH_ERROR: &str = "Search error. Please try again.";

/// Assistant call options.
#[derive(Debug, Clone)]
pub struct AssistantOptions {
    pub agent_id: String,
    /// Upper bound on a single call, including time spent queued.
    pub timeout: Duration,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            agent_id: DEFAULT_AGENT_ID.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Builds instructions, calls the gateway and interprets its responses.
///
/// Calls are serialized: a second call waits until the first completes.
/// The busy indicator is raised for as long as any call is queued or in flight.
pub struct Assistant {
    gateway: Arc<dyn AssistantGateway>,
    options: AssistantOptions,
    busy: BusyIndicator,
    in_flight: Mutex<()>,
}

impl Assistant {
    #[must_use]
    pub fn new(gateway: Arc<dyn AssistantGateway>, options: AssistantOptions, busy: BusyIndicator) -> Self {
        Self {
            gateway,
            options,
            busy,
            in_flight: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    /// Run a smart action over an item's content.
    ///
    /// # Errors
    /// Returns a display message when the assistant reports a failure or
    /// cannot be reached.
    pub async fn run_action(
        &self,
        action: &SmartAction,
        content: &str,
    ) -> Result<SmartActionResult, String> {
        match self.dispatch(action.instruction(content)).await {
            Ok(response) if response.success => Ok(response
                .into_result()
                .unwrap_or_default()
                .resolve(action.as_str())),
            Ok(response) => {
                let message = response.error.unwrap_or_else(|| ACTION_FAILED.to_string());
                tracing::warn!(%action, "Smart action failed: {message}");
                Err(message)
            }
            Err(e) => {
                tracing::warn!(%action, "Smart action error: {e}");
                Err(ACTION_UNEXPECTED.to_string())
            }
        }
    }

    /// Search the session's items. Always yields display text.
    pub async fn search(&self, query: &str, items_summary: &str) -> String {
        match self.dispatch(search_instruction(query, items_summary)).await {
            Ok(response) if response.success => response
                .into_result()
                .and_then(|result| result.content)
                .unwrap_or_else(|| SEARCH_EMPTY.to_string()),
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Search failed");
                SEARCH_FAILED.to_string()
            }
            Err(e) => {
                tracing::warn!("Search error: {e}");
                SEARCH_ERROR.to_string()
            }
        }
    }

    async fn dispatch(&self, message: String) -> Result<AgentResponse, GatewayError> {
        let _busy = self.busy.enter();
        let request = AgentRequest::new(message, self.options.agent_id.clone());
        let timeout = self.options.timeout;

        let call = async {
            let _slot = self.in_flight.lock().await;
            tracing::debug!(agent_id = %request.agent_id, "Calling assistant");
            self.gateway.call(&request).await
        };

        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout(timeout.as_secs()))?
    }
}
