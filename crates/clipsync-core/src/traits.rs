//! Core traits for persistence and the assistant collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::AgentResult;

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for named-slot key-value backends (the ledger lives in one slot).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `None` when it was never written or has been removed.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing an absent slot is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Outbound assistant request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub message: String,
    pub agent_id: String,
}

impl AgentRequest {
    #[must_use]
    pub fn new(message: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// Nested payload of a successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPayload {
    #[serde(default)]
    pub result: Option<AgentResult>,
}

/// Inbound assistant response. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<AgentPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AgentResponse {
    /// Successful response carrying `result`.
    #[must_use]
    pub fn ok(result: AgentResult) -> Self {
        Self {
            success: true,
            response: Some(AgentPayload {
                result: Some(result),
            }),
            error: None,
        }
    }

    /// Explicit failure.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }

    /// The nested result, if any.
    #[must_use]
    pub fn into_result(self) -> Option<AgentResult> {
        self.response.and_then(|payload| payload.result)
    }
}

/// Gateway error: anything that kept a well-formed response from arriving.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected status: {0}")]
    Status(u16),
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Timed out after {0}s")]
    Timeout(u64),
}

/// Trait for the remote assistant service.
///
/// Implement this trait to connect a real agent backend; the framework
/// builds the instructions and interprets the responses.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Send one request and wait for its response.
    async fn call(&self, request: &AgentRequest) -> Result<AgentResponse, GatewayError>;
}
