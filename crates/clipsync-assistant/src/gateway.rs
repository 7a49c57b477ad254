//! Assistant gateway implementations.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use clipsync_core::traits::{AgentRequest, AgentResponse, AssistantGateway, GatewayError};

/// Gateway that posts requests as JSON to an HTTP endpoint.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpAssistantGateway {
    client: reqwest::Client,
    endpoint: String,
}

#[cfg(feature = "http")]
impl HttpAssistantGateway {
    /// Create a gateway for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl AssistantGateway for HttpAssistantGateway {
    async fn call(&self, request: &AgentRequest) -> Result<AgentResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        // Error statuses may still carry a `{success: false, error}` body.
        match serde_json::from_slice::<AgentResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(GatewayError::Status(status.as_u16())),
            Err(e) => Err(GatewayError::Decode(e.to_string())),
        }
    }
}

/// Gateway that replays canned responses in order, repeating the last one.
///
/// Useful for offline demos and tests. With no responses configured every
/// call fails with an explicit error.
#[derive(Debug, Default)]
pub struct StaticGateway {
    responses: Mutex<VecDeque<AgentResponse>>,
    requests: Mutex<Vec<AgentRequest>>,
}

impl StaticGateway {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = AgentResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Gateway that always answers with `response`.
    #[must_use]
    pub fn always(response: AgentResponse) -> Self {
        Self::new([response])
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AssistantGateway for StaticGateway {
    async fn call(&self, request: &AgentRequest) -> Result<AgentResponse, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        Ok(response.unwrap_or_else(|| AgentResponse::failed("No assistant configured")))
    }
}
