//! Wire protocol for view-core communication.

use clipsync_assistant::SmartAction;
use clipsync_core::ItemKind;
use clipsync_session::AppSnapshot;
use serde::{Deserialize, Deserializer, Serialize};

/// Message from a view to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a new session with a generated code.
    CreateSession,
    /// Join an existing session.
    JoinSession { code: String },
    /// End the active session.
    Disconnect,
    ShareText { text: String },
    ShareCode { code: String, language: String },
    /// Share file metadata; the file's bytes stay on the device.
    ShareFile { file_name: String, file_size: u64 },
    SetSampleMode { enabled: bool },
    ClearHistory,
    /// Hide the pairing code display.
    DismissPairing,
    OpenSmartAction { item_id: String },
    CloseSmartAction,
    RunSmartAction { action: SmartAction },
    ToggleHistory,
    /// Restrict the history list to one kind; `"all"` or `null` shows everything.
    SetHistoryFilter {
        #[serde(default, deserialize_with = "history_filter")]
        filter: Option<ItemKind>,
    },
    Search { query: String },
    /// Ping for keepalive.
    Ping,
}

impl ClientMessage {
    /// Whether handling this message waits on the assistant.
    #[must_use]
    pub const fn is_assistant_call(&self) -> bool {
        matches!(self, Self::RunSmartAction { .. } | Self::Search { .. })
    }
}

fn history_filter<'de, D>(deserializer: D) -> Result<Option<ItemKind>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Filter {
        Kind(ItemKind),
        Other(String),
    }

    match Option::<Filter>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Filter::Kind(kind)) => Ok(Some(kind)),
        Some(Filter::Other(s)) if s == "all" => Ok(None),
        Some(Filter::Other(s)) => Err(serde::de::Error::custom(format!("unknown filter: {s}"))),
    }
}

/// Message from the core to a view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full view state.
    Snapshot { state: Box<AppSnapshot> },
    /// Error message.
    Error { message: String },
    /// Pong response.
    Pong,
}

impl ServerMessage {
    #[must_use]
    pub fn snapshot(state: AppSnapshot) -> Self {
        Self::Snapshot {
            state: Box::new(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join_session","code":" ab12cd "}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinSession { code: " ab12cd ".to_string() });

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"run_smart_action","action":"format_code"}"#).unwrap();
        assert_eq!(msg, ClientMessage::RunSmartAction { action: SmartAction::FormatCode });
        assert!(msg.is_assistant_call());
    }

    #[test]
    fn test_history_filter_defaults_to_all() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"set_history_filter"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SetHistoryFilter { filter: None });

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"set_history_filter","filter":"code"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SetHistoryFilter { filter: Some(ItemKind::Code) });

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"set_history_filter","filter":"all"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SetHistoryFilter { filter: None });

        assert!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"set_history_filter","filter":"video"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_server_message_serialization() {
        let json = serde_json::to_string(&ServerMessage::Error {
            message: "nope".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"error","message":"nope"}"#);
        assert_eq!(serde_json::to_string(&ServerMessage::Pong).unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"resize"}"#).is_err());
    }
}
