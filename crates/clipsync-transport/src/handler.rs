//! Applies client messages to the application state.

use clipsync_core::FileMeta;
use clipsync_session::App;

use crate::protocol::{ClientMessage, ServerMessage};

/// Apply one client message and produce the reply.
///
/// Every state-changing message is answered with a fresh snapshot.
/// Assistant-backed messages complete only once the assistant has answered;
/// transports should run those off the receive loop.
pub async fn handle_client_message(app: &App, msg: ClientMessage) -> ServerMessage {
    let controller = app.controller();
    match msg {
        ClientMessage::Ping => return ServerMessage::Pong,
        ClientMessage::CreateSession => {
            controller.create_session().await;
        }
        ClientMessage::JoinSession { code } => {
            controller.join_session(&code).await;
        }
        ClientMessage::Disconnect => {
            controller.disconnect().await;
        }
        ClientMessage::ShareText { text } => {
            controller.share_text(&text);
        }
        ClientMessage::ShareCode { code, language } => {
            controller.share_code(&code, &language);
        }
        ClientMessage::ShareFile {
            file_name,
            file_size,
        } => {
            controller.share_file(FileMeta::new(file_name, file_size));
        }
        ClientMessage::SetSampleMode { enabled } => controller.set_sample_mode(enabled),
        ClientMessage::ClearHistory => controller.clear_history().await,
        ClientMessage::DismissPairing => controller.dismiss_pairing(),
        ClientMessage::OpenSmartAction { item_id } => {
            if !app.open_smart_action(&item_id) {
                return ServerMessage::Error {
                    message: format!("Unknown item: {item_id}"),
                };
            }
        }
        ClientMessage::CloseSmartAction => app.close_smart_action(),
        ClientMessage::RunSmartAction { action } => app.run_smart_action(action).await,
        ClientMessage::ToggleHistory => app.toggle_history(),
        ClientMessage::SetHistoryFilter { filter } => app.set_history_filter(filter),
        ClientMessage::Search { query } => app.search(&query).await,
    }
    ServerMessage::snapshot(app.snapshot())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clipsync_assistant::{SmartAction, StaticGateway};
    use clipsync_core::traits::AgentResponse;
    use clipsync_session::{ClipSyncConfig, storage::MemoryStore};

    use super::*;

    async fn app() -> App {
        App::init(
            &ClipSyncConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(StaticGateway::always(AgentResponse::failed("boom"))),
        )
        .await
    }

    fn state(msg: ServerMessage) -> clipsync_session::AppSnapshot {
        match msg {
            ServerMessage::Snapshot { state } => *state,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_flow() {
        let app = app().await;
        let join = ClientMessage::JoinSession {
            code: "  ab12cd ".into(),
        };
        let s = state(handle_client_message(&app, join).await);
        assert_eq!(s.session.session.unwrap().code, "AB12CD");

        handle_client_message(&app, ClientMessage::ShareText { text: "hello".into() }).await;
        let s = state(
            handle_client_message(
                &app,
                ClientMessage::ShareFile {
                    file_name: "a.pdf".into(),
                    file_size: 12,
                },
            )
            .await,
        );
        assert_eq!(s.session.items.len(), 2);

        let s = state(handle_client_message(&app, ClientMessage::Disconnect).await);
        assert!(s.session.session.is_none());
        assert_eq!(s.session.recent_sessions[0].item_count, 2);
    }

    #[tokio::test]
    async fn test_smart_action_error_reaches_snapshot() {
        let app = app().await;
        handle_client_message(&app, ClientMessage::CreateSession).await;
        let share = ClientMessage::ShareText { text: "x".into() };
        let s = state(handle_client_message(&app, share).await);
        let item_id = s.session.items[0].id.clone();

        handle_client_message(&app, ClientMessage::OpenSmartAction { item_id }).await;
        let s = state(
            handle_client_message(
                &app,
                ClientMessage::RunSmartAction {
                    action: SmartAction::Summarize,
                },
            )
            .await,
        );
        assert_eq!(s.smart_panel.error, "boom");
        assert!(!s.busy);
    }

    #[tokio::test]
    async fn test_ping_and_unknown_item() {
        let app = app().await;
        let reply = handle_client_message(&app, ClientMessage::Ping).await;
        assert!(matches!(reply, ServerMessage::Pong));

        let open = ClientMessage::OpenSmartAction {
            item_id: "nope".into(),
        };
        let reply = handle_client_message(&app, open).await;
        assert!(matches!(reply, ServerMessage::Error { .. }));
    }

    #[tokio::test]
    async fn test_blank_share_and_dismiss_pairing() {
        let app = app().await;
        let s = state(handle_client_message(&app, ClientMessage::CreateSession).await);
        assert!(s.session.pairing_code.is_some());

        let s = state(handle_client_message(&app, ClientMessage::ShareText { text: "   ".into() }).await);
        assert!(s.session.items.is_empty());

        let s = state(handle_client_message(&app, ClientMessage::DismissPairing).await);
        assert!(s.session.pairing_code.is_none());
    }
}
