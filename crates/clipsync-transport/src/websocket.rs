//! WebSocket transport for browser views.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use clipsync_session::App;
use futures::{SinkExt, StreamExt, stream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

use crate::{
    handler::handle_client_message,
    protocol::{ClientMessage, ServerMessage},
};

/// WebSocket upgrade handler.
///
/// Use this as an Axum route handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app): State<Arc<App>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app))
}

async fn handle_socket(socket: WebSocket, app: Arc<App>) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(ServerMessage::snapshot(app.snapshot()));

    // Push a snapshot whenever the session changes or the busy state flips,
    // so ticks and timer-driven items reach the view without a request.
    let changes_task = {
        let app = Arc::clone(&app);
        let tx = tx.clone();
        let events = BroadcastStream::new(app.controller().subscribe()).map(|_| ());
        let busy = WatchStream::from_changes(app.busy().subscribe()).map(|_| ());
        tokio::spawn(async move {
            let mut changes = stream::select(events, busy);
            while changes.next().await.is_some() {
                if tx.send(ServerMessage::snapshot(app.snapshot())).is_err() {
                    break;
                }
            }
        })
    };

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        let client_msg: ClientMessage = match serde_json::from_str(&msg) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Invalid client message: {e}");
                let _ = tx.send(ServerMessage::Error {
                    message: format!("Invalid message: {e}"),
                });
                continue;
            }
        };
        tracing::debug!(?client_msg, "Client message");

        // Assistant calls run to completion even after the socket closes.
        if client_msg.is_assistant_call() {
            let app = Arc::clone(&app);
            let tx = tx.clone();
            tokio::spawn(async move {
                let reply = handle_client_message(&app, client_msg).await;
                let _ = tx.send(reply);
            });
        } else {
            let reply = handle_client_message(&app, client_msg).await;
            let _ = tx.send(reply);
        }
    }

    changes_task.abort();
    send_task.abort();
}

/// Create WebSocket router.
///
/// # Example
/// ```ignore
/// let router = Router::new()
///     .merge(create_ws_router(Arc::new(app)));
/// ```
#[must_use]
pub fn create_ws_router(app: Arc<App>) -> axum::Router {
    axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(app)
}
