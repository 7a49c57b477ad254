//! ClipSync web server: serves a minimal browser view over the WebSocket
//! transport.
//!
//! Run with: cargo run -p clipsync-web-server
//!
//! Configuration is read from `clipsync.toml` (or `$CLIPSYNC_CONFIG`).
//! Then open the configured bind address in your browser.

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, response::Html, routing::get};
use clipsync_session::{App, ClipSyncConfig};
use clipsync_transport::websocket::create_ws_router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClipSyncConfig::from_env().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .init();

    tracing::info!(data_dir = %config.data_dir.display(), "Starting ClipSync");
    let app = Arc::new(App::from_config(&config).await);

    let router = Router::new()
        .route("/", get(index_handler))
        .merge(create_ws_router(app))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("Server listening on http://{}", config.server.bind);
    axum::serve(listener, router).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>ClipSync</title>
    <style>
        body { margin: 0; padding: 20px; background: #1e1e1e; color: #ddd; font-family: system-ui, sans-serif; }
        h1 { color: #fff; margin-bottom: 10px; }
        .status { color: #888; font-size: 14px; margin-bottom: 10px; }
        .connected { color: #4a4; }
        .disconnected { color: #a44; }
        .row { margin: 8px 0; }
        pre { background: #111; padding: 10px; overflow: auto; max-height: 60vh; }
    </style>
</head>
<body>
    <h1>ClipSync</h1>
    <div class="status" id="status">Connecting...</div>
    <div class="row">
        <button onclick="send({type: 'create_session'})">Create</button>
        <input id="code" placeholder="Session code" maxlength="6">
        <button onclick="send({type: 'join_session', code: val('code')})">Join</button>
        <button onclick="send({type: 'disconnect'})">Disconnect</button>
        <label><input type="checkbox" id="sample" onchange="send({type: 'set_sample_mode', enabled: this.checked})"> Sample data</label>
    </div>
    <div class="row">
        <input id="text" placeholder="Text to share">
        <button onclick="send({type: 'share_text', text: val('text')})">Share text</button>
        <input id="query" placeholder="Search history">
        <button onclick="send({type: 'search', query: val('query')})">Search</button>
    </div>
    <pre id="state"></pre>
    <script>
        const status = document.getElementById('status');
        const protocol = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
        const ws = new WebSocket(`${protocol}//${window.location.host}/ws`);
        const val = (id) => document.getElementById(id).value;
        const send = (msg) => ws.send(JSON.stringify(msg));

        ws.onopen = () => {
            status.textContent = 'Connected';
            status.className = 'status connected';
        };
        ws.onclose = () => {
            status.textContent = 'Disconnected';
            status.className = 'status disconnected';
        };
        ws.onmessage = (event) => {
            const msg = JSON.parse(event.data);
            if (msg.type === 'snapshot') {
                document.getElementById('state').textContent = JSON.stringify(msg.state, null, 2);
                document.getElementById('sample').checked = msg.state.sampleMode;
            } else if (msg.type === 'error') {
                status.textContent = msg.message;
            }
        };
    </script>
</body>
</html>
"#;
