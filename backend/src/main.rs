use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

mod config;
mod session;

use config::ServerConfig;
use session::Session;

// Application State
struct AppState {
    config: ServerConfig,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let addr = config.addr;
    let static_dir = config.static_dir.clone();
    let shared_state = Arc::new(AppState { config });

    let mut app = Router::new()
        .route("/health", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    if let Some(dir) = static_dir {
        info!("serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    info!("listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!("failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        warn!("server error: {}", e);
    }
}

async fn root() -> String {
    health_message()
}

fn health_message() -> String {
    format!("paramform backend {}", paramform_core::version())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Sleeps until `deadline`, or forever when nothing is pending.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    info!(%session_id, "Client connected");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::new(state.config.form_config(), tx);

    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => session.handle_frame(&text, Instant::now()),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(%session_id, "Socket error: {}", e);
                        break;
                    }
                }
            }
            Some(reply) = rx.recv() => {
                if sender.send(Message::Text(reply.to_frame())).await.is_err() {
                    break;
                }
            }
            _ = wait_for(deadline) => {
                session.poll(Instant::now());
            }
        }
    }

    info!(%session_id, "Client disconnected");
}
