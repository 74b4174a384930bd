//! Server execution logic.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handler::{
        channel_messages, debug_clients, health_check, leave, new_channel, new_thread,
        send_to_client, send_to_clients, thread_messages, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// WebSocket relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(state, allowed_origins);
/// server.run("127.0.0.1:8080").await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// CORS で許可する Origin（空の場合は全て許可）
    allowed_origins: Vec<String>,
}

impl Server {
    pub fn new(state: Arc<AppState>, allowed_origins: Vec<String>) -> Self {
        Self {
            state,
            allowed_origins,
        }
    }

    /// ルーティングを組み立てる
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/connect", get(websocket_handler))
            // HTTP エンドポイント
            .route("/client/send", post(send_to_client))
            .route("/clients/send", post(send_to_clients))
            .route("/client/leave", post(leave))
            .route("/messages/channel", get(channel_messages))
            .route("/messages/thread", get(thread_messages))
            .route("/channel/new", post(new_channel))
            .route("/thread/new", post(new_thread))
            .route("/healthz", get(health_check))
            .route("/debug/clients", get(debug_clients))
            .layer(TraceLayer::new_for_http())
            .layer(self.cors())
            .with_state(self.state.clone())
    }

    fn cors(&self) -> CorsLayer {
        if self.allowed_origins.is_empty() {
            return CorsLayer::permissive();
        }

        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// Run the relay server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/connect?client_id=<id>", addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// 既に bind されたリスナーで `shutdown` が完了するまで処理する
    ///
    /// `shutdown` の完了後、全ての接続を閉じてから終了する。
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let registry = self.state.registry.clone();
        let app = self.router();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                registry.shutdown().await;
            })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
