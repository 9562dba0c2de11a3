//! HTTP API server
//!
//! `/api/ai-seo/*` のルーティングとサーバー起動

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::content::ContentStore;
use crate::error::{Error, Result};
use crate::seo::SeoOptimizer;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// ハンドラー間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub optimizer: Arc<SeoOptimizer>,
    pub store: Arc<dyn ContentStore>,
}

impl AppState {
    pub fn new(optimizer: SeoOptimizer, store: Arc<dyn ContentStore>) -> Self {
        Self {
            optimizer: Arc::new(optimizer),
            store,
        }
    }
}

/// ルーターを作成
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ai-seo/analyze", post(handlers::analyze))
        .route("/api/ai-seo/apply", post(handlers::apply))
        .route("/api/ai-seo/apply-field", post(handlers::apply_single_field))
        .route("/api/ai-seo/apply-all", post(handlers::apply_all_fields))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// サーバーを開始（Ctrl+C / SIGTERM で停止）
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("AI SEO API listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Io)?;

    info!("Server stopped");
    Ok(())
}

/// グレースフルシャットダウンシグナル
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
