//! HTTP server module
//!
//! Exposes the crash-report upload endpoint, a health check and, optionally,
//! read-only access to the stored reports.

use crate::{Config, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod routes;
pub mod state;

pub use state::AppState;

/// Create the router with all route definitions
///
/// # Routes
///
/// - `POST <server.endpoint>` - Upload a crash report (default `/crashreport`)
/// - `GET /health` - Health check
/// - `GET /*` - Stored reports, only when `server.serve_reports` is enabled
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route(&config.server.endpoint, post(routes::receive_crash_report))
        .route("/health", get(routes::health_check));

    let router = if config.server.serve_reports {
        router.fallback_service(ServeDir::new(config.save_dir()))
    } else {
        router
    };

    // Add state to all routes; the upload handler enforces max_body_bytes itself
    let router = router.with_state(state);

    if config.server.request_log {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Serve the ingest API on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::fs::create_dir_all(config.save_dir())
        .await
        .map_err(crate::error::Error::Io)?;

    let address = listener.local_addr().map_err(crate::error::Error::Io)?;
    let app = create_router(AppState::new(config.clone()));

    tracing::info!(
        address = %address,
        endpoint = %config.server.endpoint,
        save_dir = ?config.save_dir(),
        "crash report server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("crash report server stopped");
    Ok(())
}

/// Start the server on the configured bind address.
///
/// Creates `save_dir` if needed, then serves until `shutdown` resolves.
///
/// # Example
///
/// ```no_run
/// use crashreport_ingest::{Config, shutdown_signal};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// crashreport_ingest::api::start_api_server(config, shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting crash report server"
    );

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, config, shutdown).await
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
