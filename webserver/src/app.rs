use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::api::ApiError;
use crate::handler::health as health_handlers;
use crate::middleware::cors::cors;

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        let router = Self::router(Router::new(), config.http_timeout);

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!(env = ?config.cargo_env, "🚀 Server has launched on http://{addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await?;

        Ok(())
    }

    /// Adds the health route, the 404 fallback and the middleware stack to
    /// `routes`. Layers are applied last so the fallback is covered too. CORS
    /// sits outside the timeout so error responses carry its headers.
    pub fn router(routes: Router, http_timeout: u64) -> Router {
        routes
            .route("/health", get(health_handlers::get_health))
            .fallback(Self::handle_404)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(axum::middleware::from_fn(cors))
                    .layer(HandleErrorLayer::new(move |err: BoxError| {
                        Self::handle_timeout_error(err, http_timeout)
                    }))
                    .timeout(Duration::from_secs(http_timeout)),
            )
    }

    /// Error handler for tower's `TimeoutLayer`, see https://docs.rs/axum/latest/axum/middleware/index.html#commonly-used-middleware.
    async fn handle_timeout_error(err: BoxError, http_timeout: u64) -> Response {
        if err.is::<tower::timeout::error::Elapsed>() {
            ApiError::Timeout(http_timeout).into_response()
        } else {
            ApiError::Internal(err.to_string()).into_response()
        }
    }

    /// Tokio signal handler that will wait for a user to press CTRL+C.
    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
        }
        tracing::warn!("signal shutdown");
    }

    async fn handle_404() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            axum::response::Json(serde_json::json!({
                    "errors":{
                    "message": vec!(String::from("The requested resource does not exist on this server!")),}
                }
            )),
        )
    }
}
