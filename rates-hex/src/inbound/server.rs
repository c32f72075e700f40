//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rates_types::{RateCache, RateRepository};

use super::handlers::{self, AppState};
use crate::RateService;
use crate::openapi::ApiDoc;

/// HTTP Server for the Rates API.
pub struct HttpServer<R: RateRepository, C: RateCache> {
    state: Arc<AppState<R, C>>,
}

impl<R: RateRepository, C: RateCache> HttpServer<R, C> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: RateService<R, C>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    ///
    /// Rate routes are served under `/api/v1/rates` and the legacy `/api/rates`.
    pub fn router(&self) -> Router {
        let mut router: Router<Arc<AppState<R, C>>> =
            Router::new().route("/health", get(handlers::health));
        for prefix in ["/api/v1/rates", "/api/rates"] {
            router = router
                .route(prefix, get(handlers::rate_on_date::<R, C>))
                .route(&format!("{prefix}/latest"), get(handlers::latest_rate::<R, C>))
                .route(&format!("{prefix}/list"), get(handlers::list_rates::<R, C>));
        }

        router
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
