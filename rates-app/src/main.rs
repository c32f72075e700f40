//! # RateFlow Server
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository and cache adapters
//! - Create the rate query service
//! - Start the HTTP server

mod config;

use anyhow::Context;
use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rates_hex::{RateService, inbound::HttpServer};
use rates_repo::{CacheBackend, build_repo};

use crate::config::{Config, LogFormat};

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to create OTLP span exporter")?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("rateflow"), provider))
}

/// Installs the global subscriber. Returns the OTel provider to flush on exit.
fn init_tracing(config: &Config) -> anyhow::Result<Option<sdktrace::SdkTracerProvider>> {
    let (telemetry, otel_provider) = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let (tracer, provider) = init_tracer(endpoint)?;
            (
                Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                Some(provider),
            )
        }
        None => (None, None),
    };

    let json = (config.log_format == LogFormat::Json).then(|| tracing_subscriber::fmt::layer().json());
    let text = (config.log_format == LogFormat::Text).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(json)
        .with(text)
        .with(telemetry)
        .init();

    Ok(otel_provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let otel_provider = init_tracing(&config)?;

    tracing::info!("Starting RateFlow server on {}", config.bind_addr());

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let cache = CacheBackend::from_url(
        config.redis_url.as_deref(),
        &config.redis_key_prefix,
        config.redis_connect_timeout_ms,
    )?;
    tracing::info!(
        backend = repo.backend(),
        cache = cache.kind(),
        otlp = config.otlp_endpoint.is_some(),
        "adapters ready"
    );

    let server = HttpServer::new(RateService::new(repo, cache));
    server.run(&config.bind_addr()).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "failed to flush traces");
        }
    }
    Ok(())
}
