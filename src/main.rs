//! EduGen server binary.
//!
//! Reads configuration from the environment (see `edugen::config`), wires the
//! Gemini provider, handlers, exporters and workspace together, and serves
//! the page and API with axum.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use edugen::adapters::ai::{GeminiConfig, GeminiProvider, UnconfiguredProvider};
use edugen::adapters::export::{DocxExporter, PdfExporter, PptxExporter};
use edugen::adapters::http::{app_router, AppState};
use edugen::application::{GeneratePlanHandler, PlanWorkspace, RevisePlanHandler};
use edugen::config::{AiConfig, AppConfig, CorsPolicy, ServerConfig};
use edugen::ports::AIProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let provider = build_provider(&config.ai);

    let pdf_exporter = PdfExporter::from_config(&config.export);
    if !pdf_exporter.is_available().await {
        warn!("wkhtmltopdf not found; PDF export will be a no-op");
    }

    let workspace = PlanWorkspace::new(
        GeneratePlanHandler::new(provider.clone()).with_temperature(config.ai.temperature),
        RevisePlanHandler::new(provider).with_temperature(config.ai.temperature),
    )
    .with_exporter(Arc::new(DocxExporter::new()))
    .with_exporter(Arc::new(PptxExporter::new()))
    .with_exporter(Arc::new(pdf_exporter));

    let app = app_router(AppState::new(Arc::new(workspace)))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "EduGen listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("EduGen stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Gemini when a key is configured; otherwise a provider that fails every call.
fn build_provider(config: &AiConfig) -> Arc<dyn AIProvider> {
    let provider: Arc<dyn AIProvider> =
        match GeminiConfig::from_ai_config(config).and_then(GeminiProvider::new) {
            Ok(provider) => Arc::new(provider),
            Err(err) => {
                warn!(error = %err, "Gemini provider not configured; generation will fail");
                Arc::new(UnconfiguredProvider::new(config.model.clone(), &err))
            }
        };

    let info = provider.provider_info();
    info!(provider = %info.name, model = %info.model, "AI provider ready");
    provider
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match config.cors_policy() {
        CorsPolicy::Permissive => CorsLayer::permissive(),
        CorsPolicy::AllowList(origins) => CorsLayer::new()
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| HeaderValue::from_str(origin).ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
