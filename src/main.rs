//! CodeAssess - Application Entry Point
//!
//! This is the main entry point for the CodeAssess server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codeassess::{
    config::CONFIG,
    constants::MAX_REQUEST_BODY_BYTES,
    handlers,
    judge::{AdapterRegistry, Evaluator, ProcessSandbox},
    repositories::{BundledProblemRepository, InMemoryProgressStore},
    services::AssessmentService,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CodeAssess server...");

    // Load the problem bank
    let problems = BundledProblemRepository::load()?;
    tracing::info!("Problem bank ready with {} problems", problems.len());

    // Build the evaluator
    let sandbox = Arc::new(ProcessSandbox::new(&CONFIG.sandbox));
    if sandbox.is_isolated() {
        sandbox
            .check_isolation()
            .await
            .context("sandbox isolation unavailable (set SANDBOX_ISOLATION=false to run unconfined)")?;
        tracing::info!("Sandbox isolation enabled");
    } else {
        tracing::warn!("SANDBOX_ISOLATION is off: candidate code runs without namespace confinement");
    }
    let registry = AdapterRegistry::with_default_adapters(sandbox, &CONFIG.sandbox);
    tracing::info!(
        "Execution adapters: {:?} (timeout {}ms, {} parallel cases)",
        registry.languages(),
        CONFIG.evaluator.timeout_ms,
        CONFIG.evaluator.max_parallel_cases
    );
    let evaluator = Evaluator::new(Arc::new(registry), &CONFIG.evaluator);

    // Create application state
    let service = AssessmentService::new(
        Arc::new(problems),
        Arc::new(InMemoryProgressStore::new()),
        Arc::new(evaluator),
    );
    let state = AppState::new(service, CONFIG.clone());

    // Build the router
    let app = Router::new()
        .nest("/api/v1", handlers::routes())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("CodeAssess shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, draining in-flight evaluations...");
}
