use clap::Parser;
use dotenvy::dotenv;
use faculty_upload::config::AppConfig;
use faculty_upload::infrastructure::{google, storage};
use faculty_upload::services::upload_service::UploadService;
use faculty_upload::{AppState, create_app};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Service-account key file (overrides GOOGLE_APPLICATION_CREDENTIALS)
    #[arg(short, long)]
    credentials: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faculty_upload=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Faculty Upload Portal...");

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(credentials) = args.credentials {
        config.credentials_path = credentials;
    }

    // Credential problems abort startup rather than failing per request
    let clients = google::setup_google_clients(&config)?;
    storage::setup_upload_dir(&config.upload_dir).await?;

    let upload_service = Arc::new(UploadService::new(
        clients.drive,
        clients.sheets,
        &config,
    ));

    let state = AppState {
        upload_service,
        config: config.clone(),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

/// Resolves with the name of the first stop signal the process receives.
async fn shutdown_signal() {
    let received = tokio::select! {
        name = interrupt() => name,
        name = terminate() => name,
    };
    info!("{} received, draining in-flight uploads before exit", received);
}

async fn interrupt() -> &'static str {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C ({}), relying on SIGTERM only", e);
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}

#[cfg(unix)]
async fn terminate() -> &'static str {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Cannot listen for SIGTERM ({}), relying on Ctrl+C only", e);
            std::future::pending::<()>().await;
        }
    }
    "SIGTERM"
}

#[cfg(not(unix))]
async fn terminate() -> &'static str {
    std::future::pending::<()>().await;
    "SIGTERM"
}
