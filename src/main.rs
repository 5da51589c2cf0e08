use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use hireboard::config::{AppConfig, AppEnvironment};
use hireboard::error::AppError;
use hireboard::storage::{upload_router, LocalDiskStore, UploadGates};
use hireboard::telemetry;
use hireboard::workflows::applications::{
    application_router, ApplicationWorkflow, InMemoryApplicationStore, InMemoryDirectory,
    PostingId, UserId, UserIdentity, UserRole,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "hireboard",
    about = "Run the job application intake and review service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let object_store = Arc::new(LocalDiskStore::new(
        config.storage.upload_dir.clone(),
        config.storage.public_base_url.clone(),
    ));
    let gates = UploadGates::new(object_store);

    let repository = Arc::new(InMemoryApplicationStore::default());
    let directory = Arc::new(InMemoryDirectory::default());
    if config.environment == AppEnvironment::Development {
        seed_demo_directory(&directory);
    }
    let workflow = Arc::new(ApplicationWorkflow::new(repository, directory.clone()));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(upload_router(gates))
        .merge(application_router(workflow, directory))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hireboard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Local development runs without the real auth and posting services, so
/// register one recruiter and one owned posting to exercise the review
/// endpoints against.
fn seed_demo_directory(directory: &InMemoryDirectory) {
    let recruiter_id = UserId("demo-recruiter".to_string());
    directory.register_identity(UserIdentity {
        id: recruiter_id.clone(),
        fullname: "Demo Recruiter".to_string(),
        email: "recruiter@hireboard.local".to_string(),
        role: UserRole::Recruiter,
        phone_number: None,
    });
    directory.register_posting_owner(PostingId("demo-posting".to_string()), recruiter_id);
    info!("seeded demo recruiter 'demo-recruiter' owning posting 'demo-posting'");
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
