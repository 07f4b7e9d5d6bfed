pub mod form;
pub mod handlers;
pub mod metrics;
pub mod pages;
pub mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use clap::ArgMatches;

use crate::util::load_pipeline_config;
use state::AppState;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    pub preprocessor: PathBuf,
    pub model: PathBuf,
}

impl ServeConfig {
    /// Artifact paths come from the pipeline config; the address from `--addr`.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let config = load_pipeline_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
        let addr = matches
            .get_one::<String>("addr")
            .map(String::as_str)
            .unwrap_or(DEFAULT_ADDR);
        Ok(Self {
            addr: addr
                .parse()
                .with_context(|| format!("Invalid listen address: {}", addr))?,
            preprocessor: config.paths.preprocessor,
            model: config.paths.model,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", get(handlers::predict_form).post(handlers::predict))
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Count and time every request against its route template.
async fn track_requests(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = matched
        .as_ref()
        .map_or("unmatched", MatchedPath::as_str)
        .to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    state
        .metrics()
        .record_request(&method, &route, response.status().as_u16(), start.elapsed());
    response
}

/// Reload the artifacts whenever the process receives SIGHUP.
#[cfg(unix)]
fn spawn_reload_on_hangup(state: AppState) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            log::info!("[CreditRisk::Serve] SIGHUP received, reloading artifacts");
            let state = state.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || state.reload()).await {
                log::error!("Artifact reload panicked: {}", e);
            }
        }
    });
    Ok(())
}

pub async fn run_server(config: ServeConfig) -> Result<()> {
    let state = AppState::load(config.preprocessor.clone(), config.model.clone());

    #[cfg(unix)]
    spawn_reload_on_hangup(state.clone())?;

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    log::info!("[CreditRisk::Serve] Listening on http://{}", config.addr);
    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
