//! HTTP surface for the scraper

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{MatchedPath, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, classify::ServerErrorsFailureClass, cors::CorsLayer,
    trace::TraceLayer,
};
use videoscrape_core::{PageWindow, ScrapeError, VideoRecord, VideoScraper};

use crate::config::ServerConfig;

pub const ROOT_PATH: &str = "/";
pub const HEALTH_PATH: &str = "/health";
pub const SCRAPE_PATH: &str = "/api/scrape-videos";
/// Serverless-style alias for [`SCRAPE_PATH`]
pub const SCRAPE_ALIAS_PATH: &str = "/api/scrape.js";

const SERVICE_NAME: &str = "Video Scraper API";
const BANNER_MESSAGE: &str = "Video Scraper API is running!";
const USAGE: &str = "/api/scrape-videos?start=0&limit=20";
const HEALTH_STATUS: &str = "OK";
const ERROR_NOT_FOUND: &str = "Not found";
const ERROR_INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid server configuration: {reason}")]
    Config { reason: String },
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to determine local address: {source}")]
    LocalAddr {
        #[source]
        source: std::io::Error,
    },
    #[error("axum server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ShutdownEvent {
    CtrlC,
    SigTerm,
}

/// Shared handler state; one scraper, one browser per request
#[derive(Clone)]
pub struct AppState {
    scraper: Arc<VideoScraper>,
}

impl AppState {
    pub fn new(scraper: VideoScraper) -> Self {
        Self {
            scraper: Arc::new(scraper),
        }
    }
}

#[derive(Debug, Serialize)]
struct BannerEndpoints {
    scrape: &'static str,
    health: &'static str,
}

#[derive(Debug, Serialize)]
struct BannerResponse {
    message: &'static str,
    endpoints: BannerEndpoints,
    usage: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct ScrapeSuccess {
    success: bool,
    count: usize,
    data: Vec<VideoRecord>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ScrapeFailure {
    success: bool,
    error: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct InternalError {
    success: bool,
    error: &'static str,
}

#[derive(Debug, Serialize)]
struct NotFoundResponse {
    error: &'static str,
}

/// Routes, 404 fallback and panic guard, without tracing or CORS
pub fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route(ROOT_PATH, get(banner).fallback(not_found_handler))
        .route(HEALTH_PATH, get(health).fallback(not_found_handler))
        .route(SCRAPE_PATH, get(scrape_videos).fallback(not_found_handler))
        .route(
            SCRAPE_ALIAS_PATH,
            get(scrape_videos).fallback(not_found_handler),
        )
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Full application router: API routes plus request tracing and optional CORS
pub fn build_app_router(config: &ServerConfig, state: AppState) -> Router {
    let mut router = build_api_router(state);

    if config.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let path = request
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| request.uri().path().to_string());
            tracing::info_span!("http.request", method = %request.method(), path = %path)
        })
        .on_response(|response: &Response, latency: Duration, span: &tracing::Span| {
            let latency_ms = latency.as_millis().min(u128::from(u64::MAX)) as u64;
            tracing::info!(parent: span, status = response.status().as_u16(), latency_ms, "request completed");
        })
        .on_failure(
            |error: ServerErrorsFailureClass, latency: Duration, span: &tracing::Span| {
                let latency_ms = latency.as_millis().min(u128::from(u64::MAX)) as u64;
                tracing::error!(parent: span, latency_ms, error = %error, "request failed");
            },
        );

    router.layer(trace_layer)
}

/// Bind, serve until Ctrl+C / SIGTERM, then drain
pub async fn serve(config: ServerConfig, scraper: VideoScraper) -> Result<(), ServerError> {
    let address = config.listen_addr();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::LocalAddr { source })?;
    tracing::info!(%local_addr, env = %config.app_env, "video scraper listening");

    let app = build_app_router(&config, AppState::new(scraper));

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let event = wait_for_shutdown().await;
            tracing::info!(?event, "shutdown signal received");
        })
        .await
        .map_err(|source| ServerError::Serve { source })?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: BANNER_MESSAGE,
        endpoints: BannerEndpoints {
            scrape: SCRAPE_PATH,
            health: HEALTH_PATH,
        },
        usage: USAGE,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS,
        timestamp: timestamp(),
        service: SERVICE_NAME,
    })
}

async fn scrape_videos(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Response {
    let window = PageWindow::new(params.remove("start"), params.remove("limit"));

    match state.scraper.scrape(&window).await {
        Ok(data) => Json(ScrapeSuccess {
            success: true,
            count: data.len(),
            data,
            timestamp: timestamp(),
        })
        .into_response(),
        Err(error) => {
            tracing::error!(%error, start = %window.start, limit = %window.limit, "scrape request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScrapeFailure {
                    success: false,
                    error: error.to_string(),
                    timestamp: timestamp(),
                }),
            )
                .into_response()
        }
    }
}

async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: ERROR_NOT_FOUND,
        }),
    )
        .into_response()
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(%detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(InternalError {
            success: false,
            error: ERROR_INTERNAL,
        }),
    )
        .into_response()
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn wait_for_shutdown() -> ShutdownEvent {
    let ctrl_c = shutdown_on(tokio::signal::ctrl_c(), ShutdownEvent::CtrlC);

    #[cfg(unix)]
    let sigterm = shutdown_on(
        async {
            use tokio::signal::unix::{SignalKind, signal};

            let mut term = signal(SignalKind::terminate())?;
            match term.recv().await {
                Some(()) => Ok::<(), std::io::Error>(()),
                None => Err(std::io::Error::other("SIGTERM stream ended")),
            }
        },
        ShutdownEvent::SigTerm,
    );

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<ShutdownEvent>();

    tokio::select! {
        event = ctrl_c => event,
        event = sigterm => event,
    }
}

/// Resolves to `event` once `signal` fires
///
/// A listener that fails to install stays pending so the server keeps
/// running on the remaining signals.
async fn shutdown_on<F>(signal: F, event: ShutdownEvent) -> ShutdownEvent
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => event,
        Err(error) => {
            tracing::warn!(%error, ?event, "failed to listen for shutdown signal");
            std::future::pending().await
        }
    }
}
