//! HTTP surface for the property query pipeline.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/properties` | Sold properties and market insights for a postcode |
//! | `GET`  | `/api/properties` | Endpoint descriptor (rate limit, cache time) |
//! | `GET`  | `/health` | Health check (returns version) |

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::models::QueryResult;
use crate::service::PropertyService;

const API_VERSION: &str = "2.0";

/// Shared state handed to every handler
#[derive(Clone)]
struct AppState {
    service: Arc<PropertyService>,
}

/// Build the router around an existing service
pub fn router(service: Arc<PropertyService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/properties",
            get(handle_describe).post(handle_query),
        )
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

/// Bind to `config.bind` and serve until the process is stopped
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(PropertyService::from_config(config)?);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("🏠 PropIndex listening on http://{}", config.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Rate-limit key for a request: first forwarded-for address, then the
/// real-IP header, then `"unknown"`
pub fn client_address(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or("unknown")
        .to_string()
}

// ============ POST /api/properties ============

async fn handle_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<QueryResult>, AppError> {
    let client = client_address(&headers);
    let result = state.service.handle(&client, &body).await?;
    Ok(Json(result))
}

// ============ GET /api/properties ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiDescriptor {
    message: &'static str,
    version: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
    rate_limit: String,
    cache_time: String,
}

fn describe_rate(limit: u32, window: Duration) -> String {
    match window.as_secs() {
        60 => format!("{} requests per minute", limit),
        secs => format!("{} requests per {} seconds", limit, secs),
    }
}

async fn handle_describe(State(state): State<AppState>) -> Json<ApiDescriptor> {
    let (limit, window) = state.service.rate_limit();

    Json(ApiDescriptor {
        message: "PropertyData API endpoint",
        version: API_VERSION,
        endpoints: BTreeMap::from([
            ("GET", "/api/properties - Describe this endpoint"),
            ("POST", "/api/properties - Fetch property data"),
        ]),
        rate_limit: describe_rate(limit, window),
        cache_time: format!("{} seconds", state.service.cache_ttl().as_secs()),
    })
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
