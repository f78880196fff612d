use anyhow::Result;

mod security;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, Uri},
    middleware,
    routing::get,
    Json, Router,
};
use giclass_common::{
    Error as CommonError, ErrorResponse, HealthResponse, HealthStatus, ModelStatusResponse,
};
use giclass_config::{
    ensure_directory, format_label, get_settings, init_logging, model_artifact_exists,
    ConditionRegistry, Settings,
};
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::SystemTime;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    conditions: Arc<ConditionRegistry>,
    security_headers: axum::http::HeaderMap,
    start_time: SystemTime,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Filesystem trouble counts as the model being unavailable
    let model_present = model_artifact_exists(&state.settings.model_path).unwrap_or(false);
    let uptime = state.start_time.elapsed().unwrap_or_default().as_secs();

    Json(HealthResponse {
        status: if model_present {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        model_present,
        version: state.settings.app_version.clone(),
        uptime_seconds: uptime,
    })
}

async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "app": state.settings.app_name,
        "version": state.settings.app_version,
        "description": state.settings.app_description,
    }))
}

async fn list_conditions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let summaries: Vec<serde_json::Value> = state
        .conditions
        .labels()
        .iter()
        .map(|label| {
            let info = state.conditions.get(label);
            json!({
                "label": label,
                "display_name": format_label(label),
                "name": info.name,
                "severity": info.severity,
                "color": info.color,
                "icon": info.icon,
            })
        })
        .collect();

    Json(json!({ "conditions": summaries }))
}

/// Full record for one label. The lookup is total: unrecognized labels get
/// the unknown-condition sentinel so the UI always has something to render.
async fn get_condition(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Json<serde_json::Value> {
    let info = state.conditions.get(&label);

    Json(json!({
        "label": label,
        "display_name": format_label(&label),
        "known": state.conditions.contains(&label),
        "info": info,
    }))
}

async fn model_status(
    State(state): State<AppState>,
) -> Result<Json<ModelStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    match model_artifact_exists(&state.settings.model_path) {
        Ok(present) => Ok(Json(ModelStatusResponse {
            present,
            path: state.settings.model_path.display().to_string(),
            input_size: state.settings.model_input_size,
        })),
        Err(err) => Err((
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(ErrorResponse::from(&err)),
        )),
    }
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    let err = CommonError::NotFound(uri.path().to_string());
    (StatusCode::NOT_FOUND, Json(ErrorResponse::from(&err)))
}

fn build_app(state: AppState) -> Router {
    let max_content_length = state.settings.max_content_length;

    Router::new()
        .route("/healthz", get(health_check))
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/conditions", get(list_conditions))
        .route("/conditions/{label}", get(get_condition))
        .route("/model/status", get(model_status))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_content_length))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::apply_security_headers,
        ))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Resolve settings first: a production run without a secret key must
    // abort here, before anything is served
    let settings = get_settings(None)?;

    init_logging(&settings)?;
    info!(
        "Starting {} v{} ({})",
        settings.app_name,
        settings.app_version,
        settings.variant.as_str()
    );

    ensure_directory(&settings.upload_dir)?;

    match model_artifact_exists(&settings.model_path) {
        Ok(true) => info!("Model artifact found at {}", settings.model_path.display()),
        Ok(false) => warn!(
            "Model artifact missing at {}; classification will be unavailable",
            settings.model_path.display()
        ),
        Err(err) => warn!("Could not check model artifact: {err}"),
    }

    let conditions = ConditionRegistry::load_defaults()?;
    info!("Loaded {} condition records", conditions.len());

    let settings = Arc::new(settings);
    let state = AppState {
        security_headers: security::header_map(&settings.security_headers),
        settings: settings.clone(),
        conditions: Arc::new(conditions),
        start_time: SystemTime::now(),
    };

    let app = build_app(state);

    let host: IpAddr = settings.host.parse()?;
    let addr = SocketAddr::from((host, settings.port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
