// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  The dashboard snapshot is read-only;
// the only write is the trend-chart selection.
//
// CORS is configured permissively so a locally served front end can reach
// the API.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::kpi::Kpi;

type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/kpis", get(kpis))
        .route("/api/v1/records", get(records))
        .route("/api/v1/risks", get(risks))
        .route("/api/v1/trend", get(trend))
        .route("/api/v1/selection", get(get_selection).post(set_selection))
        .layer(cors)
        .with_state(state)
}

fn bad_kpi(raw: &str) -> ApiError {
    warn!(kpi = %raw, "rejected unknown KPI");
    let known: Vec<_> = Kpi::ALL.iter().map(|k| k.key()).collect();
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": format!("Unknown KPI '{raw}'"),
            "known": known,
        })),
    )
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Dashboard data
// =============================================================================

async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::to_value(state.build_snapshot()).unwrap_or_default())
}

async fn kpis(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard.definitions.clone())
}

async fn records(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard.records.clone())
}

async fn risks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard.risks.clone())
}

// =============================================================================
// Trend chart
// =============================================================================

#[derive(Deserialize)]
struct TrendQuery {
    #[serde(default)]
    kpi: Option<String>,
}

async fn trend(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kpi = match query.kpi.as_deref() {
        Some(raw) => Some(raw.parse::<Kpi>().map_err(|_| bad_kpi(raw))?),
        None => None,
    };

    match state.trend(kpi) {
        Some(chart) => Ok(Json(chart)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "No data for the requested KPI" })),
        )),
    }
}

// =============================================================================
// Selection
// =============================================================================

#[derive(Serialize)]
struct SelectionResponse {
    kpi: Kpi,
    name: &'static str,
    changed: bool,
    state_version: u64,
}

#[derive(Deserialize)]
struct SelectionRequest {
    kpi: String,
}

async fn get_selection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let kpi = state.selected_kpi();
    Json(SelectionResponse {
        kpi,
        name: kpi.name(),
        changed: false,
        state_version: state.current_state_version(),
    })
}

async fn set_selection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kpi = req.kpi.parse::<Kpi>().map_err(|_| bad_kpi(&req.kpi))?;
    let changed = state.select_kpi(kpi);

    Ok(Json(SelectionResponse {
        kpi,
        name: kpi.name(),
        changed,
        state_version: state.current_state_version(),
    }))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use crate::dashboard::Dashboard;
    use crate::runtime_config::RuntimeConfig;

    fn app_state() -> Arc<AppState> {
        let cfg = RuntimeConfig {
            seed: Some(17),
            ..RuntimeConfig::default()
        };
        Arc::new(AppState::new(Dashboard::build(&cfg).unwrap(), Kpi::Uptime))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(router(app_state()), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["state_version"], 1);
    }

    #[tokio::test]
    async fn dashboard_has_records_and_selection() {
        let (status, body) = call(router(app_state()), get("/api/v1/dashboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"].as_array().unwrap().len(), 6);
        assert_eq!(body["definitions"].as_array().unwrap().len(), 4);
        assert_eq!(body["selected_kpi"], "uptime");
        assert_eq!(body["trend"]["kpi"], "uptime");
        assert_eq!(body["records"][0]["month_label"], "Feb 2025");
    }

    #[tokio::test]
    async fn records_and_risks_endpoints() {
        let state = app_state();
        let (status, body) = call(router(state.clone()), get("/api/v1/records")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);

        let (status, body) = call(router(state.clone()), get("/api/v1/risks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), state.dashboard.risks.len());

        let (status, body) = call(router(state), get("/api/v1/kpis")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[1]["name"], "TAT (hrs)");
        assert_eq!(body[1]["direction"], "LowerIsBetter");
    }

    #[tokio::test]
    async fn trend_by_query_and_by_selection() {
        let state = app_state();
        let (status, body) = call(router(state.clone()), get("/api/v1/trend?kpi=tat")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kpi"], "tat");
        assert_eq!(body["target"], 24.0);
        assert_eq!(body["points"].as_array().unwrap().len(), 6);

        let (status, body) = call(router(state), get("/api/v1/trend")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kpi"], "uptime");
    }

    #[tokio::test]
    async fn trend_rejects_unknown_kpi() {
        let (status, body) = call(router(app_state()), get("/api/v1/trend?kpi=revenue")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("revenue"));
    }

    #[tokio::test]
    async fn selection_change_bumps_version() {
        let state = app_state();
        let (status, body) = call(
            router(state.clone()),
            post_json("/api/v1/selection", serde_json::json!({ "kpi": "Error Rate %" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kpi"], "error_rate");
        assert_eq!(body["changed"], true);
        assert_eq!(body["state_version"], 2);

        let (_, body) = call(router(state), get("/api/v1/selection")).await;
        assert_eq!(body["kpi"], "error_rate");
        assert_eq!(body["name"], "Error Rate %");
    }

    #[tokio::test]
    async fn selection_rejects_unknown_kpi() {
        let state = app_state();
        let (status, _) = call(
            router(state.clone()),
            post_json("/api/v1/selection", serde_json::json!({ "kpi": "nps" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.selected_kpi(), Kpi::Uptime);
        assert_eq!(state.current_state_version(), 1);
    }
}
