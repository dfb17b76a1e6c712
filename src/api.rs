//! REST API server for the productivity mesh
//!
//! A single POST endpoint takes `{type, payload}` and answers with the
//! engine result, either from the delegate agent or the local engines.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::mesh::MeshService;

/// Response header naming who answered: `agent` or `local`
pub const SOURCE_HEADER: &str = "x-mesh-source";

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub mesh: Arc<MeshService>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "agent": state.mesh.has_agent(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Mesh Endpoint
/// =============================

async fn mesh_handler(State(state): State<ApiState>, body: Bytes) -> Response {
    // parsed by hand so a bad body gets the same `{error}` shape as everything else
    let request: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e));
        }
    };

    match state.mesh.dispatch(&request).await {
        Ok((response, source)) => {
            let mut http = (StatusCode::OK, Json(response)).into_response();
            http.headers_mut()
                .insert(SOURCE_HEADER, HeaderValue::from_static(source.as_str()));
            http
        }
        Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!("Mesh request failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(mesh: Arc<MeshService>) -> Router {
    let state = ApiState { mesh };

    Router::new()
        .route("/health", get(health))
        .route("/api/mesh", post(mesh_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    mesh: Arc<MeshService>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(mesh);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(MeshService::default()))
    }

    async fn post_mesh(body: &str) -> (StatusCode, Option<String>, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/mesh")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let source = response
            .headers()
            .get(SOURCE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, source, value)
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["agent"], false);
    }

    #[tokio::test]
    async fn test_unknown_type_is_400() {
        let (status, _, body) = post_mesh(r#"{"type":"nope","payload":{}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Unknown type" }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let (status, _, body) = post_mesh("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_advise_answers_locally() {
        let (status, source, body) = post_mesh(
            r#"{"type":"expense.advise","payload":{"items":[
                {"id":"1","date":"2024-05-01","category":"Dining","description":"Pizza","amount":40},
                {"id":"2","date":"2024-05-03","category":"Groceries","description":"Market","amount":60}
            ],"seed":3}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.as_deref(), Some("local"));
        assert_eq!(body["stats"]["total"], 100.0);
        assert_eq!(body["envelopes"].as_array().unwrap().len(), 2);
        assert!(body["narrative"].is_string());
    }

    #[tokio::test]
    async fn test_add_acknowledges() {
        let (status, _, body) =
            post_mesh(r#"{"type":"expense.add","payload":{"id":"abc","amount":5}}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "id": "abc" }));
    }

    #[tokio::test]
    async fn test_plan_with_missing_payload() {
        let (status, _, body) = post_mesh(r#"{"type":"tasks.plan"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"], json!([]));
        assert_eq!(body["planText"], "- No active tasks to plan.\n");
    }
}
