use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::checkin::CheckInService;
use crate::scoring::AnalyzeError;
use crate::transcribe::DEFAULT_AUDIO_TYPE;
use crate::utils::log_db_error;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong while analyzing your check-in";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub owner: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    pub owner: String,
}

pub fn build_router(service: CheckInService) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/analyze_audio", post(analyze_audio))
        .route("/api/check-ins/{owner}", get(history))
        .route("/api/stats", get(stats))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn analyze_error_response(error: AnalyzeError) -> Response {
    match error {
        AnalyzeError::Rejected(filter) => error_response(StatusCode::BAD_REQUEST, &filter.message()),
        AnalyzeError::Internal(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// POST /analyze
async fn analyze(
    State(service): State<CheckInService>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    match service.submit_async(request.owner, request.text).await {
        Ok(submitted) => (StatusCode::OK, Json(submitted)).into_response(),
        Err(e) => analyze_error_response(e),
    }
}

/// POST /analyze_audio?owner= with the raw recording as the body.
async fn analyze_audio(
    State(service): State<CheckInService>,
    Query(query): Query<AudioQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_AUDIO_TYPE)
        .to_string();

    match service
        .submit_audio(query.owner, body.to_vec(), &content_type)
        .await
    {
        Ok(submitted) => (StatusCode::OK, Json(submitted)).into_response(),
        Err(e) => analyze_error_response(e),
    }
}

/// GET /api/check-ins/{owner}
async fn history(State(service): State<CheckInService>, Path(owner): Path<String>) -> Response {
    let result = tokio::task::spawn_blocking(move || service.history(&owner)).await;
    match result {
        Ok(Ok(records)) => {
            let total = records.len();
            Json(serde_json::json!({ "check_ins": records, "total": total })).into_response()
        }
        Ok(Err(e)) => {
            log_db_error(&format!("History query failed: {e:#}"));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load check-ins")
        }
        Err(e) => {
            log_db_error(&format!("History task failed: {e}"));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load check-ins")
        }
    }
}

/// GET /api/stats, across all owners unless `owner` is given.
async fn stats(State(service): State<CheckInService>, Query(query): Query<OwnerQuery>) -> Response {
    let result =
        tokio::task::spawn_blocking(move || service.stats(query.owner.as_deref())).await;
    match result {
        Ok(Ok(stats)) => Json(stats).into_response(),
        Ok(Err(e)) => {
            log_db_error(&format!("Stats query failed: {e:#}"));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load statistics")
        }
        Err(e) => {
            log_db_error(&format!("Stats task failed: {e}"));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load statistics")
        }
    }
}

async fn health(State(service): State<CheckInService>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "emotion_model": service.analyzer().emotions_available(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_pool, run_migrations};
    use crate::scoring::Analyzer;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    async fn spawn_server() -> (TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkins.db");
        let pool = establish_pool(path.to_str().unwrap(), 2).unwrap();
        run_migrations(&mut pool.get().unwrap()).unwrap();
        let service = CheckInService::new(pool, Analyzer::offline(), None);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(service)).await.unwrap();
        });
        (dir, format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_analyze_then_history_and_stats() {
        let (_dir, base) = spawn_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/analyze"))
            .json(&serde_json::json!({
                "owner": "alice",
                "text": "I'm a bit tired and busy but I'll be fine, mostly handling it",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["analysis"]["mood"]["level"], "GREAT MOOD");
        assert_eq!(body["analysis"]["stress"]["level"], "LOW STRESS");
        assert!(body["record_id"].is_number());

        let history: serde_json::Value = client
            .get(format!("{base}/api/check-ins/alice"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history["total"], 1);
        assert_eq!(history["check_ins"][0]["mood_score"], 100);

        let stats: serde_json::Value = client
            .get(format!("{base}/api/stats?owner=alice"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["count"], 1);
        assert_eq!(stats["average_mood"], 100.0);
    }

    #[tokio::test]
    async fn test_short_text_is_bad_request() {
        let (_dir, base) = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/analyze"))
            .json(&serde_json::json!({ "owner": "alice", "text": "meh" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("at least 10 characters"));

        let stats: serde_json::Value = reqwest::get(format!("{base}/api/stats"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["count"], 0);
        assert!(stats["average_mood"].is_null());
    }

    #[tokio::test]
    async fn test_audio_without_transcriber_is_internal_error() {
        let (_dir, base) = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/analyze_audio?owner=alice"))
            .header("content-type", "audio/webm")
            .body(vec![1u8, 2, 3])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, base) = spawn_server().await;
        let body: serde_json::Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["emotion_model"], false);
    }
}
