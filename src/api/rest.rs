//! Axum REST API handlers

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::engine::PoseBackend;
use crate::service::FrameService;

use super::dto::*;

/// Application state shared across handlers
pub struct AppState<B: PoseBackend> {
    pub service: Arc<FrameService<B>>,
}

/// Create the REST API router
pub fn create_rest_router<B: PoseBackend>(state: Arc<AppState<B>>) -> Router {
    Router::new()
        .route("/process_frame", post(process_frame_handler::<B>))
        .route("/health", get(health_handler::<B>))
        // Landing page and browser assets
        .route_service("/", ServeFile::new("static/index.html"))
        .nest_service("/static", ServeDir::new("static"))
        // Middleware
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Process a single webcam frame
async fn process_frame_handler<B: PoseBackend>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<ProcessFrameRequest>,
) -> Result<Json<ProcessFrameResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state.service.process(request.image).await.map_err(|e| {
        let status = if e.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Error processing frame: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse::new(e.to_string())))
    })?;

    Ok(Json(ProcessFrameResponse {
        processed_image: outcome.processed_image,
        landmarks_detected: outcome.landmarks_detected,
        pose_class: outcome.pose_class,
        pose_confidence: outcome.pose_confidence,
    }))
}

/// Health check
async fn health_handler<B: PoseBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<HealthResponse> {
    let health = state.service.health();

    Json(HealthResponse {
        healthy: health.healthy,
        version: health.version,
        models_loaded: health.models_loaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::frame_service::tests::{solid_frame_data_url, StubBackend};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router_with(backend: StubBackend) -> Router {
        let service = Arc::new(FrameService::new(Arc::new(backend)));
        create_rest_router(Arc::new(AppState { service }))
    }

    async fn post_frame(router: Router, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/process_frame")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_image_field_is_400() {
        let (status, body) = post_frame(router_with(StubBackend::no_pose()), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No image data received"}));
    }

    #[tokio::test]
    async fn test_malformed_base64_is_400() {
        let (status, body) = post_frame(
            router_with(StubBackend::no_pose()),
            json!({"image": "data:image/jpeg;base64,!!!notbase64!!!"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid image data"}));
    }

    #[tokio::test]
    async fn test_solid_frame_without_person() {
        let (status, body) = post_frame(
            router_with(StubBackend::no_pose()),
            json!({"image": solid_frame_data_url(640, 480)}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["landmarks_detected"], json!(false));
        assert_eq!(body["pose_class"], json!("Unknown"));
        assert_eq!(body["pose_confidence"], json!(0.0));
        assert!(body["processed_image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_detected_pose_with_classification() {
        let (status, body) = post_frame(
            router_with(StubBackend::with_pose()),
            json!({"image": solid_frame_data_url(320, 240)}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["landmarks_detected"], json!(true));
        assert_eq!(body["pose_class"], json!("squat"));
    }

    #[tokio::test]
    async fn test_degraded_mode_still_returns_200_with_fallbacks() {
        let (status, body) = post_frame(
            router_with(StubBackend::detection_only()),
            json!({"image": solid_frame_data_url(320, 240)}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["landmarks_detected"], json!(true));
        assert_eq!(body["pose_class"], json!("Unknown"));
        assert_eq!(body["pose_confidence"], json!(0.0));
    }

    #[tokio::test]
    async fn test_health_reflects_classifier_state() {
        let response = router_with(StubBackend::detection_only())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["healthy"], json!(true));
        assert_eq!(body["models_loaded"]["classifier"], json!(false));
        assert_eq!(body["models_loaded"]["landmarker"], json!(true));
    }
}
