//! REST API request/response data transfer objects

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Process frame request body
///
/// `image` is optional so an absent field maps to the documented
/// "No image data received" error instead of a deserialization reject.
#[derive(Debug, Deserialize)]
pub struct ProcessFrameRequest {
    pub image: Option<String>,
}

/// Process frame response
#[derive(Debug, Serialize)]
pub struct ProcessFrameResponse {
    pub processed_image: String,
    pub landmarks_detected: bool,
    pub pose_class: String,
    pub pose_confidence: f32,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub models_loaded: HashMap<String, bool>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tolerates_missing_image() {
        let req: ProcessFrameRequest = serde_json::from_str("{}").unwrap();
        assert!(req.image.is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::new("Invalid image data")).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Invalid image data"}));
    }
}
