//! Service layer types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-frame processing result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutcome {
    /// Annotated frame as a JPEG data URL
    pub processed_image: String,
    pub landmarks_detected: bool,
    pub pose_class: String,
    pub pose_confidence: f32,
}

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResult {
    pub healthy: bool,
    pub version: String,
    pub models_loaded: HashMap<String, bool>,
}
