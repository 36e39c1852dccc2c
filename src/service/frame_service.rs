//! Frame Service - the per-frame processing pipeline
//!
//! Orchestrates decode, landmark detection, overlay drawing, optional
//! classification, and re-encoding. Each request is stateless and
//! independent; the only shared state is the read-only inference
//! backend established at startup.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use image::DynamicImage;
use tracing::warn;

use crate::engine::classifier::Classification;
use crate::engine::preprocess::decode_image;
use crate::engine::PoseBackend;
use crate::error::ProcessError;
use crate::overlay::Overlay;
use crate::utils::image::{decode_data_url, encode_jpeg, to_jpeg_data_url};

use super::types::*;

/// Pose frame processing service
pub struct FrameService<B: PoseBackend> {
    backend: Arc<B>,
    overlay: Arc<Overlay>,
}

impl<B: PoseBackend> FrameService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            overlay: Arc::new(Overlay::default()),
        }
    }

    /// Process one frame. `image_field` is the raw `image` value from
    /// the request body, or `None` when the field was absent.
    pub async fn process(&self, image_field: Option<String>) -> Result<FrameOutcome, ProcessError> {
        let payload = image_field.ok_or(ProcessError::MissingInput)?;

        let backend = self.backend.clone();
        let overlay = self.overlay.clone();
        tokio::task::spawn_blocking(move || process_frame(&*backend, &overlay, &payload))
            .await
            .map_err(|e| ProcessError::Internal(anyhow!("Frame task failed: {e}")))?
    }

    /// Get health status
    pub fn health(&self) -> HealthResult {
        let mut models_loaded = HashMap::new();
        models_loaded.insert("landmarker".to_string(), true);
        models_loaded.insert("classifier".to_string(), self.backend.has_classifier());

        HealthResult {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            models_loaded,
        }
    }
}

/// The synchronous pipeline body, run on a blocking worker thread.
fn process_frame<B: PoseBackend>(
    backend: &B,
    overlay: &Overlay,
    payload: &str,
) -> Result<FrameOutcome, ProcessError> {
    let image_bytes = decode_data_url(payload).map_err(|e| {
        warn!("Image decoding error: {:#}", e);
        ProcessError::InvalidImage
    })?;
    let frame = decode_image(&image_bytes).map_err(|e| {
        warn!("Image decoding error: {:#}", e);
        ProcessError::InvalidImage
    })?;

    let detection = backend.detect_landmarks(&frame)?;

    // Overlays go on a fresh copy of the decoded frame, never on any
    // buffer the detector touched.
    let mut annotated = frame.to_rgb8();

    let mut landmarks_detected = false;
    let mut classification = Classification::unknown();

    if let Some(landmarks) = detection {
        landmarks_detected = true;
        overlay.draw_skeleton(&mut annotated, &landmarks);

        if backend.has_classifier() {
            match backend.classify(&landmarks) {
                Ok(cls) => {
                    overlay.draw_prediction(&mut annotated, &cls);
                    classification = cls;
                }
                Err(e) => {
                    // Contained failure: marker + fallback values, the
                    // request itself still succeeds.
                    warn!("Error during pose classification: {:#}", e);
                    overlay.draw_classification_error(&mut annotated);
                }
            }
        }
    }

    let jpeg = encode_jpeg(&DynamicImage::ImageRgb8(annotated))?;

    Ok(FrameOutcome {
        processed_image: to_jpeg_data_url(&jpeg),
        landmarks_detected,
        pose_class: classification.label,
        pose_confidence: classification.confidence,
    })
}
