//! Pose classification
//!
//! The classifier network and its paired preprocessing artifacts
//! (feature scaler and label encoder) form one opaque bundle produced
//! by the training pipeline. The bundle is optional: when it fails to
//! load the service runs in detection-only mode.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::math::{argmax, softmax};

use super::landmarker::{LandmarkSet, LANDMARK_COUNT};
use super::models::{make_input_tensor, read_tensor_f32, SafeCompiledModel};

/// Classifier feature vector length: x, y, z, visibility per landmark
pub const FEATURE_LEN: usize = LANDMARK_COUNT * 4;

/// Classification outcome: the argmax label and its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    /// Fallback when no landmarks were found, no classifier is loaded,
    /// or the scoring stage failed.
    pub fn unknown() -> Self {
        Self {
            label: "Unknown".to_string(),
            confidence: 0.0,
        }
    }
}

/// Standard-score feature scaler fitted during training
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl Scaler {
    pub fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        anyhow::ensure!(
            features.len() == self.mean.len() && features.len() == self.scale.len(),
            "Feature length {} does not match scaler dimensions {}/{}",
            features.len(),
            self.mean.len(),
            self.scale.len()
        );

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}

/// Scaler + label encoder, stored next to the classifier network
#[derive(Debug, Clone, Deserialize)]
pub struct Preprocessors {
    pub scaler: Scaler,
    pub labels: Vec<String>,
}

impl Preprocessors {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preprocessors from {}", path.display()))?;
        let preprocessors: Preprocessors = serde_json::from_str(&content)
            .with_context(|| format!("Malformed preprocessors bundle {}", path.display()))?;

        anyhow::ensure!(
            !preprocessors.labels.is_empty(),
            "Preprocessors bundle has no labels"
        );
        anyhow::ensure!(
            preprocessors.scaler.mean.len() == preprocessors.scaler.scale.len(),
            "Scaler mean/scale dimensions differ"
        );

        Ok(preprocessors)
    }
}

/// Pose classifier backed by the loaded model bundle
#[derive(Clone)]
pub struct PoseClassifier {
    model: SafeCompiledModel,
    preprocessors: Preprocessors,
}

impl PoseClassifier {
    pub fn new(model: SafeCompiledModel, preprocessors: Preprocessors) -> Self {
        Self {
            model,
            preprocessors,
        }
    }

    /// Score a landmark set. Any failure here (shape mismatch,
    /// transform error, inference error) is reported to the caller,
    /// which recovers locally rather than failing the request.
    pub fn classify(&self, landmarks: &LandmarkSet) -> Result<Classification> {
        let features = landmarks.to_feature_vector();
        let scaled = self.preprocessors.scaler.transform(&features)?;

        let mut request = self.model.create_infer_request()?;
        let tensor = make_input_tensor(&[1, scaled.len() as i64], &scaled)?;
        request.set_input_tensor(&tensor)?;
        request.infer()?;

        let logits = read_tensor_f32(&request.get_output_tensor_by_index(0)?)?;
        select_label(&logits, &self.preprocessors.labels)
    }
}

/// Pick the argmax label and its probability from the network output.
/// Normalizes through softmax when the output does not already sum to
/// one, so both logit and probability heads are handled.
pub(crate) fn select_label(output: &[f32], labels: &[String]) -> Result<Classification> {
    anyhow::ensure!(
        output.len() == labels.len(),
        "Classifier output size {} does not match label count {}",
        output.len(),
        labels.len()
    );

    let sum: f32 = output.iter().sum();
    let is_distribution = (sum - 1.0).abs() < 1e-3 && output.iter().all(|v| (0.0..=1.0).contains(v));
    let probs = if is_distribution {
        output.to_vec()
    } else {
        softmax(output)
    };

    let idx = argmax(&probs);
    Ok(Classification {
        label: labels[idx].clone(),
        confidence: probs[idx],
    })
}
