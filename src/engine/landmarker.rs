//! Pose landmark detection
//!
//! Runs a single-person full-body landmark model (BlazePose topology:
//! 33 landmarks) and maps its output back into normalized coordinates
//! of the original frame. Zero or one pose per frame: the model scores
//! pose presence for the whole input, and multi-person frames yield the
//! most prominent subject only. This is a fixed constraint of the
//! chosen model, not a parameter.

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};

use crate::utils::math::sigmoid;

use super::models::{make_input_tensor, read_tensor_f32, SafeCompiledModel};
use super::preprocess::{preprocess_for_landmarks, Letterbox, LANDMARKER_INPUT_SIZE};

/// Number of landmarks produced per pose
pub const LANDMARK_COUNT: usize = 33;

/// Raw values per landmark in the model output (x, y, z, visibility, presence)
const RAW_VALUES_PER_LANDMARK: usize = 5;

/// Named anatomical keypoints, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

/// Skeleton connections between landmark indices (BlazePose topology)
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// A single landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the hip midpoint, same scale as x
    pub z: f32,
    /// Likelihood the landmark is visible (not occluded), in [0, 1]
    pub visibility: f32,
}

/// Ordered set of 33 landmarks for one detected pose. Immutable once
/// produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        debug_assert_eq!(landmarks.len(), LANDMARK_COUNT);
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, which: PoseLandmark) -> &Landmark {
        &self.landmarks[which as usize]
    }

    /// Flatten into the classifier feature vector: x, y, z, visibility
    /// per landmark, concatenated in landmark order.
    pub fn to_feature_vector(&self) -> Vec<f32> {
        let mut features = Vec::with_capacity(self.landmarks.len() * 4);
        for lm in &self.landmarks {
            features.extend_from_slice(&[lm.x, lm.y, lm.z, lm.visibility]);
        }
        features
    }
}

/// Pose landmark detector
#[derive(Clone)]
pub struct PoseLandmarker {
    model: SafeCompiledModel,
    detection_confidence: f32,
}

impl PoseLandmarker {
    pub fn new(model: SafeCompiledModel, detection_confidence: f32) -> Self {
        Self {
            model,
            detection_confidence,
        }
    }

    /// Detect the pose in a frame. `None` means no pose present, which
    /// is a valid outcome rather than an error.
    pub fn detect(&self, image: &DynamicImage) -> Result<Option<LandmarkSet>> {
        let letterbox = Letterbox::new(image.dimensions(), LANDMARKER_INPUT_SIZE);
        let input = preprocess_for_landmarks(image)?;

        let mut request = self.model.create_infer_request()?;
        let (w, h) = LANDMARKER_INPUT_SIZE;
        let tensor = make_input_tensor(
            &[1, 3, h as i64, w as i64],
            input.as_slice().context("Input tensor not contiguous")?,
        )?;
        request.set_input_tensor(&tensor)?;
        request.infer()?;

        // Output 0: raw landmarks (33 x 5 values, possibly followed by
        // auxiliary keypoints), output 1: [1, 1] pose presence score
        let raw = read_tensor_f32(&request.get_output_tensor_by_index(0)?)?;
        let score = read_tensor_f32(&request.get_output_tensor_by_index(1)?)?
            .first()
            .copied()
            .unwrap_or(0.0);

        if score < self.detection_confidence {
            tracing::debug!("No pose detected (score {:.3})", score);
            return Ok(None);
        }

        let set = parse_landmarks(&raw, &letterbox)?;
        Ok(Some(set))
    }
}

/// Parse the raw landmark tensor. The model emits 33 x 5 values:
/// x, y, z in input pixels, then visibility and presence logits.
/// Coordinates are unletterboxed into normalized frame space.
pub(crate) fn parse_landmarks(raw: &[f32], letterbox: &Letterbox) -> Result<LandmarkSet> {
    anyhow::ensure!(
        raw.len() >= LANDMARK_COUNT * RAW_VALUES_PER_LANDMARK,
        "Landmark tensor too short: {} values",
        raw.len()
    );

    let input_w = LANDMARKER_INPUT_SIZE.0 as f32;
    let content_scale = input_w / letterbox.content_width as f32;

    let mut landmarks = Vec::with_capacity(LANDMARK_COUNT);
    for i in 0..LANDMARK_COUNT {
        let base = i * RAW_VALUES_PER_LANDMARK;
        let (x, y) = letterbox.to_original_norm(raw[base], raw[base + 1]);
        landmarks.push(Landmark {
            x,
            y,
            // z shares the x pixel scale; normalize it the same way
            z: raw[base + 2] / input_w * content_scale,
            visibility: sigmoid(raw[base + 3]),
        });
    }

    Ok(LandmarkSet::new(landmarks))
}
