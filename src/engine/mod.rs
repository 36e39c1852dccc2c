//! Inference engine module
//!
//! OpenVINO-backed pose landmark detection and classification. Models
//! are compiled once at startup; the classifier bundle is an optional
//! capability and its absence puts the engine in detection-only mode.

pub mod classifier;
pub mod landmarker;
pub mod models;
pub mod preprocess;

use anyhow::{Context, Result};
use image::DynamicImage;
use tracing::{info, warn};

use crate::config::Config;

pub use classifier::{Classification, PoseClassifier, Preprocessors};
pub use landmarker::{LandmarkSet, PoseLandmarker};

/// Inference seam between the HTTP pipeline and the model runtime.
/// Implementations must be callable from blocking worker threads.
pub trait PoseBackend: Send + Sync + 'static {
    /// Detect the pose in a frame; `None` is the no-pose outcome.
    fn detect_landmarks(&self, image: &DynamicImage) -> Result<Option<LandmarkSet>>;

    /// Score a detected pose. Callers must check `has_classifier`
    /// first; calling without a loaded bundle is a logic error.
    fn classify(&self, landmarks: &LandmarkSet) -> Result<Classification>;

    /// Whether the classifier bundle loaded at startup.
    fn has_classifier(&self) -> bool;
}

/// Process-wide inference state: the landmarker plus the optional
/// classifier bundle.
pub struct PoseEngine {
    landmarker: PoseLandmarker,
    classifier: Option<PoseClassifier>,
}

impl PoseEngine {
    /// Load models per the configuration. The landmarker is the core
    /// capability and must load; classifier bundle failure only
    /// downgrades to detection-only mode.
    pub fn load(config: &Config) -> Result<Self> {
        let mut compiler = models::ModelCompiler::new(&config.inference.device)?;

        let landmarker_model = compiler
            .compile(&config.landmarker_path())
            .context("Failed to load pose landmark model")?;
        let landmarker =
            PoseLandmarker::new(landmarker_model, config.inference.detection_confidence);

        let classifier = match Self::load_classifier(config, &mut compiler) {
            Ok(classifier) => {
                info!("Pose classifier loaded from {}", config.models.dir.display());
                Some(classifier)
            }
            Err(e) => {
                warn!("Classifier unavailable, running detection-only: {:#}", e);
                None
            }
        };

        Ok(Self {
            landmarker,
            classifier,
        })
    }

    fn load_classifier(
        config: &Config,
        compiler: &mut models::ModelCompiler,
    ) -> Result<PoseClassifier> {
        let preprocessors = Preprocessors::load(&config.preprocessors_path())?;
        let model = compiler.compile(&config.classifier_path())?;
        Ok(PoseClassifier::new(model, preprocessors))
    }
}

impl PoseBackend for PoseEngine {
    fn detect_landmarks(&self, image: &DynamicImage) -> Result<Option<LandmarkSet>> {
        self.landmarker.detect(image)
    }

    fn classify(&self, landmarks: &LandmarkSet) -> Result<Classification> {
        let classifier = self
            .classifier
            .as_ref()
            .context("Classifier bundle not loaded")?;
        classifier.classify(landmarks)
    }

    fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }
}
