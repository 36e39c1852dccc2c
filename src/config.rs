//! Pose feedback service configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable overriding the model artifact directory.
pub const MODEL_DIR_ENV: &str = "MODEL_DIR";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub device: String,
    /// Minimum pose presence score for a detection to count.
    pub detection_confidence: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory holding the model artifacts. Overridden by `MODEL_DIR`.
    pub dir: PathBuf,
    /// Pose landmark model, relative to `dir`.
    pub landmarker: PathBuf,
    /// Pose classifier network, relative to `dir`. Optional capability:
    /// load failure degrades to detection-only mode.
    pub classifier: PathBuf,
    /// Scaler + label encoder bundle paired with the classifier.
    pub preprocessors: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: "CPU".to_string(),
            detection_confidence: 0.5,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            landmarker: PathBuf::from("pose_landmarker.onnx"),
            classifier: PathBuf::from("classifier.onnx"),
            preprocessors: PathBuf::from("preprocessors.json"),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }

    /// Apply environment overrides (`MODEL_DIR`).
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(MODEL_DIR_ENV) {
            if !dir.is_empty() {
                self.models.dir = PathBuf::from(dir);
            }
        }
    }

    pub fn landmarker_path(&self) -> PathBuf {
        self.models.dir.join(&self.models.landmarker)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.models.dir.join(&self.models.classifier)
    }

    pub fn preprocessors_path(&self) -> PathBuf {
        self.models.dir.join(&self.models.preprocessors)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            server: ServerConfig::default(),
            inference: InferenceConfig::default(),
            models: ModelsConfig::default(),
        };
        config.apply_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_paths_join_dir() {
        let mut config = Config::default();
        config.models.dir = PathBuf::from("/opt/models");
        assert_eq!(
            config.classifier_path(),
            PathBuf::from("/opt/models/classifier.onnx")
        );
        assert_eq!(
            config.preprocessors_path(),
            PathBuf::from("/opt/models/preprocessors.json")
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [server]
            port = 9100

            [inference]
            device = "GPU"
            detection_confidence = 0.6

            [models]
            dir = "artifacts"
            landmarker = "pose.onnx"
            classifier = "cls.onnx"
            preprocessors = "prep.json"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.inference.device, "GPU");
        assert_eq!(config.landmarker_path(), PathBuf::from("artifacts/pose.onnx"));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9200\n").unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.inference.device, "CPU");
        assert_eq!(config.models.landmarker, PathBuf::from("pose_landmarker.onnx"));
    }
}
