use std::path::PathBuf;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    /// Number of warmup frames to discard at startup (camera AGC/AE stabilization).
    pub warmup_frames: usize,
    /// Face locator confidence threshold.
    pub locator_threshold: f32,
}

impl Config {
    /// Load configuration from `SENTIO_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("SENTIO_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| sentio_core::default_model_dir());

        Self {
            camera_device: std::env::var("SENTIO_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_dir,
            warmup_frames: env_usize("SENTIO_WARMUP_FRAMES", 4),
            locator_threshold: env_f32(
                "SENTIO_LOCATOR_THRESHOLD",
                sentio_core::locator::DEFAULT_CONFIDENCE_THRESHOLD,
            ),
        }
    }

    /// Path to the UltraFace localization model.
    pub fn ultraface_model_path(&self) -> String {
        self.model_dir
            .join("version-RFB-320.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the FER emotion classification model.
    pub fn fer_model_path(&self) -> String {
        self.model_dir
            .join("emotion-fer.onnx")
            .to_string_lossy()
            .into_owned()
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
