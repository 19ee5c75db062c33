//! sentio-core — Power-aware facial emotion analysis engine.
//!
//! Uses a lightweight UltraFace detector for face localization and a FER
//! CNN for emotion classification, both running via ONNX Runtime. The
//! [`pipeline::FrameAnalysisPipeline`] orchestrates them per frame under an
//! externally supplied [`types::PowerMode`]: high power classifies every
//! located face, low power reports presence only and never touches the
//! deep model.

pub mod classifier;
pub mod frame;
pub mod locator;
pub mod pipeline;
pub mod resolver;
pub mod types;

pub use classifier::{ClassifierError, EmotionClassifier, OnnxEmotionClassifier};
pub use frame::RgbFrame;
pub use locator::{FaceLocator, LocatorError, OnnxFaceLocator};
pub use pipeline::FrameAnalysisPipeline;
pub use types::{
    Annotation, Emotion, EmotionDistribution, FrameSummary, InvalidModeError, PowerMode, Region,
    ResolvedEmotion,
};

/// Default directory for ONNX model files.
pub fn default_model_dir() -> std::path::PathBuf {
    std::path::PathBuf::from("/usr/share/sentio/models")
}
