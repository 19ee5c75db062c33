//! Deep emotion classification via ONNX Runtime.
//!
//! Runs a FER-class CNN over a cropped face region, producing raw
//! per-category scores on a 0–100 scale. This is the expensive half of the
//! power trade-off; it only ever runs in high-power mode.

use crate::frame::{luma, RgbFrame};
use crate::types::{Emotion, EmotionDistribution};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const FER_INPUT_SIZE: usize = 48;
const FER_CATEGORY_COUNT: usize = Emotion::ALL.len();
/// Softmax probabilities are rescaled to percentage-like units so scores
/// are comparable against the compound-label gap.
const FER_SCORE_SCALE: f32 = 100.0;

/// Expected, recoverable classification failures. The pipeline skips the
/// affected region on any of these; anything else (panic, OOM) propagates.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("model file not found: {0} — download a FER emotion model and place in the model dir")]
    ModelNotFound(String),
    #[error("crop is empty or malformed: {0}")]
    InvalidCrop(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Emotion classification seam.
pub trait EmotionClassifier {
    /// Score one cropped face region. The crop must be at least 1×1.
    fn classify(&mut self, crop: &RgbFrame) -> Result<EmotionDistribution, ClassifierError>;
}

/// FER-based emotion classifier.
pub struct OnnxEmotionClassifier {
    session: Session,
}

impl OnnxEmotionClassifier {
    /// Load the FER ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, ClassifierError> {
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded FER model"
        );

        Ok(Self { session })
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, crop: &RgbFrame) -> Result<EmotionDistribution, ClassifierError> {
        if crop.width == 0 || crop.height == 0 {
            return Err(ClassifierError::InvalidCrop("zero-sized crop".into()));
        }
        let expected = crop.width as usize * crop.height as usize * 3;
        if crop.data.len() != expected {
            return Err(ClassifierError::InvalidCrop(format!(
                "buffer length {} does not match {}x{} RGB",
                crop.data.len(),
                crop.width,
                crop.height
            )));
        }

        let input = preprocess(crop);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("emotion logits: {e}")))?;

        if raw.len() != FER_CATEGORY_COUNT {
            return Err(ClassifierError::InferenceFailed(format!(
                "expected {FER_CATEGORY_COUNT} category logits, got {}",
                raw.len()
            )));
        }

        let probs = softmax(raw);

        Ok(Emotion::ALL
            .iter()
            .zip(probs)
            .map(|(&e, p)| (e, p * FER_SCORE_SCALE))
            .collect())
    }
}

/// Convert the crop to grayscale, bilinear-resize to 48×48, scale to [0, 1].
fn preprocess(crop: &RgbFrame) -> Array4<f32> {
    let size = FER_INPUT_SIZE;
    let (src_w, src_h) = (crop.width as usize, crop.height as usize);
    let scale_x = src_w as f32 / size as f32;
    let scale_y = src_h as f32 / size as f32;

    let mut tensor = Array4::<f32>::zeros((1, 1, size, size));

    for y in 0..size {
        let src_y = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..size {
            let src_x = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let gray_at = |yy: usize, xx: usize| -> f32 {
                let px = (yy * src_w + xx) * 3;
                luma(crop.data[px], crop.data[px + 1], crop.data[px + 2]) as f32
            };

            let tl = gray_at(y0, x0);
            let tr = gray_at(y0, x1);
            let bl = gray_at(y1, x0);
            let br = gray_at(y1, x1);

            let val = tl * (1.0 - fx) * (1.0 - fy)
                + tr * fx * (1.0 - fy)
                + bl * (1.0 - fx) * fy
                + br * fx * fy;

            tensor[[0, 0, y, x]] = val / 255.0;
        }
    }

    tensor
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 4.0, 1.0, 0.5, 2.5]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_softmax_orders_by_logit() {
        let probs = softmax(&[0.1, 3.0, 1.0]);
        assert!(probs[1] > probs[2]);
        assert!(probs[2] > probs[0]);
    }

    #[test]
    fn test_softmax_uniform_logits() {
        let probs = softmax(&[5.0; 7]);
        for p in probs {
            assert!((p - 1.0 / 7.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let crop = RgbFrame::filled(30, 40, [200, 100, 50]);
        let tensor = preprocess(&crop);
        assert_eq!(tensor.shape(), &[1, 1, FER_INPUT_SIZE, FER_INPUT_SIZE]);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_preprocess_uniform_crop_is_uniform() {
        let crop = RgbFrame::filled(10, 10, [128, 128, 128]);
        let tensor = preprocess(&crop);
        let first = tensor[[0, 0, 0, 0]];
        assert!(tensor.iter().all(|&v| (v - first).abs() < 1e-6));
    }

    #[test]
    fn test_preprocess_handles_tiny_crop() {
        // 1x1 crop must upscale without indexing past the source.
        let crop = RgbFrame::filled(1, 1, [60, 60, 60]);
        let tensor = preprocess(&crop);
        assert!((tensor[[0, 0, 47, 47]] - 60.0 / 255.0).abs() < 1e-5);
    }
}
