//! Lightweight face localization via ONNX Runtime.
//!
//! Implements an UltraFace-class single-shot detector (RFB-320): cheap
//! enough to run every frame in low-power mode, with score thresholding
//! and NMS post-processing. The heavyweight emotion model never runs here.

use crate::frame::RgbFrame;
use crate::types::Region;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const ULTRAFACE_INPUT_WIDTH: usize = 320;
const ULTRAFACE_INPUT_HEIGHT: usize = 240;
const ULTRAFACE_MEAN: f32 = 127.0;
const ULTRAFACE_STD: f32 = 128.0;
const ULTRAFACE_NMS_THRESHOLD: f32 = 0.4;
/// Default score threshold; overridable per deployment via config.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("model file not found: {0} — download version-RFB-320.onnx and place in the model dir")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Face localization seam.
///
/// Per the collaborator contract this call has no failure mode: it always
/// returns a (possibly empty) region list. Implementations recover from
/// internal errors by returning no regions.
pub trait FaceLocator {
    fn locate(&mut self, frame: &RgbFrame) -> Vec<Region>;
}

/// Candidate box in frame pixel space, pre-NMS.
#[derive(Debug, Clone)]
struct Detection {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

/// UltraFace-based face locator.
pub struct OnnxFaceLocator {
    session: Session,
    confidence_threshold: f32,
}

impl OnnxFaceLocator {
    /// Load the UltraFace ONNX model from the given path.
    pub fn load(model_path: &str, confidence_threshold: f32) -> Result<Self, LocatorError> {
        if !Path::new(model_path).exists() {
            return Err(LocatorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            threshold = confidence_threshold,
            "loaded UltraFace model"
        );

        Ok(Self { session, confidence_threshold })
    }

    fn run(&mut self, frame: &RgbFrame) -> Result<Vec<Region>, LocatorError> {
        let input = preprocess(frame);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        // UltraFace exports two tensors: scores [1, N, 2] and boxes [1, N, 4]
        // with corner coordinates normalized to [0, 1].
        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| LocatorError::InferenceFailed(format!("scores: {e}")))?;
        let (_, boxes) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| LocatorError::InferenceFailed(format!("boxes: {e}")))?;

        let candidates = decode(scores, boxes, frame.width, frame.height, self.confidence_threshold);
        let kept = nms(candidates, ULTRAFACE_NMS_THRESHOLD);

        Ok(kept.iter().map(|d| to_region(d, frame.width, frame.height)).collect())
    }
}

impl FaceLocator for OnnxFaceLocator {
    fn locate(&mut self, frame: &RgbFrame) -> Vec<Region> {
        match self.run(frame) {
            Ok(regions) => regions,
            Err(e) => {
                tracing::warn!(error = %e, "face localization failed; reporting no regions");
                Vec::new()
            }
        }
    }
}

/// Resize the frame to the model input and normalize into a NCHW tensor.
///
/// Bilinear interpolation per channel; normalization matches the UltraFace
/// training distribution ((pixel − 127) / 128).
fn preprocess(frame: &RgbFrame) -> Array4<f32> {
    let (in_w, in_h) = (ULTRAFACE_INPUT_WIDTH, ULTRAFACE_INPUT_HEIGHT);
    let (src_w, src_h) = (frame.width as usize, frame.height as usize);
    let scale_x = src_w as f32 / in_w as f32;
    let scale_y = src_h as f32 / in_h as f32;

    let mut tensor = Array4::<f32>::zeros((1, 3, in_h, in_w));

    for y in 0..in_h {
        let src_y = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..in_w {
            let src_x = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            for c in 0..3 {
                let tl = frame.data[(y0 * src_w + x0) * 3 + c] as f32;
                let tr = frame.data[(y0 * src_w + x1) * 3 + c] as f32;
                let bl = frame.data[(y1 * src_w + x0) * 3 + c] as f32;
                let br = frame.data[(y1 * src_w + x1) * 3 + c] as f32;

                let val = tl * (1.0 - fx) * (1.0 - fy)
                    + tr * fx * (1.0 - fy)
                    + bl * (1.0 - fx) * fy
                    + br * fx * fy;

                tensor[[0, c, y, x]] = (val - ULTRAFACE_MEAN) / ULTRAFACE_STD;
            }
        }
    }

    tensor
}

/// Decode raw score/box tensors into thresholded frame-space candidates.
fn decode(
    scores: &[f32],
    boxes: &[f32],
    frame_width: u32,
    frame_height: u32,
    threshold: f32,
) -> Vec<Detection> {
    let num_anchors = scores.len() / 2;
    let mut detections = Vec::new();

    for idx in 0..num_anchors {
        // scores layout: [background, face] per anchor
        let face_score = scores[idx * 2 + 1];
        if face_score <= threshold {
            continue;
        }

        let off = idx * 4;
        if off + 3 >= boxes.len() {
            continue;
        }

        detections.push(Detection {
            x1: boxes[off] * frame_width as f32,
            y1: boxes[off + 1] * frame_height as f32,
            x2: boxes[off + 2] * frame_width as f32,
            y2: boxes[off + 3] * frame_height as f32,
            score: face_score,
        });
    }

    detections
}

/// Clamp a detection to frame bounds and convert to integer pixel coords.
fn to_region(d: &Detection, frame_width: u32, frame_height: u32) -> Region {
    let x1 = d.x1.max(0.0).min(frame_width as f32);
    let y1 = d.y1.max(0.0).min(frame_height as f32);
    let x2 = d.x2.max(x1).min(frame_width as f32);
    let y2 = d.y2.max(y1).min(frame_height as f32);

    Region {
        x: x1.floor() as u32,
        y: y1.floor() as u32,
        width: (x2 - x1).round() as u32,
        height: (y2 - y1).round() as u32,
    }
}

/// Non-Maximum Suppression: remove overlapping detections.
fn nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if iou(&detections[i], &detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Intersection-over-Union of two candidate boxes.
fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    let union = area_a + area_b - inter;

    if union > 0.0 { inter / union } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Detection {
        Detection { x1, y1, x2, y2, score }
    }

    #[test]
    fn test_iou_identical() {
        let a = det(0.0, 0.0, 100.0, 100.0, 1.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = det(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = det(20.0, 20.0, 30.0, 30.0, 1.0);
        assert!(iou(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_iou_partial() {
        let a = det(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = det(5.0, 0.0, 15.0, 10.0, 1.0);
        // Overlap: 5x10 = 50, union: 100+100-50 = 150
        let expected = 50.0 / 150.0;
        assert!((iou(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let detections = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.9),
            det(5.0, 5.0, 105.0, 105.0, 0.8),
            det(200.0, 200.0, 250.0, 250.0, 0.7),
        ];
        let result = nms(detections, 0.4);
        assert_eq!(result.len(), 2);
        assert!((result[0].score - 0.9).abs() < 1e-6);
        assert!((result[1].score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_nms_empty() {
        assert!(nms(vec![], 0.4).is_empty());
    }

    #[test]
    fn test_decode_thresholds_background_scores() {
        // Two anchors: first is confident background, second is a face.
        let scores = [0.95, 0.05, 0.1, 0.9];
        let boxes = [0.0, 0.0, 0.5, 0.5, 0.25, 0.25, 0.75, 0.75];
        let dets = decode(&scores, &boxes, 320, 240, 0.7);
        assert_eq!(dets.len(), 1);
        assert!((dets[0].score - 0.9).abs() < 1e-6);
        assert!((dets[0].x1 - 80.0).abs() < 1e-3);
        assert!((dets[0].y1 - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_to_region_clamps() {
        let d = det(-10.0, -5.0, 330.0, 250.0, 0.9);
        let r = to_region(&d, 320, 240);
        assert_eq!(r, Region::new(0, 0, 320, 240));
    }

    #[test]
    fn test_preprocess_uniform_frame() {
        let frame = RgbFrame::filled(64, 48, [127, 127, 127]);
        let tensor = preprocess(&frame);
        assert_eq!(tensor.shape(), &[1, 3, ULTRAFACE_INPUT_HEIGHT, ULTRAFACE_INPUT_WIDTH]);
        // (127 - 127) / 128 == 0 everywhere
        assert!(tensor.iter().all(|&v| v.abs() < 1e-6));
    }
}
