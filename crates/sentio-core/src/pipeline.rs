//! Per-frame analysis orchestration.
//!
//! Stateless across calls: every invocation is a pure function of the frame,
//! the requested power mode, and the collaborators' outputs. Collaborators
//! are injected at construction so the daemon wires real ONNX models while
//! tests wire counting stubs.

use crate::classifier::EmotionClassifier;
use crate::frame::RgbFrame;
use crate::locator::FaceLocator;
use crate::resolver;
use crate::types::{Annotation, FrameSummary, PowerMode};

/// Banner text appended in high-power mode.
pub const BANNER_HIGH: &str = "MODE: HIGH PERFORMANCE";
/// Banner text appended in low-power mode.
pub const BANNER_LOW: &str = "MODE: ENERGY SAVER";

/// The per-frame analysis pipeline.
pub struct FrameAnalysisPipeline {
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn EmotionClassifier>,
}

impl FrameAnalysisPipeline {
    pub fn new(locator: Box<dyn FaceLocator>, classifier: Box<dyn EmotionClassifier>) -> Self {
        Self { locator, classifier }
    }

    /// Analyze one frame under the requested power mode.
    ///
    /// `frame: None` means acquisition failed upstream; no collaborator is
    /// invoked and the "No Camera" sentinel is returned. In low-power mode
    /// the frame is desaturated in place as renderer input preparation.
    ///
    /// Always returns exactly one summary; the annotation list holds at
    /// most one entry per located region plus the mode banner.
    pub fn analyze(
        &mut self,
        frame: Option<&mut RgbFrame>,
        mode: PowerMode,
    ) -> (FrameSummary, Vec<Annotation>) {
        let Some(frame) = frame else {
            return (FrameSummary::no_camera(), Vec::new());
        };

        let regions = self.locator.locate(frame);
        let mut annotations = Vec::with_capacity(regions.len() + 1);

        match mode {
            PowerMode::High => {
                let mut summary = FrameSummary::neutral();

                for region in regions {
                    let Some(crop) = frame.crop(&region) else {
                        tracing::debug!(?region, "region outside frame bounds, skipping");
                        continue;
                    };

                    // A region the classifier cannot process is dropped in
                    // isolation: transient blur or occlusion must not take
                    // down the rest of the frame.
                    let distribution = match self.classifier.classify(&crop) {
                        Ok(d) => d,
                        Err(e) => {
                            tracing::debug!(?region, error = %e, "classification failed, skipping region");
                            continue;
                        }
                    };

                    let resolved = resolver::resolve(&distribution);
                    annotations.push(Annotation::face(
                        region,
                        format!("{} ({}%)", resolved.label, resolved.score.round() as i64),
                    ));

                    // Last successfully resolved region wins, in locator
                    // list order. Pinned by tests; see DESIGN.md.
                    summary = FrameSummary { label: resolved.label, score: resolved.score };
                }

                annotations.push(Annotation::banner(BANNER_HIGH));
                (summary, annotations)
            }
            PowerMode::Low => {
                for region in regions {
                    annotations.push(Annotation::presence(region));
                }

                // Visual cue that deep inference is off; analysis results
                // are never derived from the desaturated pixels.
                frame.desaturate();

                annotations.push(Annotation::banner(BANNER_LOW));
                (FrameSummary::paused(), annotations)
            }
        }
    }
}
