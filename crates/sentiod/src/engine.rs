use crate::config::Config;
use sentio_core::{
    FrameAnalysisPipeline, FrameSummary, OnnxEmotionClassifier, OnnxFaceLocator, PowerMode,
};
use sentio_hw::Camera;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("camera error: {0}")]
    Camera(#[from] sentio_hw::CameraError),
    #[error("locator error: {0}")]
    Locator(#[from] sentio_core::LocatorError),
    #[error("classifier error: {0}")]
    Classifier(#[from] sentio_core::ClassifierError),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Result of one analysis tick.
pub struct AnalysisReport {
    pub summary: FrameSummary,
    /// Number of face regions annotated this tick (banner excluded).
    pub faces: usize,
}

/// Messages sent from D-Bus handlers to the engine thread.
enum EngineRequest {
    Analyze {
        mode: PowerMode,
        reply: oneshot::Sender<AnalysisReport>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Request one frame analysis under the given power mode.
    pub async fn analyze(&self, mode: PowerMode) -> Result<AnalysisReport, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Analyze { mode, reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// Opens the camera, loads both ONNX models, discards warmup frames, then
/// enters a request loop. Fails fast at startup if any resource is
/// unavailable; after startup, per-tick capture failures are non-fatal and
/// surface as the "No Camera" sentinel.
pub fn spawn_engine(config: &Config) -> Result<EngineHandle, EngineError> {
    let camera = Camera::open(&config.camera_device)?;
    tracing::info!(
        device = %config.camera_device,
        width = camera.width,
        height = camera.height,
        fourcc = ?camera.fourcc,
        "camera opened"
    );

    let locator = OnnxFaceLocator::load(&config.ultraface_model_path(), config.locator_threshold)?;
    tracing::info!(path = %config.ultraface_model_path(), "UltraFace locator loaded");

    let classifier = OnnxEmotionClassifier::load(&config.fer_model_path())?;
    tracing::info!(path = %config.fer_model_path(), "FER classifier loaded");

    // Discard warmup frames for camera AGC/AE stabilization
    if config.warmup_frames > 0 {
        tracing::info!(count = config.warmup_frames, "discarding warmup frames");
        for _ in 0..config.warmup_frames {
            let _ = camera.capture_frame();
        }
    }

    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);

    std::thread::Builder::new()
        .name("sentio-engine".into())
        .spawn(move || {
            // Trait objects are not Send; assemble the pipeline from the
            // concrete model types on the owning thread.
            let mut pipeline =
                FrameAnalysisPipeline::new(Box::new(locator), Box::new(classifier));

            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Analyze { mode, reply } => {
                        let report = run_analyze(&camera, &mut pipeline, mode);
                        let _ = reply.send(report);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    Ok(EngineHandle { tx })
}

/// Capture one frame and run the pipeline over it.
///
/// A failed capture feeds `None` into the pipeline, which reports the
/// "No Camera" sentinel instead of erroring the tick.
fn run_analyze(
    camera: &Camera,
    pipeline: &mut FrameAnalysisPipeline,
    mode: PowerMode,
) -> AnalysisReport {
    let mut frame = match camera.capture_frame() {
        Ok(f) => Some(f),
        Err(e) => {
            tracing::warn!(error = %e, "frame capture failed");
            None
        }
    };

    let (summary, annotations) = pipeline.analyze(frame.as_mut(), mode);
    let faces = annotations.iter().filter(|a| !a.is_banner()).count();

    tracing::debug!(
        mode = %mode,
        label = %summary.label,
        score = summary.score,
        faces,
        "analysis tick complete"
    );

    AnalysisReport { summary, faces }
}
