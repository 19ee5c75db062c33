use crate::engine::EngineHandle;
use sentio_core::PowerMode;
use zbus::interface;

/// D-Bus interface for the Sentio perception daemon.
///
/// Bus name: org.sentio.Perception1
/// Object path: /org/sentio/Perception1
pub struct PerceptionService {
    engine: EngineHandle,
}

impl PerceptionService {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

#[interface(name = "org.sentio.Perception1")]
impl PerceptionService {
    /// Analyze one frame under the requested power mode ("high" or "low").
    ///
    /// Returns the frame summary as (label, score) — the sole value the
    /// external power controller depends on. An unknown mode string is a
    /// caller contract violation and fails fast.
    async fn analyze(&self, mode: &str) -> zbus::fdo::Result<(String, f64)> {
        let mode: PowerMode = mode
            .parse()
            .map_err(|e: sentio_core::InvalidModeError| {
                zbus::fdo::Error::InvalidArgs(e.to_string())
            })?;

        let report = self
            .engine
            .analyze(mode)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;

        tracing::info!(
            mode = %mode,
            label = %report.summary.label,
            score = report.summary.score,
            faces = report.faces,
            "analyze requested"
        );

        Ok((report.summary.label, report.summary.score as f64))
    }

    /// Return daemon status information.
    async fn status(&self) -> zbus::fdo::Result<String> {
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "modes": ["high", "low"],
        })
        .to_string())
    }
}
