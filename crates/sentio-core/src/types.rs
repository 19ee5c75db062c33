use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Axis-aligned bounding box for a detected face, in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Area in pixels. Zero for degenerate boxes.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// The classifier's fixed category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    /// All categories, in the classifier's output order.
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// The classifier's native label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw per-category scores for one face region.
///
/// Scores are relative magnitudes on the classifier's native 0–100 scale;
/// they are not required to sum to anything. Never constructed empty by
/// the pipeline (the resolver relies on this).
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionDistribution {
    scores: Vec<(Emotion, f32)>,
}

impl EmotionDistribution {
    pub fn new(scores: Vec<(Emotion, f32)>) -> Self {
        Self { scores }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Emotion, f32)> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(Emotion, f32)> for EmotionDistribution {
    fn from_iter<T: IntoIterator<Item = (Emotion, f32)>>(iter: T) -> Self {
        Self { scores: iter.into_iter().collect() }
    }
}

/// A single display label derived from one [`EmotionDistribution`].
///
/// `label` is either a category name or `"{top}-{second}"` when the top
/// two scores are close; `score` is always the top raw score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEmotion {
    pub label: String,
    pub score: f32,
}

/// The single authoritative per-frame result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub label: String,
    pub score: f32,
}

impl FrameSummary {
    /// Sentinel when frame acquisition failed upstream.
    pub const NO_CAMERA: &'static str = "No Camera";
    /// Sentinel for low-power mode (classification suspended).
    pub const PAUSED: &'static str = "Paused";
    /// Default when high-power mode resolves zero regions. Distinct from
    /// the lowercase category label "neutral".
    pub const NEUTRAL: &'static str = "Neutral";

    pub fn no_camera() -> Self {
        Self { label: Self::NO_CAMERA.into(), score: 0.0 }
    }

    pub fn paused() -> Self {
        Self { label: Self::PAUSED.into(), score: 0.0 }
    }

    pub fn neutral() -> Self {
        Self { label: Self::NEUTRAL.into(), score: 0.0 }
    }
}

/// One drawing instruction for the renderer. Not retained after handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Target box in frame coordinates; `None` marks the full-frame banner.
    pub region: Option<Region>,
    /// Display text; `None` draws a bare presence box.
    pub text: Option<String>,
}

impl Annotation {
    /// Labeled face box (high-power path).
    pub fn face(region: Region, text: String) -> Self {
        Self { region: Some(region), text: Some(text) }
    }

    /// Presence-only face box (low-power path).
    pub fn presence(region: Region) -> Self {
        Self { region: Some(region), text: None }
    }

    /// Full-frame mode banner.
    pub fn banner(text: &str) -> Self {
        Self { region: None, text: Some(text.to_string()) }
    }

    pub fn is_banner(&self) -> bool {
        self.region.is_none()
    }
}

/// Externally supplied directive selecting the analysis depth for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerMode {
    /// Full pipeline: localization plus per-region emotion classification.
    High,
    /// Localization only; classifier never invoked, frame desaturated.
    Low,
}

impl PowerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerMode::High => "high",
            PowerMode::Low => "low",
        }
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller contract violation: mode string was neither "high" nor "low".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid power mode {0:?} (expected \"high\" or \"low\")")]
pub struct InvalidModeError(pub String);

impl FromStr for PowerMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(PowerMode::High),
            "low" => Ok(PowerMode::Low),
            other => Err(InvalidModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_mode_parse() {
        assert_eq!("high".parse::<PowerMode>(), Ok(PowerMode::High));
        assert_eq!("low".parse::<PowerMode>(), Ok(PowerMode::Low));
    }

    #[test]
    fn test_power_mode_rejects_unknown() {
        let err = "medium".parse::<PowerMode>().unwrap_err();
        assert_eq!(err, InvalidModeError("medium".into()));
        assert!("HIGH".parse::<PowerMode>().is_err());
        assert!("".parse::<PowerMode>().is_err());
    }

    #[test]
    fn test_power_mode_round_trip() {
        for mode in [PowerMode::High, PowerMode::Low] {
            assert_eq!(mode.as_str().parse::<PowerMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_emotion_labels_lowercase() {
        for e in Emotion::ALL {
            assert_eq!(e.as_str(), e.as_str().to_lowercase());
        }
    }

    #[test]
    fn test_annotation_banner_has_no_region() {
        let banner = Annotation::banner("MODE: HIGH PERFORMANCE");
        assert!(banner.is_banner());
        assert!(banner.text.is_some());

        let presence = Annotation::presence(Region::new(0, 0, 10, 10));
        assert!(!presence.is_banner());
        assert!(presence.text.is_none());
    }

    #[test]
    fn test_region_area() {
        assert_eq!(Region::new(5, 5, 10, 20).area(), 200);
        assert_eq!(Region::new(0, 0, 0, 7).area(), 0);
    }
}
