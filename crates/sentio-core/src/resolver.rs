//! Emotion resolution — collapses a raw score distribution into one label.
//!
//! The top two categories are compared against a fixed closeness gap: when
//! the runner-up is within the gap, the label becomes a compound of both
//! (e.g. "happy-surprise"), reflecting genuine ambiguity in the face.

use crate::types::{EmotionDistribution, ResolvedEmotion};

/// Score gap (classifier-native 0–100 units) under which the runner-up
/// category is folded into a compound label.
pub const COMPOUND_GAP: f32 = 15.0;

/// Resolve a distribution into a display label plus its confidence.
///
/// Categories are ordered by score descending; equal scores are ordered by
/// category name ascending so identical input always yields identical
/// output. The returned score is the top raw score, compound or not.
///
/// The caller guarantees a non-empty distribution; the pipeline only feeds
/// distributions straight from a successful classifier call.
pub fn resolve(distribution: &EmotionDistribution) -> ResolvedEmotion {
    let mut ranked: Vec<_> = distribution.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.as_str().cmp(b.0.as_str()))
    });

    let (top, s1) = ranked[0];
    let label = match ranked.get(1) {
        Some((second, s2)) if s1 - s2 < COMPOUND_GAP => {
            format!("{}-{}", top.as_str(), second.as_str())
        }
        _ => top.as_str().to_string(),
    };

    ResolvedEmotion { label, score: *s1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Emotion;

    fn dist(scores: &[(Emotion, f32)]) -> EmotionDistribution {
        scores.iter().copied().collect()
    }

    #[test]
    fn test_clear_winner_single_label() {
        let d = dist(&[(Emotion::Happy, 90.0), (Emotion::Sad, 10.0)]);
        let r = resolve(&d);
        assert_eq!(r.label, "happy");
        assert_eq!(r.score, 90.0);
    }

    #[test]
    fn test_close_runner_up_compound_label() {
        let d = dist(&[
            (Emotion::Happy, 80.0),
            (Emotion::Surprise, 70.0),
            (Emotion::Sad, 5.0),
        ]);
        let r = resolve(&d);
        assert_eq!(r.label, "happy-surprise");
        assert_eq!(r.score, 80.0);
    }

    #[test]
    fn test_gap_exactly_at_threshold_not_compound() {
        let d = dist(&[(Emotion::Fear, 50.0), (Emotion::Angry, 35.0)]);
        assert_eq!(resolve(&d).label, "fear");
    }

    #[test]
    fn test_gap_just_under_threshold_compound() {
        let d = dist(&[(Emotion::Fear, 50.0), (Emotion::Angry, 35.1)]);
        assert_eq!(resolve(&d).label, "fear-angry");
    }

    #[test]
    fn test_single_entry_never_compound() {
        let d = dist(&[(Emotion::Neutral, 3.0)]);
        let r = resolve(&d);
        assert_eq!(r.label, "neutral");
        assert_eq!(r.score, 3.0);
    }

    #[test]
    fn test_score_is_maximum_regardless_of_compound() {
        let compound = dist(&[(Emotion::Sad, 40.0), (Emotion::Fear, 38.0)]);
        assert_eq!(resolve(&compound).score, 40.0);

        let single = dist(&[(Emotion::Sad, 40.0), (Emotion::Fear, 2.0)]);
        assert_eq!(resolve(&single).score, 40.0);
    }

    #[test]
    fn test_tie_broken_by_name_ascending() {
        // surprise vs angry at the same score: "angry" sorts first.
        let d = dist(&[
            (Emotion::Surprise, 44.0),
            (Emotion::Angry, 44.0),
            (Emotion::Neutral, 1.0),
        ]);
        let r = resolve(&d);
        assert_eq!(r.label, "angry-surprise");
        assert_eq!(r.score, 44.0);
    }

    #[test]
    fn test_tie_break_independent_of_input_order() {
        let a = dist(&[(Emotion::Happy, 30.0), (Emotion::Disgust, 30.0)]);
        let b = dist(&[(Emotion::Disgust, 30.0), (Emotion::Happy, 30.0)]);
        assert_eq!(resolve(&a), resolve(&b));
    }

    #[test]
    fn test_idempotent() {
        let d = dist(&[
            (Emotion::Angry, 33.0),
            (Emotion::Fear, 31.0),
            (Emotion::Happy, 12.0),
        ]);
        assert_eq!(resolve(&d), resolve(&d));
    }

    #[test]
    fn test_full_category_set() {
        let d: EmotionDistribution = Emotion::ALL
            .iter()
            .enumerate()
            .map(|(i, &e)| (e, i as f32 * 20.0))
            .collect();
        let r = resolve(&d);
        // neutral (120) leads surprise (100) by exactly 20 — not compound.
        assert_eq!(r.label, "neutral");
        assert_eq!(r.score, 120.0);
    }
}
