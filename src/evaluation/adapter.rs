//! Classifier output to flat label scores

use crate::evaluation::scoring::mean;
use crate::models::evaluation::{LabelScore, LabelScores, RawLabelScores};
use serde_json::Value;

/// Neutral score substituted when the classifier is unavailable
pub const NEUTRAL_SCORE: f64 = 0.5;

pub struct ModelScoreAdapter;

impl ModelScoreAdapter {
    /// Flatten every label to a single number. Pure, never fails.
    pub fn adapt(raw: &RawLabelScores) -> LabelScores {
        raw.iter()
            .map(|(label, score)| (label.clone(), Self::score_of(score)))
            .collect()
    }

    /// Numeric score of one label; 0.0 when there is none
    pub fn score_of(score: &LabelScore) -> f64 {
        let value = match score {
            LabelScore::Scalar(value) => *value,
            LabelScore::Record(record) => record.score.unwrap_or(0.0),
            LabelScore::Other(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
            LabelScore::Other(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
            LabelScore::Other(_) => 0.0,
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    pub fn mean(scores: &LabelScores) -> f64 {
        mean(scores.values().copied())
    }

    /// 0.5 for every label
    pub fn neutral(labels: &[String]) -> RawLabelScores {
        labels
            .iter()
            .map(|label| (label.clone(), LabelScore::Scalar(NEUTRAL_SCORE)))
            .collect()
    }
}
