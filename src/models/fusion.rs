//! Fused (rule + model) results

use crate::models::evaluation::{LabelScores, RuleEvaluationResult};
use serde::Serialize;

/// Qualitative bucket for a fused per-text score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityLabel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
}

impl QualityLabel {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.25 {
            QualityLabel::VeryLow
        } else if score <= 0.50 {
            QualityLabel::Low
        } else if score <= 0.75 {
            QualityLabel::Medium
        } else {
            QualityLabel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::VeryLow => "Very Low",
            QualityLabel::Low => "Low",
            QualityLabel::Medium => "Medium",
            QualityLabel::High => "High",
        }
    }
}

/// Rule/model weights used by dynamic fusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionWeights {
    pub rule_weight: f64,
    pub ml_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedResult {
    pub rule_results: RuleEvaluationResult,
    pub ml_results: LabelScores,
    pub combined_score: f64,
    pub label: QualityLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<FusionWeights>,
}
