//! Request-level results: description, dataset, unified

use crate::models::evaluation::{LabelScores, RuleEvaluationResult};
use crate::models::fusion::FusedResult;
use crate::models::rule::{RawRule, Rule};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionResult {
    pub extracted_rules: Vec<RawRule>,
    pub rules: Vec<Rule>,
    pub rule_results: RuleEvaluationResult,
    pub ml_results: LabelScores,
    pub final_result: FusedResult,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetResult {
    pub file_results: BTreeMap<String, FusedResult>,
    pub dataset_score: f64,
}

impl DatasetResult {
    pub fn empty() -> Self {
        Self {
            file_results: BTreeMap::new(),
            dataset_score: 0.0,
        }
    }
}

/// Qualitative bucket for the final unified score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnifiedLabel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    Good,
    Excellent,
}

impl UnifiedLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            UnifiedLabel::Excellent
        } else if score >= 0.65 {
            UnifiedLabel::Good
        } else if score >= 0.45 {
            UnifiedLabel::Moderate
        } else if score >= 0.25 {
            UnifiedLabel::Low
        } else {
            UnifiedLabel::VeryLow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnifiedResult {
    pub description_score: f64,
    pub dataset_score: f64,
    pub unified_score: f64,
    pub label: UnifiedLabel,
}

/// Everything one combined evaluation request produces
#[derive(Debug, Clone, Serialize)]
pub struct CombinedEvaluation {
    pub description: DescriptionResult,
    pub files: DatasetResult,
    pub unified: UnifiedResult,
    pub evaluated_at: DateTime<Utc>,
}
