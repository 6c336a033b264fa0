//! Rule evaluation and classifier score records

use crate::models::rule::RuleName;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of a single rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    /// `None` when the active scoring mode has no check for this rule
    pub passed: Option<bool>,
    pub score: f64,
    pub weight: f64,
}

impl RuleOutcome {
    pub fn checked(passed: bool, weight: f64) -> Self {
        Self {
            passed: Some(passed),
            score: if passed { 1.0 } else { 0.0 },
            weight,
        }
    }

    pub fn neutral(weight: f64) -> Self {
        Self {
            passed: None,
            score: 0.5,
            weight,
        }
    }
}

/// Raw toxicity classifier answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicityPrediction {
    pub label: String,
    pub score: f64,
}

/// Toxicity classifier output kept for observability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToxicityRaw {
    pub label: String,
    pub model_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEvaluationResult {
    pub rules: BTreeMap<RuleName, RuleOutcome>,
    pub weighted_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toxicity_raw: Option<ToxicityRaw>,
}

impl RuleEvaluationResult {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
            weighted_score: 0.0,
            toxicity_raw: None,
        }
    }
}

/// Classifier score in any of the shapes oracles return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelScore {
    Scalar(f64),
    Record(ScoreRecord),
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Label scores as returned by an oracle
pub type RawLabelScores = BTreeMap<String, LabelScore>;

/// Label scores after adaptation
pub type LabelScores = BTreeMap<String, f64>;
