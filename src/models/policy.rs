//! Selectable scoring policies

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a rule score and a model score are fused into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionPolicy {
    /// `(rule + ml) / 2`
    #[default]
    EqualWeight,
    /// Rule weight grows with the number of active labels, capped at 0.7
    DynamicWeight,
}

impl FromStr for FusionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" | "equal_weight" => Ok(FusionPolicy::EqualWeight),
            "dynamic" | "dynamic_weight" => Ok(FusionPolicy::DynamicWeight),
            other => Err(format!("unknown fusion policy: {other}")),
        }
    }
}

/// How per-entry scores reduce to one dataset score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetScorePolicy {
    /// Mean of weighted score, mean ML score and combined score of every entry
    #[default]
    TripleSample,
    /// Mean over entries of `0.7 * weighted score + 0.3 * mean ML score`
    RuleWeighted,
}

impl FromStr for DatasetScorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "triple" | "triple_sample" => Ok(DatasetScorePolicy::TripleSample),
            "rule_weighted" => Ok(DatasetScorePolicy::RuleWeighted),
            other => Err(format!("unknown dataset score policy: {other}")),
        }
    }
}

/// Which rule checks the evaluator runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Oracle-backed checks for every rule in the vocabulary
    #[default]
    Strict,
    /// Substring/word-split heuristics, no oracle calls
    Coarse,
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ScoringMode::Strict),
            "coarse" => Ok(ScoringMode::Coarse),
            other => Err(format!("unknown scoring mode: {other}")),
        }
    }
}
