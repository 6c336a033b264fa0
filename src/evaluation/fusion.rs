//! Rule score and model score fusion

use crate::evaluation::adapter::ModelScoreAdapter;
use crate::evaluation::scoring::{normalize_score, round2};
use crate::models::evaluation::{LabelScores, RuleEvaluationResult};
use crate::models::fusion::{FusedResult, FusionWeights, QualityLabel};
use crate::models::policy::FusionPolicy;

const DYNAMIC_BASE_RULE_WEIGHT: f64 = 0.3;
const DYNAMIC_STEP_PER_LABEL: f64 = 0.05;
const DYNAMIC_MAX_RULE_WEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreFuser {
    policy: FusionPolicy,
}

impl ScoreFuser {
    pub fn new(policy: FusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FusionPolicy {
        self.policy
    }

    /// Rule weight grows 0.05 per active label from 0.3, capped at 0.7
    pub fn dynamic_weights(active_labels: usize) -> FusionWeights {
        let rule_weight = DYNAMIC_MAX_RULE_WEIGHT
            .min(DYNAMIC_BASE_RULE_WEIGHT + DYNAMIC_STEP_PER_LABEL * active_labels as f64);
        FusionWeights {
            rule_weight: round2(rule_weight),
            ml_weight: round2(1.0 - rule_weight),
        }
    }

    pub fn fuse(
        &self,
        rule_results: RuleEvaluationResult,
        ml_results: LabelScores,
        active_labels: &[String],
    ) -> FusedResult {
        let rule_score = rule_results.weighted_score;
        let ml_score = ModelScoreAdapter::mean(&ml_results);

        let (combined, weights) = match self.policy {
            FusionPolicy::EqualWeight => ((rule_score + ml_score) / 2.0, None),
            FusionPolicy::DynamicWeight => {
                let weights = Self::dynamic_weights(active_labels.len());
                (
                    rule_score * weights.rule_weight + ml_score * weights.ml_weight,
                    Some(weights),
                )
            }
        };

        let combined_score = normalize_score(combined);
        FusedResult {
            rule_results,
            ml_results,
            combined_score,
            label: QualityLabel::from_score(combined_score),
            weights,
        }
    }
}
