//! Description + dataset score to the final verdict

use crate::evaluation::scoring::{clamp_unit, round2};
use crate::models::results::{UnifiedLabel, UnifiedResult};

const DATASET_WEIGHT: f64 = 0.6;
const DESCRIPTION_WEIGHT: f64 = 0.4;

pub struct UnifiedCombiner;

impl UnifiedCombiner {
    /// `0.6 * dataset + 0.4 * description`, inputs clamped to [0, 1]
    pub fn combine(description_score: f64, dataset_score: f64) -> UnifiedResult {
        let description_score = clamp_unit(description_score);
        let dataset_score = clamp_unit(dataset_score);
        let unified_score =
            round2(DATASET_WEIGHT * dataset_score + DESCRIPTION_WEIGHT * description_score);

        UnifiedResult {
            description_score,
            dataset_score,
            unified_score,
            label: UnifiedLabel::from_score(unified_score),
        }
    }
}
