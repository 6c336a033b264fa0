//! Shared data models spanning the evaluation layers.

pub mod evaluation;
pub mod fusion;
pub mod policy;
pub mod results;
pub mod rule;

pub use evaluation::{
    LabelScore, LabelScores, RawLabelScores, RuleEvaluationResult, RuleOutcome, ScoreRecord,
    ToxicityPrediction, ToxicityRaw,
};
pub use fusion::{FusedResult, FusionWeights, QualityLabel};
pub use policy::{DatasetScorePolicy, FusionPolicy, ScoringMode};
pub use results::{
    CombinedEvaluation, DatasetResult, DescriptionResult, UnifiedLabel, UnifiedResult,
};
pub use rule::{RawRule, Rule, RuleName, RuleValue, ToxicityTolerance};
