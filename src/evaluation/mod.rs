//! Evaluation core: rule checks, model score adaptation, fusion and
//! aggregation up to the unified verdict.

pub mod adapter;
pub mod classifier;
pub mod dataset;
pub mod engine;
pub mod evaluator;
pub mod fusion;
pub mod scoring;
pub mod unified;

pub use adapter::ModelScoreAdapter;
pub use classifier::{ZeroShotCache, ZeroShotScorer};
pub use dataset::DatasetAggregator;
pub use engine::{Oracles, QualityEngine};
pub use evaluator::{RuleEvaluator, ToxicityCache};
pub use fusion::ScoreFuser;
pub use unified::UnifiedCombiner;
