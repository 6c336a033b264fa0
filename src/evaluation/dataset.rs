//! Per-entry scoring and reduction to one dataset score

use crate::evaluation::adapter::ModelScoreAdapter;
use crate::evaluation::classifier::ZeroShotScorer;
use crate::evaluation::evaluator::RuleEvaluator;
use crate::evaluation::fusion::ScoreFuser;
use crate::evaluation::scoring::{mean, normalize_score};
use crate::models::fusion::FusedResult;
use crate::models::policy::DatasetScorePolicy;
use crate::models::results::DatasetResult;
use crate::models::rule::{Rule, ToxicityTolerance};
use futures_util::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_CONCURRENCY: usize = 4;

const RULE_WEIGHTED_RULE_SHARE: f64 = 0.7;
const RULE_WEIGHTED_ML_SHARE: f64 = 0.3;

/// Rules every dataset entry is checked against unless configured otherwise
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::language("English", 0.4),
        Rule::min_length(100, 0.3),
        Rule::toxicity(ToxicityTolerance::Low, 0.3),
    ]
}

/// Zero-shot labels asked for every dataset entry unless configured otherwise
pub fn default_labels() -> Vec<String> {
    ["toxic", "non-toxic", "short", "long", "english", "french"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Scores every non-empty entry with a fixed rule and label set.
pub struct DatasetAggregator {
    evaluator: Arc<RuleEvaluator>,
    scorer: Arc<ZeroShotScorer>,
    fuser: ScoreFuser,
    policy: DatasetScorePolicy,
    rules: Vec<Rule>,
    labels: Vec<String>,
    concurrency: usize,
}

impl DatasetAggregator {
    pub fn new(
        evaluator: Arc<RuleEvaluator>,
        scorer: Arc<ZeroShotScorer>,
        fuser: ScoreFuser,
        policy: DatasetScorePolicy,
    ) -> Self {
        Self {
            evaluator,
            scorer,
            fuser,
            policy,
            rules: default_rules(),
            labels: default_labels(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Bound on entries evaluated at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub async fn aggregate(&self, entries: BTreeMap<String, String>) -> DatasetResult {
        let total = entries.len();
        let pending = entries.into_iter().filter_map(move |(name, text)| {
            if text.trim().is_empty() {
                debug!(entry = %name, "Skipping empty entry");
                None
            } else {
                Some(async move {
                    let fused = self.evaluate_entry(&text).await;
                    (name, fused)
                })
            }
        });

        let file_results: BTreeMap<String, FusedResult> = stream::iter(pending)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let dataset_score = Self::reduce(self.policy, file_results.values());
        info!(
            entries = total,
            processed = file_results.len(),
            dataset_score = dataset_score,
            "Dataset aggregated"
        );

        DatasetResult {
            file_results,
            dataset_score,
        }
    }

    async fn evaluate_entry(&self, text: &str) -> FusedResult {
        let (rule_results, ml_results) = tokio::join!(
            self.evaluator.evaluate(&self.rules, text),
            self.scorer.score(text, &self.labels),
        );
        self.fuser.fuse(rule_results, ml_results, &self.labels)
    }

    /// Reduce per-entry results to the dataset score; 0.0 for no entries
    pub fn reduce<'a, I>(policy: DatasetScorePolicy, results: I) -> f64
    where
        I: IntoIterator<Item = &'a FusedResult>,
    {
        let score = match policy {
            DatasetScorePolicy::TripleSample => mean(results.into_iter().flat_map(|result| {
                [
                    result.rule_results.weighted_score,
                    ModelScoreAdapter::mean(&result.ml_results),
                    result.combined_score,
                ]
            })),
            DatasetScorePolicy::RuleWeighted => mean(results.into_iter().map(|result| {
                RULE_WEIGHTED_RULE_SHARE * result.rule_results.weighted_score
                    + RULE_WEIGHTED_ML_SHARE * ModelScoreAdapter::mean(&result.ml_results)
            })),
        };
        normalize_score(score)
    }
}
