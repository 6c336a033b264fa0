//! Cached, guarded zero-shot scoring

use crate::cache::ScoreCache;
use crate::evaluation::adapter::ModelScoreAdapter;
use crate::models::evaluation::{LabelScores, RawLabelScores};
use crate::oracles::{OracleGuard, ZeroShotClassifier, ZERO_SHOT_CLASSIFIER};
use std::sync::Arc;
use tracing::debug;

/// Zero-shot answers keyed by (full text, labels, multi-label flag)
pub type ZeroShotCache = ScoreCache<(String, Vec<String>, bool), RawLabelScores>;

/// Zero-shot classification with neutral fallback.
///
/// Fallback scores are not cached, so a recovered classifier is asked again.
pub struct ZeroShotScorer {
    classifier: Arc<dyn ZeroShotClassifier>,
    cache: Arc<ZeroShotCache>,
    guard: OracleGuard,
    multi_label: bool,
}

impl ZeroShotScorer {
    pub fn new(
        classifier: Arc<dyn ZeroShotClassifier>,
        cache: Arc<ZeroShotCache>,
        guard: OracleGuard,
    ) -> Self {
        Self {
            classifier,
            cache,
            guard,
            multi_label: true,
        }
    }

    pub fn with_multi_label(mut self, multi_label: bool) -> Self {
        self.multi_label = multi_label;
        self
    }

    /// Adapted score per label; empty when there are no labels
    pub async fn score(&self, text: &str, labels: &[String]) -> LabelScores {
        if labels.is_empty() {
            return LabelScores::new();
        }

        let key = (text.to_string(), labels.to_vec(), self.multi_label);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(labels = labels.len(), "Zero-shot cache hit");
            return ModelScoreAdapter::adapt(&cached);
        }

        let multi_label = self.multi_label;
        let answer = self
            .guard
            .call_or_else(
                ZERO_SHOT_CLASSIFIER,
                || async move {
                    let raw = self.classifier.classify(text, labels, multi_label).await?;
                    Ok(Some(raw))
                },
                |_| None,
            )
            .await;

        let raw = match answer {
            Some(raw) => {
                self.cache.insert(key, raw.clone()).await;
                raw
            }
            None => ModelScoreAdapter::neutral(labels),
        };

        ModelScoreAdapter::adapt(&raw)
    }
}
