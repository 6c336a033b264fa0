//! Request-level orchestration
//!
//! Wires oracles, caches and policies into the three exposed operations:
//! description evaluation, dataset evaluation and their combination.

use crate::config::{Config, ScoringConfig};
use crate::error::EvaluationError;
use crate::evaluation::classifier::{ZeroShotCache, ZeroShotScorer};
use crate::evaluation::dataset::DatasetAggregator;
use crate::evaluation::evaluator::{RuleEvaluator, ToxicityCache};
use crate::evaluation::fusion::ScoreFuser;
use crate::evaluation::scoring::clamp_unit;
use crate::evaluation::unified::UnifiedCombiner;
use crate::models::policy::ScoringMode;
use crate::models::results::{CombinedEvaluation, DatasetResult, DescriptionResult, UnifiedResult};
use crate::models::rule::Rule;
use crate::oracles::{
    EntryExtractor, HuggingFaceClient, LanguageDetector, NormalizationOracle, OpenAiClient,
    OracleGuard, RuleExtractor, ToxicityClassifier, ZeroShotClassifier, ZipEntryExtractor,
    RULE_EXTRACTOR,
};
use crate::rules::RuleNormalizer;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Every external collaborator the engine consults
pub struct Oracles {
    pub rule_extractor: Arc<dyn RuleExtractor>,
    pub normalization: Option<Arc<dyn NormalizationOracle>>,
    pub language: Arc<dyn LanguageDetector>,
    pub toxicity: Arc<dyn ToxicityClassifier>,
    pub zero_shot: Arc<dyn ZeroShotClassifier>,
    pub entries: Arc<dyn EntryExtractor>,
}

pub struct QualityEngine {
    extractor: Arc<dyn RuleExtractor>,
    entries: Arc<dyn EntryExtractor>,
    normalizer: RuleNormalizer,
    evaluator: Arc<RuleEvaluator>,
    scorer: Arc<ZeroShotScorer>,
    fuser: ScoreFuser,
    dataset: DatasetAggregator,
    mode: ScoringMode,
    guard: OracleGuard,
}

impl QualityEngine {
    pub fn new(scoring: &ScoringConfig, guard: OracleGuard, oracles: Oracles) -> Self {
        let toxicity_cache = Arc::new(ToxicityCache::new(scoring.cache_capacity));
        let zero_shot_cache = Arc::new(ZeroShotCache::new(scoring.cache_capacity));
        Self::with_caches(scoring, guard, oracles, toxicity_cache, zero_shot_cache)
    }

    /// Engine sharing caller-owned caches
    pub fn with_caches(
        scoring: &ScoringConfig,
        guard: OracleGuard,
        oracles: Oracles,
        toxicity_cache: Arc<ToxicityCache>,
        zero_shot_cache: Arc<ZeroShotCache>,
    ) -> Self {
        let normalizer = match oracles.normalization {
            Some(oracle) => RuleNormalizer::with_oracle(oracle, guard),
            None => RuleNormalizer::new(),
        };
        let evaluator = Arc::new(RuleEvaluator::new(
            oracles.language,
            oracles.toxicity,
            toxicity_cache,
            guard,
        ));
        let scorer = Arc::new(ZeroShotScorer::new(oracles.zero_shot, zero_shot_cache, guard));
        let fuser = ScoreFuser::new(scoring.fusion_policy);
        let dataset = DatasetAggregator::new(
            evaluator.clone(),
            scorer.clone(),
            fuser,
            scoring.dataset_policy,
        )
        .with_rules(scoring.dataset_rules.clone())
        .with_labels(scoring.dataset_labels.clone())
        .with_concurrency(scoring.dataset_concurrency);

        Self {
            extractor: oracles.rule_extractor,
            entries: oracles.entries,
            normalizer,
            evaluator,
            scorer,
            fuser,
            dataset,
            mode: scoring.description_mode,
            guard,
        }
    }

    /// Engine backed by the hosted OpenAI and Hugging Face models
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let openai = &config.openai;
        let huggingface = &config.huggingface;

        let extractor = OpenAiClient::with_client(
            openai.base_url.as_str(),
            openai.api_key.clone(),
            openai.model.clone(),
            http.clone(),
        );
        let normalization = openai.normalizer_model.as_ref().map(|model| {
            Arc::new(OpenAiClient::with_client(
                openai.base_url.as_str(),
                openai.api_key.clone(),
                model.clone(),
                http.clone(),
            )) as Arc<dyn NormalizationOracle>
        });
        let hosted = |model: &str| {
            Arc::new(HuggingFaceClient::with_client(
                huggingface.base_url.as_str(),
                huggingface.api_token.clone(),
                model,
                http.clone(),
            ))
        };

        let oracles = Oracles {
            rule_extractor: Arc::new(extractor),
            normalization,
            language: hosted(&huggingface.language_model),
            toxicity: hosted(&huggingface.toxicity_model),
            zero_shot: hosted(&huggingface.zero_shot_model),
            entries: Arc::new(ZipEntryExtractor::default()),
        };

        info!(
            extractor_model = %openai.model,
            normalizer_model = ?openai.normalizer_model,
            fusion_policy = ?config.scoring.fusion_policy,
            dataset_policy = ?config.scoring.dataset_policy,
            "Quality engine configured"
        );

        Self::new(&config.scoring, config.oracle.guard(), oracles)
    }

    /// Extract, normalize and score the rules a description states
    pub async fn evaluate_description(
        &self,
        description: &str,
    ) -> Result<DescriptionResult, EvaluationError> {
        if description.trim().is_empty() {
            return Err(EvaluationError::InvalidInput(
                "description must not be blank".to_string(),
            ));
        }

        let extracted_rules = self
            .guard
            .call(RULE_EXTRACTOR, || self.extractor.extract_rules(description))
            .await
            .map_err(EvaluationError::RuleExtraction)?;
        let rules = self.normalizer.normalize(&extracted_rules).await;
        let labels = active_labels(&rules);

        let (rule_results, ml_results) = tokio::join!(
            self.evaluator.evaluate_with_mode(&rules, description, self.mode),
            self.scorer.score(description, &labels),
        );
        let final_result = self
            .fuser
            .fuse(rule_results.clone(), ml_results.clone(), &labels);
        let score = clamp_unit(final_result.combined_score);

        info!(
            extracted = extracted_rules.len(),
            rules = rules.len(),
            score = score,
            label = final_result.label.as_str(),
            "Description evaluated"
        );

        Ok(DescriptionResult {
            extracted_rules,
            rules,
            rule_results,
            ml_results,
            final_result,
            score,
        })
    }

    /// Score every text entry of an archive with the dataset rules
    pub async fn evaluate_dataset(&self, archive: &[u8]) -> Result<DatasetResult, EvaluationError> {
        if archive.is_empty() {
            return Err(EvaluationError::InvalidInput("archive is empty".to_string()));
        }

        let entries = self.entries.extract_entries(archive)?;
        Ok(self.dataset.aggregate(entries).await)
    }

    pub fn combine_evaluations(
        &self,
        description: &DescriptionResult,
        dataset: &DatasetResult,
    ) -> UnifiedResult {
        UnifiedCombiner::combine(description.score, dataset.dataset_score)
    }

    /// Run description and dataset evaluation as two tasks, then combine
    pub async fn evaluate(
        self: &Arc<Self>,
        description: String,
        archive: Vec<u8>,
    ) -> Result<CombinedEvaluation, EvaluationError> {
        let engine = Arc::clone(self);
        let description_task =
            tokio::spawn(async move { engine.evaluate_description(&description).await });
        let engine = Arc::clone(self);
        let dataset_task = tokio::spawn(async move { engine.evaluate_dataset(&archive).await });

        let (description, files) = tokio::join!(description_task, dataset_task);
        let description =
            description.map_err(|err| EvaluationError::TaskFailed(err.to_string()))??;
        let files = files.map_err(|err| EvaluationError::TaskFailed(err.to_string()))??;

        let unified = self.combine_evaluations(&description, &files);
        info!(
            description_score = unified.description_score,
            dataset_score = unified.dataset_score,
            unified_score = unified.unified_score,
            entries = files.file_results.len(),
            "Combined evaluation finished"
        );

        Ok(CombinedEvaluation {
            description,
            files,
            unified,
            evaluated_at: Utc::now(),
        })
    }
}

/// Distinct rule names in order of first appearance
fn active_labels(rules: &[Rule]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::with_capacity(rules.len());
    for rule in rules {
        let name = rule.name.as_str();
        if !labels.iter().any(|label| label == name) {
            labels.push(name.to_string());
        }
    }
    labels
}
