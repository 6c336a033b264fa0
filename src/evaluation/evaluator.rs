//! Rule evaluation against a single text

use crate::cache::ScoreCache;
use crate::evaluation::scoring::{normalize_score, round3, weighted_average};
use crate::models::evaluation::{RuleEvaluationResult, RuleOutcome, ToxicityPrediction, ToxicityRaw};
use crate::models::policy::ScoringMode;
use crate::models::rule::{Rule, RuleName, ToxicityTolerance};
use crate::oracles::{
    LanguageDetector, OracleGuard, ToxicityClassifier, LANGUAGE_DETECTOR, TOXICITY_CLASSIFIER,
};
use crate::rules::vocabulary::{detected_code, language_code};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Classifier input is cut to this many characters
pub const ORACLE_INPUT_CHARS: usize = 512;

const LOW_TOLERANCE_TOXIC_SCORE: f64 = 0.5;
const MEDIUM_TOLERANCE_SCORE: f64 = 0.7;

const COARSE_LANGUAGE_MISS: f64 = 0.5;
const COARSE_LENGTH_MISS: f64 = 0.4;
const COARSE_TOXICITY_STRICTER: f64 = 0.3;

static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Toxicity answers keyed by (truncated text, tolerance)
pub type ToxicityCache = ScoreCache<(String, ToxicityTolerance), ToxicityPrediction>;

/// Number of `\w+` tokens in the text
pub fn word_count(text: &str) -> usize {
    WORDS.find_iter(text).count()
}

/// First [`ORACLE_INPUT_CHARS`] characters of the text
pub fn oracle_sample(text: &str) -> String {
    text.chars().take(ORACLE_INPUT_CHARS).collect()
}

/// Whether a classifier answer satisfies the tolerance
pub fn toxicity_passes(tolerance: ToxicityTolerance, prediction: &ToxicityPrediction) -> bool {
    match tolerance {
        ToxicityTolerance::Low => {
            !prediction.label.eq_ignore_ascii_case("toxic")
                || prediction.score < LOW_TOLERANCE_TOXIC_SCORE
        }
        ToxicityTolerance::Medium => prediction.score < MEDIUM_TOLERANCE_SCORE,
        ToxicityTolerance::High => true,
    }
}

/// Scores a text against normalized rules.
///
/// Oracle failures never escape: a rule whose oracle is unavailable fails
/// with score 0.
pub struct RuleEvaluator {
    language: Arc<dyn LanguageDetector>,
    toxicity: Arc<dyn ToxicityClassifier>,
    cache: Arc<ToxicityCache>,
    guard: OracleGuard,
}

impl RuleEvaluator {
    pub fn new(
        language: Arc<dyn LanguageDetector>,
        toxicity: Arc<dyn ToxicityClassifier>,
        cache: Arc<ToxicityCache>,
        guard: OracleGuard,
    ) -> Self {
        Self {
            language,
            toxicity,
            cache,
            guard,
        }
    }

    pub async fn evaluate_with_mode(
        &self,
        rules: &[Rule],
        text: &str,
        mode: ScoringMode,
    ) -> RuleEvaluationResult {
        match mode {
            ScoringMode::Strict => self.evaluate(rules, text).await,
            ScoringMode::Coarse => Self::evaluate_coarse(rules, text),
        }
    }

    /// Oracle-backed evaluation of every rule in the vocabulary
    pub async fn evaluate(&self, rules: &[Rule], text: &str) -> RuleEvaluationResult {
        let mut outcomes = BTreeMap::new();
        let mut scored = Vec::with_capacity(rules.len());
        let mut toxicity_raw = None;
        let mut detected: Option<Option<String>> = None;

        for rule in rules {
            let outcome = match rule.name {
                RuleName::MinLength => {
                    let required = rule.value.as_count().unwrap_or(0);
                    RuleOutcome::checked(word_count(text) as u64 >= required, rule.weight)
                }
                RuleName::MaxLength => {
                    let limit = rule.value.as_count().unwrap_or(0);
                    let passed = limit == 0 || word_count(text) as u64 <= limit;
                    RuleOutcome::checked(passed, rule.weight)
                }
                RuleName::Language => {
                    let expected = language_code(rule.value.as_text().unwrap_or_default());
                    let passed = self
                        .detect_language(text, &mut detected)
                        .await
                        .is_some_and(|code| code == expected);
                    RuleOutcome::checked(passed, rule.weight)
                }
                RuleName::ExcludedLanguage => {
                    let excluded = language_code(rule.value.as_text().unwrap_or_default());
                    let passed = self
                        .detect_language(text, &mut detected)
                        .await
                        .is_some_and(|code| code != excluded);
                    RuleOutcome::checked(passed, rule.weight)
                }
                RuleName::Toxicity => {
                    let tolerance = rule.value.tolerance();
                    match self.toxicity_prediction(text, tolerance).await {
                        Some(prediction) => {
                            let passed = toxicity_passes(tolerance, &prediction);
                            toxicity_raw = Some(ToxicityRaw {
                                label: prediction.label.to_lowercase(),
                                model_score: round3(prediction.score),
                            });
                            RuleOutcome::checked(passed, rule.weight)
                        }
                        None => RuleOutcome::checked(false, rule.weight),
                    }
                }
                RuleName::ProhibitedKeywords => {
                    let lowered = text.to_lowercase();
                    let clean = !rule
                        .value
                        .keywords()
                        .iter()
                        .any(|keyword| lowered.contains(keyword.as_str()));
                    RuleOutcome::checked(clean, rule.weight)
                }
            };

            scored.push((outcome.score, outcome.weight));
            outcomes.insert(rule.name, outcome);
        }

        Self::finish(outcomes, scored, toxicity_raw)
    }

    /// Heuristic evaluation without oracle calls.
    ///
    /// Misses are penalised partially rather than zeroed; rules without a
    /// heuristic score neutral 0.5.
    pub fn evaluate_coarse(rules: &[Rule], text: &str) -> RuleEvaluationResult {
        let lowered = text.to_lowercase();
        let tokens = text.split_whitespace().count() as u64;
        let mut outcomes = BTreeMap::new();
        let mut scored = Vec::with_capacity(rules.len());

        for rule in rules {
            let score = match rule.name {
                RuleName::Language => {
                    let language = rule.value.as_text().unwrap_or_default().to_lowercase();
                    Some(if lowered.contains(&language) { 1.0 } else { COARSE_LANGUAGE_MISS })
                }
                RuleName::MinLength => {
                    let required = rule.value.as_count().unwrap_or(0);
                    Some(if tokens >= required { 1.0 } else { COARSE_LENGTH_MISS })
                }
                RuleName::Toxicity => Some(if rule.value.tolerance() == ToxicityTolerance::Low {
                    1.0
                } else {
                    COARSE_TOXICITY_STRICTER
                }),
                _ => None,
            };

            let outcome = match score {
                Some(score) => RuleOutcome {
                    passed: Some(score >= 1.0),
                    score,
                    weight: rule.weight,
                },
                None => RuleOutcome::neutral(rule.weight),
            };
            scored.push((outcome.score, outcome.weight));
            outcomes.insert(rule.name, outcome);
        }

        Self::finish(outcomes, scored, None)
    }

    fn finish(
        rules: BTreeMap<RuleName, RuleOutcome>,
        scored: Vec<(f64, f64)>,
        toxicity_raw: Option<ToxicityRaw>,
    ) -> RuleEvaluationResult {
        RuleEvaluationResult {
            rules,
            weighted_score: normalize_score(weighted_average(scored)),
            toxicity_raw,
        }
    }

    /// Detected language code, asked at most once per evaluation
    async fn detect_language(
        &self,
        text: &str,
        memo: &mut Option<Option<String>>,
    ) -> Option<String> {
        if let Some(known) = memo {
            return known.clone();
        }

        let sample = oracle_sample(text);
        let sample = sample.as_str();
        let detected = self
            .guard
            .call_or_else(
                LANGUAGE_DETECTOR,
                || async move {
                    let label = self.language.detect_language(sample).await?;
                    Ok(Some(detected_code(&label)))
                },
                |_| None,
            )
            .await;

        *memo = Some(detected.clone());
        detected
    }

    async fn toxicity_prediction(
        &self,
        text: &str,
        tolerance: ToxicityTolerance,
    ) -> Option<ToxicityPrediction> {
        let sample = oracle_sample(text);
        let key = (sample, tolerance);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(tolerance = tolerance.as_str(), "Toxicity cache hit");
            return Some(cached);
        }

        let sample = key.0.as_str();
        let prediction = self
            .guard
            .call_or_else(
                TOXICITY_CLASSIFIER,
                || async move { self.toxicity.classify_toxicity(sample).await.map(Some) },
                |_| None,
            )
            .await?;

        self.cache.insert(key, prediction.clone()).await;
        Some(prediction)
    }
}
