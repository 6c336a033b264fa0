use praxis::evaluation::{RuleEvaluator, ToxicityCache};
use praxis::models::{Rule, RuleName, RuleValue, ScoringMode, ToxicityTolerance};
use praxis::oracles::{LanguageDetector, ToxicityClassifier};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::stubs::{english_words, fast_guard, SlowOracle, StubLanguage, StubToxicity};

fn evaluator(language: Arc<StubLanguage>, toxicity: Arc<StubToxicity>) -> RuleEvaluator {
    RuleEvaluator::new(
        language,
        toxicity,
        Arc::new(ToxicityCache::new(16)),
        fast_guard(),
    )
}

fn standard_rules() -> Vec<Rule> {
    vec![
        Rule::language("English", 0.4),
        Rule::min_length(10, 0.3),
        Rule::toxicity(ToxicityTolerance::Low, 0.3),
    ]
}

#[tokio::test]
async fn english_non_toxic_sentence_scores_high() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("en")),
        Arc::new(StubToxicity::clean()),
    );

    let result = evaluator
        .evaluate(&standard_rules(), &english_words(20))
        .await;

    assert!(result.weighted_score >= 0.9);
    assert_eq!(result.rules.len(), 3);
    assert!(result.rules.values().all(|outcome| outcome.passed == Some(true)));
}

#[tokio::test]
async fn empty_rule_list_scores_zero() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("en")),
        Arc::new(StubToxicity::clean()),
    );
    let result = evaluator.evaluate(&[], "anything at all").await;
    assert_eq!(result.weighted_score, 0.0);
    assert!(result.rules.is_empty());
    assert!(result.toxicity_raw.is_none());
}

#[tokio::test]
async fn short_text_fails_min_length() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("en")),
        Arc::new(StubToxicity::clean()),
    );

    let result = evaluator.evaluate(&standard_rules(), &english_words(5)).await;

    let min_length = &result.rules[&RuleName::MinLength];
    assert_eq!(min_length.passed, Some(false));
    assert_eq!(min_length.score, 0.0);
    assert_eq!(result.weighted_score, 0.7);
}

#[tokio::test]
async fn detector_region_suffix_is_ignored() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("en-US")),
        Arc::new(StubToxicity::clean()),
    );
    let rules = vec![Rule::language("English", 1.0)];
    let result = evaluator.evaluate(&rules, "Hello there").await;
    assert_eq!(result.weighted_score, 1.0);
}

#[tokio::test]
async fn language_detector_failure_fails_language_rules() {
    let language = Arc::new(StubLanguage::failing());
    let evaluator = evaluator(language.clone(), Arc::new(StubToxicity::clean()));

    let result = evaluator
        .evaluate(&standard_rules(), &english_words(20))
        .await;

    assert_eq!(result.rules[&RuleName::Language].passed, Some(false));
    assert_eq!(result.weighted_score, 0.6);
    assert_eq!(language.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn language_is_detected_once_per_text() {
    let language = Arc::new(StubLanguage::detecting("fr"));
    let evaluator = evaluator(language.clone(), Arc::new(StubToxicity::clean()));
    let rules = vec![
        Rule::language("French", 0.5),
        Rule::new(
            RuleName::ExcludedLanguage,
            RuleValue::Text("English".to_string()),
            0.5,
        ),
    ];

    let result = evaluator.evaluate(&rules, "Bonjour tout le monde").await;

    assert_eq!(result.weighted_score, 1.0);
    assert_eq!(language.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn excluded_language_fails_on_match() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("fr")),
        Arc::new(StubToxicity::clean()),
    );
    let rules = vec![Rule::new(
        RuleName::ExcludedLanguage,
        RuleValue::Text("French".to_string()),
        1.0,
    )];

    let result = evaluator.evaluate(&rules, "Bonjour tout le monde").await;
    assert_eq!(result.rules[&RuleName::ExcludedLanguage].passed, Some(false));
    assert_eq!(result.weighted_score, 0.0);
}

#[tokio::test]
async fn cached_toxicity_is_requested_once() {
    let toxicity = Arc::new(StubToxicity::clean());
    let evaluator = evaluator(Arc::new(StubLanguage::detecting("en")), toxicity.clone());
    let rules = vec![Rule::toxicity(ToxicityTolerance::Low, 1.0)];
    let text = english_words(30);

    let first = evaluator.evaluate(&rules, &text).await;
    let second = evaluator.evaluate(&rules, &text).await;

    assert_eq!(toxicity.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn toxicity_tolerance_thresholds() {
    let flagged = Arc::new(StubToxicity::predicting("TOXIC", 0.65432));
    let evaluator = evaluator(Arc::new(StubLanguage::detecting("en")), flagged);
    let text = "you are an idiot";

    let low = evaluator
        .evaluate(&[Rule::toxicity(ToxicityTolerance::Low, 1.0)], text)
        .await;
    assert_eq!(low.weighted_score, 0.0);
    let raw = low.toxicity_raw.expect("raw toxicity kept");
    assert_eq!(raw.label, "toxic");
    assert_eq!(raw.model_score, 0.654);

    let medium = evaluator
        .evaluate(&[Rule::toxicity(ToxicityTolerance::Medium, 1.0)], text)
        .await;
    assert_eq!(medium.weighted_score, 1.0);

    let high = evaluator
        .evaluate(&[Rule::toxicity(ToxicityTolerance::High, 1.0)], text)
        .await;
    assert_eq!(high.weighted_score, 1.0);
}

#[tokio::test]
async fn toxicity_failure_fails_rule_and_is_not_cached() {
    let toxicity = Arc::new(StubToxicity::failing());
    let evaluator = evaluator(Arc::new(StubLanguage::detecting("en")), toxicity.clone());
    let rules = [Rule::toxicity(ToxicityTolerance::Low, 1.0)];

    let result = evaluator.evaluate(&rules, "hello").await;
    assert_eq!(result.rules[&RuleName::Toxicity].passed, Some(false));
    assert!(result.toxicity_raw.is_none());

    evaluator.evaluate(&rules, "hello").await;
    assert_eq!(toxicity.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn toxicity_timeout_fails_rule_without_error() {
    let slow: Arc<dyn ToxicityClassifier> = Arc::new(SlowOracle {
        delay: Duration::from_secs(5),
    });
    let language: Arc<dyn LanguageDetector> = Arc::new(StubLanguage::detecting("en"));
    let evaluator = RuleEvaluator::new(
        language,
        slow,
        Arc::new(ToxicityCache::new(16)),
        fast_guard(),
    );

    let result = evaluator
        .evaluate(&[Rule::toxicity(ToxicityTolerance::Low, 1.0)], "hello")
        .await;
    assert_eq!(result.weighted_score, 0.0);
}

#[tokio::test]
async fn length_bounds_and_keywords() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("en")),
        Arc::new(StubToxicity::clean()),
    );
    let rules = vec![
        Rule::new(RuleName::MaxLength, RuleValue::Count(5), 0.5),
        Rule::new(
            RuleName::ProhibitedKeywords,
            RuleValue::Keywords(vec!["spam".to_string()]),
            0.5,
        ),
    ];

    let passing = evaluator.evaluate(&rules, "A short clean note").await;
    assert_eq!(passing.weighted_score, 1.0);

    let failing = evaluator
        .evaluate(&rules, "Buy SPAM now, the best spam in the whole world")
        .await;
    assert_eq!(failing.weighted_score, 0.0);

    let unlimited = vec![Rule::new(RuleName::MaxLength, RuleValue::Count(0), 1.0)];
    let result = evaluator.evaluate(&unlimited, &english_words(500)).await;
    assert_eq!(result.weighted_score, 1.0);
}

#[tokio::test]
async fn duplicate_rules_both_count_and_later_outcome_is_kept() {
    let evaluator = evaluator(
        Arc::new(StubLanguage::detecting("en")),
        Arc::new(StubToxicity::clean()),
    );
    let rules = vec![Rule::min_length(5, 0.5), Rule::min_length(50, 0.5)];

    let result = evaluator.evaluate(&rules, &english_words(10)).await;

    assert_eq!(result.weighted_score, 0.5);
    assert_eq!(result.rules.len(), 1);
    assert_eq!(result.rules[&RuleName::MinLength].passed, Some(false));
}

#[test]
fn coarse_mode_uses_partial_penalties() {
    let rules = standard_rules();

    let result = RuleEvaluator::evaluate_coarse(&rules, "short text");
    assert_eq!(result.rules[&RuleName::Language].score, 0.5);
    assert_eq!(result.rules[&RuleName::MinLength].score, 0.4);
    assert_eq!(result.rules[&RuleName::Toxicity].score, 1.0);
    // 0.4 * 0.5 + 0.3 * 0.4 + 0.3 * 1.0
    assert_eq!(result.weighted_score, 0.62);

    let rules = vec![
        Rule::toxicity(ToxicityTolerance::High, 0.5),
        Rule::new(RuleName::MaxLength, RuleValue::Count(10), 0.5),
    ];
    let result = RuleEvaluator::evaluate_coarse(&rules, "anything");
    assert_eq!(result.rules[&RuleName::Toxicity].score, 0.3);
    assert_eq!(result.rules[&RuleName::MaxLength].passed, None);
    assert_eq!(result.weighted_score, 0.4);
}

#[tokio::test]
async fn coarse_mode_never_calls_oracles() {
    let language = Arc::new(StubLanguage::detecting("en"));
    let toxicity = Arc::new(StubToxicity::clean());
    let evaluator = evaluator(language.clone(), toxicity.clone());

    let result = evaluator
        .evaluate_with_mode(
            &standard_rules(),
            "This english sentence is long enough to pass ten whole words easily",
            ScoringMode::Coarse,
        )
        .await;

    assert_eq!(result.weighted_score, 1.0);
    assert_eq!(language.calls.load(Ordering::SeqCst), 0);
    assert_eq!(toxicity.calls.load(Ordering::SeqCst), 0);
}
