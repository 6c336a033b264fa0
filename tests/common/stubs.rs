//! In-process oracle doubles shared by unit and integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use praxis::config::ScoringConfig;
use praxis::evaluation::{Oracles, QualityEngine};
use praxis::models::{LabelScore, RawLabelScores, RawRule, ToxicityPrediction};
use praxis::oracles::{
    LanguageDetector, NormalizationOracle, OracleGuard, RuleExtractor, ToxicityClassifier,
    ZeroShotClassifier, ZipEntryExtractor,
};
use praxis::OracleError;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Short timeout, no retries, so failure paths finish quickly
pub fn fast_guard() -> OracleGuard {
    OracleGuard::new(Duration::from_millis(200), 0).with_min_delay(Duration::from_millis(1))
}

pub fn unavailable(oracle: &'static str) -> OracleError {
    OracleError::Transport {
        oracle,
        message: "connection refused".to_string(),
    }
}

/// `count` English words separated by spaces
pub fn english_words(count: usize) -> String {
    const WORDS: [&str; 10] = [
        "the", "quick", "brown", "fox", "jumps", "over", "a", "lazy", "sleeping", "dog",
    ];
    (0..count)
        .map(|i| WORDS[i % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn standard_raw_rules() -> Vec<RawRule> {
    vec![
        RawRule::new("language", "English", 0.4),
        RawRule::new("min_length", 10, 0.3),
        RawRule::new("toxicity", "low", 0.3),
    ]
}

pub struct StubExtractor {
    answer: Result<Vec<RawRule>, OracleError>,
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn returning(rules: Vec<RawRule>) -> Self {
        Self {
            answer: Ok(rules),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(unavailable("rule-extractor")),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RuleExtractor for StubExtractor {
    async fn extract_rules(&self, _description: &str) -> Result<Vec<RawRule>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

pub struct StubNormalization {
    answer: Result<Vec<RawRule>, OracleError>,
    pub calls: AtomicUsize,
}

impl StubNormalization {
    pub fn returning(rules: Vec<RawRule>) -> Self {
        Self {
            answer: Ok(rules),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(unavailable("rule-normalizer")),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NormalizationOracle for StubNormalization {
    async fn normalize(&self, _rules: &[RawRule]) -> Result<Vec<RawRule>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Reports a fixed language label, or fails when built with `failing`
pub struct StubLanguage {
    label: Option<String>,
    pub calls: AtomicUsize,
}

impl StubLanguage {
    pub fn detecting(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            label: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LanguageDetector for StubLanguage {
    async fn detect_language(&self, _text: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.label
            .clone()
            .ok_or_else(|| unavailable("language-detector"))
    }
}

pub struct StubToxicity {
    prediction: Option<ToxicityPrediction>,
    pub calls: AtomicUsize,
}

impl StubToxicity {
    pub fn predicting(label: &str, score: f64) -> Self {
        Self {
            prediction: Some(ToxicityPrediction {
                label: label.to_string(),
                score,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn clean() -> Self {
        Self::predicting("non-toxic", 0.02)
    }

    pub fn failing() -> Self {
        Self {
            prediction: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ToxicityClassifier for StubToxicity {
    async fn classify_toxicity(&self, _text: &str) -> Result<ToxicityPrediction, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prediction
            .clone()
            .ok_or_else(|| unavailable("toxicity-classifier"))
    }
}

/// Gives every requested label the same score
pub struct StubZeroShot {
    score: Option<f64>,
    pub calls: AtomicUsize,
}

impl StubZeroShot {
    pub fn scoring(score: f64) -> Self {
        Self {
            score: Some(score),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            score: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for StubZeroShot {
    async fn classify(
        &self,
        _text: &str,
        labels: &[String],
        _multi_label: bool,
    ) -> Result<RawLabelScores, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let score = self.score.ok_or_else(|| unavailable("zero-shot-classifier"))?;
        Ok(labels
            .iter()
            .map(|label| (label.clone(), LabelScore::Scalar(score)))
            .collect())
    }
}

/// Answers only after `delay`; pair with a shorter guard timeout
pub struct SlowOracle {
    pub delay: Duration,
}

#[async_trait]
impl ZeroShotClassifier for SlowOracle {
    async fn classify(
        &self,
        _text: &str,
        labels: &[String],
        _multi_label: bool,
    ) -> Result<RawLabelScores, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(labels
            .iter()
            .map(|label| (label.clone(), LabelScore::Scalar(1.0)))
            .collect())
    }
}

#[async_trait]
impl ToxicityClassifier for SlowOracle {
    async fn classify_toxicity(&self, _text: &str) -> Result<ToxicityPrediction, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(ToxicityPrediction {
            label: "non-toxic".to_string(),
            score: 0.01,
        })
    }
}

/// In-memory ZIP archive; names ending in `/` become directories
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(content).expect("write entry");
        }
    }
    writer.finish().expect("finish archive").into_inner()
}

/// Stub oracles wired into an engine, with handles kept for call counting
pub struct StubOracles {
    pub extractor: Arc<StubExtractor>,
    pub language: Arc<StubLanguage>,
    pub toxicity: Arc<StubToxicity>,
    pub zero_shot: Arc<StubZeroShot>,
}

impl StubOracles {
    /// English, non-toxic, every label scored 0.8
    pub fn healthy() -> Self {
        Self {
            extractor: Arc::new(StubExtractor::returning(standard_raw_rules())),
            language: Arc::new(StubLanguage::detecting("en")),
            toxicity: Arc::new(StubToxicity::clean()),
            zero_shot: Arc::new(StubZeroShot::scoring(0.8)),
        }
    }

    pub fn oracles(&self) -> Oracles {
        Oracles {
            rule_extractor: self.extractor.clone(),
            normalization: None,
            language: self.language.clone(),
            toxicity: self.toxicity.clone(),
            zero_shot: self.zero_shot.clone(),
            entries: Arc::new(ZipEntryExtractor::default()),
        }
    }

    pub fn engine(&self) -> QualityEngine {
        self.engine_with(&ScoringConfig::default())
    }

    pub fn engine_with(&self, scoring: &ScoringConfig) -> QualityEngine {
        QualityEngine::new(scoring, fast_guard(), self.oracles())
    }
}
