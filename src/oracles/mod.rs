//! External judgment providers consumed by the evaluation core.
//!
//! Each oracle is a trait so the core never depends on a transport. Every
//! call site wraps the oracle in an [`OracleGuard`] and owns its fallback.

pub mod archive;
pub mod guard;
pub mod huggingface;
pub mod openai;

pub use archive::ZipEntryExtractor;
pub use guard::OracleGuard;
pub use huggingface::HuggingFaceClient;
pub use openai::OpenAiClient;

use crate::error::{EvaluationError, OracleError};
use crate::models::{RawLabelScores, RawRule, ToxicityPrediction};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub const RULE_EXTRACTOR: &str = "rule-extractor";
pub const RULE_NORMALIZER: &str = "rule-normalizer";
pub const LANGUAGE_DETECTOR: &str = "language-detector";
pub const TOXICITY_CLASSIFIER: &str = "toxicity-classifier";
pub const ZERO_SHOT_CLASSIFIER: &str = "zero-shot-classifier";

/// Natural language description to structured rules
#[async_trait]
pub trait RuleExtractor: Send + Sync {
    async fn extract_rules(&self, description: &str) -> Result<Vec<RawRule>, OracleError>;
}

/// Maps messy rules onto the vocabulary; optional first pass of the normalizer
#[async_trait]
pub trait NormalizationOracle: Send + Sync {
    async fn normalize(&self, rules: &[RawRule]) -> Result<Vec<RawRule>, OracleError>;
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Language code of the text as reported by the detector
    async fn detect_language(&self, text: &str) -> Result<String, OracleError>;
}

#[async_trait]
pub trait ToxicityClassifier: Send + Sync {
    async fn classify_toxicity(&self, text: &str) -> Result<ToxicityPrediction, OracleError>;
}

#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
        multi_label: bool,
    ) -> Result<RawLabelScores, OracleError>;
}

/// Archive bytes to named text entries
pub trait EntryExtractor: Send + Sync {
    fn extract_entries(&self, archive: &[u8]) -> Result<BTreeMap<String, String>, EvaluationError>;
}
