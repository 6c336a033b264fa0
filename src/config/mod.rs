//! Environment-driven configuration
//!
//! Every knob has a default; `from_env` only fails on values that are set
//! but unusable.

use crate::cache::DEFAULT_CAPACITY;
use crate::evaluation::dataset::{default_labels, default_rules, DEFAULT_CONCURRENCY};
use crate::models::policy::{DatasetScorePolicy, FusionPolicy, ScoringMode};
use crate::models::rule::Rule;
use crate::oracles::guard::{OracleGuard, DEFAULT_MAX_RETRIES};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_HF_TOXICITY_MODEL: &str = "unitary/toxic-bert";
const DEFAULT_HF_LANGUAGE_MODEL: &str = "papluca/xlm-roberta-base-language-detection";
const DEFAULT_HF_ZERO_SHOT_MODEL: &str = "MoritzLaurer/mDeBERTa-v3-base-xnli-multilingual-nli-2mil7";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid URL for {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Deployment environment name (`ENVIRONMENT`, default `development`)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

/// Timeout and retry budget shared by all oracle calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleConfig {
    pub timeout: Duration,
    pub max_retries: usize,
}

impl OracleConfig {
    pub fn guard(&self) -> OracleGuard {
        OracleGuard::new(self.timeout, self.max_retries)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// OpenAI-compatible chat completions endpoint used for rule extraction
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    /// Model for the normalization pass; `None` keeps normalization local
    pub normalizer_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HuggingFaceConfig {
    pub api_token: Option<String>,
    pub base_url: Url,
    pub toxicity_model: String,
    pub language_model: String,
    pub zero_shot_model: String,
}

/// Scoring policies and dataset defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub fusion_policy: FusionPolicy,
    pub dataset_policy: DatasetScorePolicy,
    pub description_mode: ScoringMode,
    pub cache_capacity: usize,
    pub dataset_concurrency: usize,
    pub dataset_rules: Vec<Rule>,
    pub dataset_labels: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fusion_policy: FusionPolicy::default(),
            dataset_policy: DatasetScorePolicy::default(),
            description_mode: ScoringMode::default(),
            cache_capacity: DEFAULT_CAPACITY,
            dataset_concurrency: DEFAULT_CONCURRENCY,
            dataset_rules: default_rules(),
            dataset_labels: default_labels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub oracle: OracleConfig,
    pub openai: OpenAiConfig,
    pub huggingface: HuggingFaceConfig,
    pub scoring: ScoringConfig,
}

impl Config {
    /// Load from process environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let oracle = OracleConfig {
            timeout: Duration::from_millis(parse_var(
                "ORACLE_TIMEOUT_MS",
                var("ORACLE_TIMEOUT_MS"),
                DEFAULT_TIMEOUT_MS,
            )?),
            max_retries: parse_var(
                "ORACLE_MAX_RETRIES",
                var("ORACLE_MAX_RETRIES"),
                DEFAULT_MAX_RETRIES,
            )?,
        };

        let openai = OpenAiConfig {
            api_key: var("OPENAI_API_KEY"),
            base_url: url_var(
                "OPENAI_BASE_URL",
                var("OPENAI_BASE_URL"),
                DEFAULT_OPENAI_BASE_URL,
            )?,
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            normalizer_model: var("NORMALIZER_MODEL"),
        };

        let huggingface = HuggingFaceConfig {
            api_token: var("HF_API_TOKEN"),
            base_url: url_var(
                "HF_INFERENCE_URL",
                var("HF_INFERENCE_URL"),
                DEFAULT_HF_INFERENCE_URL,
            )?,
            toxicity_model: var("HF_TOXICITY_MODEL")
                .unwrap_or_else(|| DEFAULT_HF_TOXICITY_MODEL.to_string()),
            language_model: var("HF_LANGUAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_HF_LANGUAGE_MODEL.to_string()),
            zero_shot_model: var("HF_ZERO_SHOT_MODEL")
                .unwrap_or_else(|| DEFAULT_HF_ZERO_SHOT_MODEL.to_string()),
        };

        let scoring = ScoringConfig {
            fusion_policy: parse_var(
                "FUSION_POLICY",
                var("FUSION_POLICY"),
                FusionPolicy::default(),
            )?,
            dataset_policy: parse_var(
                "DATASET_SCORE_POLICY",
                var("DATASET_SCORE_POLICY"),
                DatasetScorePolicy::default(),
            )?,
            description_mode: parse_var(
                "DESCRIPTION_SCORING",
                var("DESCRIPTION_SCORING"),
                ScoringMode::default(),
            )?,
            cache_capacity: parse_var(
                "SCORE_CACHE_CAPACITY",
                var("SCORE_CACHE_CAPACITY"),
                DEFAULT_CAPACITY,
            )?,
            dataset_concurrency: parse_var(
                "DATASET_CONCURRENCY",
                var("DATASET_CONCURRENCY"),
                DEFAULT_CONCURRENCY,
            )?
            .max(1),
            ..ScoringConfig::default()
        };

        Ok(Self {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_var("PORT", var("PORT"), DEFAULT_PORT)?,
            oracle,
            openai,
            huggingface,
            scoring,
        })
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
            name,
            reason: err.to_string(),
            value,
        }),
    }
}

fn url_var(name: &'static str, raw: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let value = raw.as_deref().unwrap_or(default);
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}
