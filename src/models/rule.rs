//! Rule vocabulary and rule records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Loosely-specified rule as produced by an extraction oracle.
///
/// Every field may be missing or carry any JSON type; the normalizer decides
/// what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub weight: Value,
}

impl RawRule {
    pub fn new(name: impl Into<Value>, value: impl Into<Value>, weight: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            weight: weight.into(),
        }
    }
}

/// Closed rule vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    Language,
    ExcludedLanguage,
    MinLength,
    MaxLength,
    Toxicity,
    ProhibitedKeywords,
}

impl RuleName {
    pub const ALL: [RuleName; 6] = [
        RuleName::Language,
        RuleName::ExcludedLanguage,
        RuleName::MinLength,
        RuleName::MaxLength,
        RuleName::Toxicity,
        RuleName::ProhibitedKeywords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Language => "language",
            RuleName::ExcludedLanguage => "excluded_language",
            RuleName::MinLength => "min_length",
            RuleName::MaxLength => "max_length",
            RuleName::Toxicity => "toxicity",
            RuleName::ProhibitedKeywords => "prohibited_keywords",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleName {
    type Err = String;

    /// Exact vocabulary names only; synonyms are resolved by the normalizer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown rule name: {s}"))
    }
}

/// How much toxicity a rule tolerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToxicityTolerance {
    Low,
    Medium,
    High,
}

impl ToxicityTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToxicityTolerance::Low => "low",
            ToxicityTolerance::Medium => "medium",
            ToxicityTolerance::High => "high",
        }
    }
}

impl FromStr for ToxicityTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ToxicityTolerance::Low),
            "medium" => Ok(ToxicityTolerance::Medium),
            "high" => Ok(ToxicityTolerance::High),
            other => Err(format!("unknown toxicity tolerance: {other}")),
        }
    }
}

/// Typed rule value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Count(u64),
    Text(String),
    Keywords(Vec<String>),
}

impl RuleValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RuleValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            RuleValue::Count(count) => Some(*count),
            _ => None,
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            RuleValue::Keywords(keywords) => keywords,
            _ => &[],
        }
    }

    /// Tolerance for a toxicity rule; anything unrecognised reads as `low`
    pub fn tolerance(&self) -> ToxicityTolerance {
        self.as_text()
            .and_then(|text| text.parse().ok())
            .unwrap_or(ToxicityTolerance::Low)
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Count(count) => write!(f, "{count}"),
            RuleValue::Text(text) => f.write_str(text),
            RuleValue::Keywords(keywords) => f.write_str(&keywords.join(", ")),
        }
    }
}

/// Normalized rule restricted to the vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: RuleName,
    pub value: RuleValue,
    pub weight: f64,
}

impl Rule {
    pub fn new(name: RuleName, value: RuleValue, weight: f64) -> Self {
        Self {
            name,
            value,
            weight,
        }
    }

    pub fn language(language: &str, weight: f64) -> Self {
        Self::new(RuleName::Language, RuleValue::Text(language.to_string()), weight)
    }

    pub fn min_length(words: u64, weight: f64) -> Self {
        Self::new(RuleName::MinLength, RuleValue::Count(words), weight)
    }

    pub fn toxicity(tolerance: ToxicityTolerance, weight: f64) -> Self {
        Self::new(
            RuleName::Toxicity,
            RuleValue::Text(tolerance.as_str().to_string()),
            weight,
        )
    }
}
