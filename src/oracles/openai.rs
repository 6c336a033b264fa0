//! OpenAI-compatible chat completions client
//!
//! Serves as the rule extractor and, when a normalizer model is configured,
//! as the normalization oracle. Both ask for a bare JSON array of rules.

use crate::error::OracleError;
use crate::models::rule::{RawRule, RuleName};
use crate::oracles::{NormalizationOracle, RuleExtractor, RULE_EXTRACTOR, RULE_NORMALIZER};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const EXTRACTION_PROMPT: &str = r#"You are a rule extraction engine for a text quality evaluator.
Given a description of the text a dataset should contain, extract structured JSON rules.

Each rule has:
- name (string, e.g. "language", "min_length", "toxicity")
- value (string or number depending on the rule)
- weight (float between 0 and 1, all weights should sum to about 1.0)

Return ONLY a JSON array of rules. No text outside JSON.
Example:
[
  { "name": "language", "value": "English", "weight": 0.4 },
  { "name": "min_length", "value": 100, "weight": 0.3 },
  { "name": "toxicity", "value": "low", "weight": 0.3 }
]"#;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, model, reqwest::Client::new())
    }

    /// Client reusing an existing connection pool
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One system + user exchange; returns the reply content
    async fn complete(
        &self,
        oracle: &'static str,
        system: &str,
        user: &str,
    ) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| OracleError::transport(oracle, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status {
                oracle,
                status: status.as_u16(),
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|err| OracleError::malformed(oracle, err))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::malformed(oracle, "reply has no content"))
    }
}

/// Parse a reply into raw rules.
///
/// Accepts a JSON array, optionally inside a ``` fence, or an object with a
/// `rules` array.
pub fn parse_rules(oracle: &'static str, content: &str) -> Result<Vec<RawRule>, OracleError> {
    let body = strip_fence(content);
    let parsed: Value =
        serde_json::from_str(body).map_err(|err| OracleError::malformed(oracle, err))?;

    let rules = match parsed {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("rules") {
            Some(Value::Array(items)) => items,
            _ => return Err(OracleError::malformed(oracle, "expected a JSON array of rules")),
        },
        _ => return Err(OracleError::malformed(oracle, "expected a JSON array of rules")),
    };

    rules
        .into_iter()
        .map(|rule| serde_json::from_value(rule).map_err(|err| OracleError::malformed(oracle, err)))
        .collect()
}

fn strip_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let body = fenced.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}

fn normalization_prompt() -> String {
    let names: Vec<&str> = RuleName::ALL.iter().map(RuleName::as_str).collect();
    format!(
        r#"You are a rule normalization system.
Map messy or inconsistent rules onto a standard JSON format.

Each rule must have:
- name: one of {names:?}
- value: the correct type (string, integer, or list of strings)
- weight: float between 0.0 and 1.0

Skip any rule you cannot confidently map.
Return only a JSON array of objects.

Example input:
[{{"name": "no french allowed", "value": "", "weight": 1.0}}, {{"name": "min words 100", "value": "100", "weight": 1.0}}]

Example output:
[
  {{"name": "excluded_language", "value": "French", "weight": 0.5}},
  {{"name": "min_length", "value": 100, "weight": 0.5}}
]"#
    )
}

#[async_trait]
impl RuleExtractor for OpenAiClient {
    async fn extract_rules(&self, description: &str) -> Result<Vec<RawRule>, OracleError> {
        let content = self
            .complete(RULE_EXTRACTOR, EXTRACTION_PROMPT, description)
            .await?;
        let rules = parse_rules(RULE_EXTRACTOR, &content)?;
        debug!(model = %self.model, rules = rules.len(), "Rules extracted");
        Ok(rules)
    }
}

#[async_trait]
impl NormalizationOracle for OpenAiClient {
    async fn normalize(&self, rules: &[RawRule]) -> Result<Vec<RawRule>, OracleError> {
        let payload =
            serde_json::to_string(rules).map_err(|err| OracleError::malformed(RULE_NORMALIZER, err))?;
        let content = self
            .complete(RULE_NORMALIZER, &normalization_prompt(), &payload)
            .await?;
        parse_rules(RULE_NORMALIZER, &content)
    }
}
