//! Hugging Face inference API client
//!
//! One client per hosted model. Text classification models back the
//! toxicity classifier and the language detector; an NLI model backs
//! zero-shot classification.

use crate::error::OracleError;
use crate::models::evaluation::{LabelScore, RawLabelScores, ToxicityPrediction};
use crate::oracles::{
    LanguageDetector, ToxicityClassifier, ZeroShotClassifier, LANGUAGE_DETECTOR,
    TOXICITY_CLASSIFIER, ZERO_SHOT_CLASSIFIER,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Deserialize)]
struct LabelPrediction {
    label: String,
    score: f64,
}

/// Text classification comes back either per-input nested or flat
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelPrediction>>),
    Flat(Vec<LabelPrediction>),
}

impl ClassificationResponse {
    fn top(self) -> Option<LabelPrediction> {
        let predictions = match self {
            ClassificationResponse::Nested(batches) => batches.into_iter().next()?,
            ClassificationResponse::Flat(predictions) => predictions,
        };
        predictions
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns { labels: Vec<String>, scores: Vec<f64> },
    Rows(Vec<LabelPrediction>),
}

impl ZeroShotResponse {
    fn into_scores(self) -> RawLabelScores {
        match self {
            ZeroShotResponse::Columns { labels, scores } => labels
                .into_iter()
                .zip(scores)
                .map(|(label, score)| (label, LabelScore::Scalar(score)))
                .collect(),
            ZeroShotResponse::Rows(rows) => rows
                .into_iter()
                .map(|row| (row.label, LabelScore::Scalar(row.score)))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

pub struct HuggingFaceClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    model: String,
}

impl HuggingFaceClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>, model: impl Into<String>) -> Self {
        Self::with_client(base_url, api_token, model, reqwest::Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_token: Option<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn infer<T: DeserializeOwned>(
        &self,
        oracle: &'static str,
        payload: serde_json::Value,
    ) -> Result<T, OracleError> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, self.model))
            .json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
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

        response
            .json()
            .await
            .map_err(|err| OracleError::malformed(oracle, err))
    }

    async fn top_label(&self, oracle: &'static str, text: &str) -> Result<LabelPrediction, OracleError> {
        let response: ClassificationResponse = self.infer(oracle, json!({ "inputs": text })).await?;
        response
            .top()
            .ok_or_else(|| OracleError::malformed(oracle, "no predictions returned"))
    }
}

#[async_trait]
impl ToxicityClassifier for HuggingFaceClient {
    async fn classify_toxicity(&self, text: &str) -> Result<ToxicityPrediction, OracleError> {
        let top = self.top_label(TOXICITY_CLASSIFIER, text).await?;
        Ok(ToxicityPrediction {
            label: top.label,
            score: top.score,
        })
    }
}

#[async_trait]
impl LanguageDetector for HuggingFaceClient {
    async fn detect_language(&self, text: &str) -> Result<String, OracleError> {
        Ok(self.top_label(LANGUAGE_DETECTOR, text).await?.label)
    }
}

#[async_trait]
impl ZeroShotClassifier for HuggingFaceClient {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
        multi_label: bool,
    ) -> Result<RawLabelScores, OracleError> {
        let payload = json!({
            "inputs": text,
            "parameters": ZeroShotParameters {
                candidate_labels: labels,
                multi_label,
            },
        });
        let response: ZeroShotResponse = self.infer(ZERO_SHOT_CLASSIFIER, payload).await?;
        Ok(response.into_scores())
    }
}
