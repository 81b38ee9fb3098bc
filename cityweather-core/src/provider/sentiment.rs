//! Sentiment scoring through the Azure Text Analytics REST API (v3.1).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, Service},
    error::{PipelineError, Result},
    model::SentimentScores,
};

use super::{SentimentAnalyzer, decode, invalid_shape, join_url, send};

const PROVIDER: &str = "text-analytics";
const SENTIMENT_PATH: &str = "text/analytics/v3.1/sentiment";

#[derive(Debug, Clone)]
pub struct TextAnalyticsClient {
    key: Option<String>,
    endpoint: Option<String>,
    http: Client,
}

impl TextAnalyticsClient {
    pub fn new(http: Client, key: Option<String>, endpoint: Option<String>) -> Self {
        Self { key, endpoint, http }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(
            http,
            config.credential(Service::TextAnalyticsKey).map(str::to_owned),
            config.credential(Service::TextAnalyticsEndpoint).map(str::to_owned),
        )
    }
}

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    documents: [RequestDocument<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestDocument<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    #[serde(default)]
    documents: Vec<DocumentSentiment>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentSentiment {
    confidence_scores: ConfidenceScores,
}

#[derive(Debug, Deserialize)]
struct ConfidenceScores {
    positive: f64,
    neutral: f64,
    negative: f64,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl SentimentAnalyzer for TextAnalyticsClient {
    async fn analyze(&self, text: &str) -> Result<SentimentScores> {
        let key = self
            .key
            .as_deref()
            .ok_or(PipelineError::MissingCredential(Service::TextAnalyticsKey))?;
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(PipelineError::MissingCredential(Service::TextAnalyticsEndpoint))?;

        let url = join_url(endpoint, SENTIMENT_PATH);
        tracing::debug!(%url, "requesting sentiment analysis");

        let payload = SentimentRequest {
            documents: [RequestDocument {
                id: "1",
                language: "en",
                text,
            }],
        };

        let request = self
            .http
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", key)
            .json(&payload);

        let body = send(PROVIDER, request).await?;
        let parsed: SentimentResponse = decode(PROVIDER, &body)?;

        if let Some(doc_err) = parsed.errors.into_iter().next() {
            return Err(PipelineError::Rejected {
                provider: PROVIDER,
                message: format!("{}: {}", doc_err.error.code, doc_err.error.message),
            });
        }

        let scores = parsed
            .documents
            .into_iter()
            .next()
            .map(|d| d.confidence_scores)
            .ok_or_else(|| invalid_shape(PROVIDER, "response contained no documents"))?;

        Ok(SentimentScores {
            positive: scores.positive,
            negative: scores.negative,
            neutral: scores.neutral,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn analyze_sends_single_document_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text/analytics/v3.1/sentiment"))
            .and(header("Ocp-Apim-Subscription-Key", "TA_KEY"))
            .and(body_partial_json(json!({
                "documents": [{"id": "1", "text": "Weather forecast for London: light rain"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{
                    "id": "1",
                    "sentiment": "neutral",
                    "confidenceScores": {"positive": 0.1, "neutral": 0.7, "negative": 0.2},
                    "sentences": [],
                    "warnings": []
                }],
                "errors": [],
                "modelVersion": "2022-11-01"
            })))
            .mount(&server)
            .await;

        let client = TextAnalyticsClient::new(Client::new(), Some("TA_KEY".into()), Some(server.uri()));
        let scores = client
            .analyze("Weather forecast for London: light rain")
            .await
            .unwrap();

        assert_eq!(scores, SentimentScores { positive: 0.1, negative: 0.2, neutral: 0.7 });
    }

    #[tokio::test]
    async fn document_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [],
                "errors": [{"id": "1", "error": {"code": "InvalidArgument", "message": "Invalid document"}}]
            })))
            .mount(&server)
            .await;

        let client = TextAnalyticsClient::new(Client::new(), Some("K".into()), Some(server.uri()));
        let err = client.analyze("x").await.unwrap_err();

        assert!(matches!(err, PipelineError::Rejected { .. }));
        assert!(err.to_string().contains("InvalidArgument"));
    }

    #[tokio::test]
    async fn unauthorized_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = TextAnalyticsClient::new(Client::new(), Some("bad".into()), Some(server.uri()));
        let err = client.analyze("x").await.unwrap_err();
        assert!(err.is_status());
    }

    #[tokio::test]
    async fn missing_endpoint_is_missing_credential() {
        let client = TextAnalyticsClient::new(Client::new(), Some("K".into()), None);
        let err = client.analyze("x").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingCredential(Service::TextAnalyticsEndpoint)
        ));
    }
}
