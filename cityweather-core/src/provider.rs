use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::{
    error::{PipelineError, Result, truncate_body},
    model::{Coordinates, CurrentConditions, ForecastEntry, SentimentScores},
};

pub mod blob;
pub mod geocode;
pub mod maps;
pub mod openweather;
pub mod sentiment;

/// Current conditions and multi-day forecast for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<CurrentConditions>;

    /// Forecast slots in provider order.
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>>;
}

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync + Debug {
    async fn analyze(&self, text: &str) -> Result<SentimentScores>;
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Best single match for a free-text place name.
    async fn locate(&self, place: &str) -> Result<Coordinates>;
}

/// Object storage with replace-on-write semantics.
#[async_trait]
pub trait BlobStore: Send + Sync + Debug {
    async fn upload(&self, blob_name: &str, body: Vec<u8>) -> Result<()>;
}

/// Send a request and return the body of a successful response.
pub(crate) async fn send(provider: &'static str, request: RequestBuilder) -> Result<String> {
    let res = request
        .send()
        .await
        .map_err(|source| PipelineError::Transport { provider, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| PipelineError::Transport { provider, source })?;

    if !status.is_success() {
        tracing::warn!(provider, %status, "provider returned non-success status");
        return Err(PipelineError::Status {
            provider,
            status,
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

pub(crate) fn decode<T: DeserializeOwned>(provider: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| PipelineError::Decode { provider, source })
}

/// Decode failure for shapes serde accepts but the pipeline can't use,
/// e.g. an empty `weather` array.
pub(crate) fn invalid_shape(provider: &'static str, msg: &str) -> PipelineError {
    PipelineError::Decode {
        provider,
        source: <serde_json::Error as serde::de::Error>::custom(msg),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
