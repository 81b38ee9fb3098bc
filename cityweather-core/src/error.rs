//! Typed errors raised at the provider boundary and by the pipeline.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::Service;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Network error talking to {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error(
        "Missing credential '{0}'.\n\
         Hint: set {env} or run `cityweather configure {0}`.",
        env = .0.env_var()
    )]
    MissingCredential(Service),

    #[error("No geocoding match for '{0}'")]
    GeocodeNoMatch(String),

    #[error("Invalid blob storage connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Failed to access config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

impl PipelineError {
    /// Non-success HTTP status from a provider. These are the only failures
    /// the pipeline reports and recovers from rather than aborting.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
