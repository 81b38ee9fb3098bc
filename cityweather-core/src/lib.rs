//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for every external provider (weather, sentiment, geocoding,
//!   static maps, blob storage)
//! - Forecast statistics
//! - The pipeline that runs them in order for one city
//!
//! It is used by `cityweather-cli`, but the pipeline takes trait objects so it
//! can be driven with other providers or fakes.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod stats;

pub use config::{Config, Service};
pub use error::PipelineError;
pub use model::{Coordinates, CurrentConditions, ForecastEntry, SentimentScores, WeatherReading};
pub use pipeline::{ChartRenderer, NoChart, Pipeline, RunOutcome};
pub use provider::{BlobStore, Geocoder, SentimentAnalyzer, WeatherProvider};
pub use stats::ForecastStats;
