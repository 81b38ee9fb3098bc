//! The single-run orchestration: current weather, then every downstream step
//! that depends on it, then the forecast analysis.

use std::{fmt::Debug, io::Write};

use reqwest::Client;

use crate::{
    config::Config,
    error::Result,
    model::{ForecastEntry, WeatherReading},
    provider::{
        BlobStore, Geocoder, SentimentAnalyzer, WeatherProvider,
        blob::{AzureBlobStore, blob_name},
        geocode::NominatimGeocoder,
        maps::StaticMapLink,
        openweather::OpenWeatherProvider,
        sentiment::TextAnalyticsClient,
    },
    stats::ForecastStats,
};

pub const WEATHER_UNAVAILABLE: &str = "Unable to fetch weather data. Please try again.";
pub const FORECAST_UNAVAILABLE: &str = "Unable to fetch historical weather data. Please try again.";
pub const NO_FORECAST_DATA: &str = "No historical weather data available.";

/// Draws temperature against date for the forecast.
pub trait ChartRenderer: Send + Sync + Debug {
    fn render(&self, city: &str, entries: &[ForecastEntry]) -> Result<()>;
}

/// Renderer for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChart;

impl ChartRenderer for NoChart {
    fn render(&self, _city: &str, entries: &[ForecastEntry]) -> Result<()> {
        tracing::debug!(points = entries.len(), "chart rendering disabled");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The current-conditions fetch returned a non-success status; nothing else ran.
    WeatherUnavailable,
    Completed {
        /// `None` when the forecast fetch failed or returned no entries.
        forecast_stats: Option<ForecastStats>,
    },
}

#[derive(Debug)]
pub struct Pipeline {
    weather: Box<dyn WeatherProvider>,
    sentiment: Box<dyn SentimentAnalyzer>,
    geocoder: Box<dyn Geocoder>,
    maps: StaticMapLink,
    store: Box<dyn BlobStore>,
    chart: Box<dyn ChartRenderer>,
}

impl Pipeline {
    pub fn new(
        weather: Box<dyn WeatherProvider>,
        sentiment: Box<dyn SentimentAnalyzer>,
        geocoder: Box<dyn Geocoder>,
        maps: StaticMapLink,
        store: Box<dyn BlobStore>,
        chart: Box<dyn ChartRenderer>,
    ) -> Self {
        Self {
            weather,
            sentiment,
            geocoder,
            maps,
            store,
            chart,
        }
    }

    /// Wire up the real providers. Credentials are checked lazily by each step.
    pub fn from_config(config: &Config, chart: Box<dyn ChartRenderer>) -> Self {
        let http = Client::new();

        Self::new(
            Box::new(OpenWeatherProvider::from_config(http.clone(), config)),
            Box::new(TextAnalyticsClient::from_config(http.clone(), config)),
            Box::new(NominatimGeocoder::from_config(http.clone(), config)),
            StaticMapLink::from_config(config),
            Box::new(AzureBlobStore::from_config(http, config)),
            chart,
        )
    }

    /// Run every step for `city`, writing the operator report to `out`.
    ///
    /// A non-success status from either weather endpoint is reported and
    /// handled here. Every other failure aborts the run and is returned.
    pub async fn run<W: Write>(&self, city: &str, out: &mut W) -> Result<RunOutcome> {
        tracing::info!(city, "fetching current weather");
        let current = match self.weather.current(city).await {
            Ok(current) => current,
            Err(e) if e.is_status() => {
                tracing::warn!(error = %e, "current weather unavailable");
                writeln!(out, "{WEATHER_UNAVAILABLE}")?;
                return Ok(RunOutcome::WeatherUnavailable);
            }
            Err(e) => return Err(e),
        };

        let reading = &current.reading;
        write_reading(out, city, reading)?;

        tracing::info!("scoring sentiment");
        let text = format!("Weather forecast for {city}: {}", reading.description);
        let scores = self.sentiment.analyze(&text).await?;
        writeln!(
            out,
            "Sentiment scores: Positive={:.2}, Negative={:.2}, Neutral={:.2}",
            scores.positive, scores.negative, scores.neutral
        )?;

        tracing::info!("geocoding");
        let coords = self.geocoder.locate(city).await?;
        writeln!(
            out,
            "Coordinates for {city}: Latitude={:?}, Longitude={:?}",
            coords.latitude, coords.longitude
        )?;

        let map_url = self.maps.url(coords)?;
        writeln!(out, "Weather forecast map:")?;
        writeln!(out, "Weather: {}", reading.description)?;
        writeln!(out, "{map_url}")?;

        tracing::info!("storing raw weather data");
        self.store
            .upload(&blob_name(city), current.raw.into_bytes())
            .await?;

        tracing::info!("fetching forecast");
        let forecast = match self.weather.forecast(city).await {
            Ok(entries) => Some(entries),
            Err(e) if e.is_status() => {
                tracing::warn!(error = %e, "forecast unavailable");
                writeln!(out, "{FORECAST_UNAVAILABLE}")?;
                None
            }
            Err(e) => return Err(e),
        };

        let forecast_stats = match forecast {
            Some(entries) => self.analyze_forecast(city, &entries, out)?,
            None => None,
        };

        Ok(RunOutcome::Completed { forecast_stats })
    }

    fn analyze_forecast<W: Write>(
        &self,
        city: &str,
        entries: &[ForecastEntry],
        out: &mut W,
    ) -> Result<Option<ForecastStats>> {
        let Some(stats) = ForecastStats::compute(entries) else {
            writeln!(out, "{NO_FORECAST_DATA}")?;
            return Ok(None);
        };

        self.chart.render(city, entries)?;

        writeln!(out, "Historical Weather Data Analysis:")?;
        writeln!(out, "Mean Temperature: {:.2} °C", stats.mean)?;
        writeln!(out, "Max Temperature: {:.2} °C", stats.max)?;
        writeln!(out, "Min Temperature: {:.2} °C", stats.min)?;

        Ok(Some(stats))
    }
}

fn write_reading<W: Write>(out: &mut W, city: &str, reading: &WeatherReading) -> Result<()> {
    writeln!(out, "Weather forecast for {city}:")?;
    writeln!(out, "Weather: {}", reading.description)?;
    writeln!(out, "Temperature: {:.2} °C", reading.temperature_celsius)?;
    writeln!(out, "Humidity: {}%", reading.humidity)?;
    // `{:?}` keeps the trailing `.0` on whole numbers.
    writeln!(out, "Wind Speed: {:?} m/s", reading.wind_speed)?;
    Ok(())
}
