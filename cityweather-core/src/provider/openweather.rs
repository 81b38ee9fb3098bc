use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::{Config, Service},
    error::{PipelineError, Result},
    model::{CurrentConditions, ForecastEntry, WeatherReading, kelvin_to_celsius},
};

use super::{WeatherProvider, decode, invalid_shape, join_url, send};

const PROVIDER: &str = "openweather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(http: Client, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http,
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(
            http,
            config.credential(Service::OpenWeather).map(str::to_owned),
            config.openweather_url(),
        )
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or(PipelineError::MissingCredential(Service::OpenWeather))
    }

    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions> {
        let url = join_url(&self.base_url, "data/2.5/weather");
        tracing::debug!(%url, city, "requesting current weather");

        // No `units` here: temperatures come back in Kelvin and the raw body
        // is persisted untouched.
        let request = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key()?)]);

        let body = send(PROVIDER, request).await?;
        let parsed: OwCurrentResponse = decode(PROVIDER, &body)?;

        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| invalid_shape(PROVIDER, "current weather has an empty `weather` array"))?;

        Ok(CurrentConditions {
            reading: WeatherReading {
                description,
                temperature_celsius: kelvin_to_celsius(parsed.main.temp),
                humidity: parsed.main.humidity,
                wind_speed: parsed.wind.speed,
            },
            raw: body,
        })
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>> {
        let url = join_url(&self.base_url, "data/2.5/forecast");
        tracing::debug!(%url, city, "requesting 5-day forecast");

        let request = self.http.get(&url).query(&[
            ("q", city),
            ("appid", self.api_key()?),
            ("units", "metric"),
        ]);

        let body = send(PROVIDER, request).await?;
        let parsed: OwForecastResponse = decode(PROVIDER, &body)?;

        parsed.list.into_iter().map(flatten_entry).collect()
    }
}

fn flatten_entry(entry: OwForecastEntry) -> Result<ForecastEntry> {
    let date = DateTime::from_timestamp(entry.dt, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| invalid_shape(PROVIDER, "forecast timestamp out of range"))?;

    let description = entry
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| invalid_shape(PROVIDER, "forecast entry has an empty `weather` array"))?;

    Ok(ForecastEntry {
        date,
        temperature: entry.main.temp,
        humidity: entry.main.humidity,
        description,
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<CurrentConditions> {
        self.fetch_current(city).await
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>> {
        self.fetch_forecast(city).await
    }
}
