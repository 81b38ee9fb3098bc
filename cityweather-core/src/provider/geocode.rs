//! Forward geocoding of a place name through Nominatim (OpenStreetMap).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    error::{PipelineError, Result},
    model::Coordinates,
};

use super::{Geocoder, decode, invalid_shape, join_url, send};

const PROVIDER: &str = "nominatim";
/// Nominatim requires an identifying user agent.
pub const USER_AGENT: &str = "weather-forecast";

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(http, config.geocoding_url())
    }
}

// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

fn parse_coordinate(value: &str, name: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| invalid_shape(PROVIDER, &format!("{name} '{value}' is not a number")))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate(&self, place: &str) -> Result<Coordinates> {
        let url = join_url(&self.base_url, "search");
        tracing::debug!(%url, place, "geocoding place name");

        let request = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("q", place), ("format", "json"), ("limit", "1")]);

        let body = send(PROVIDER, request).await?;
        let places: Vec<NominatimPlace> = decode(PROVIDER, &body)?;

        let best = places
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::GeocodeNoMatch(place.to_string()))?;

        Ok(Coordinates {
            latitude: parse_coordinate(&best.lat, "latitude")?,
            longitude: parse_coordinate(&best.lon, "longitude")?,
        })
    }
}
