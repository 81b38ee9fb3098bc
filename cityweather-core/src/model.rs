use chrono::NaiveDate;

pub const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Current conditions for a city, temperature already in Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub description: String,
    pub temperature_celsius: f64,
    pub humidity: u8,
    pub wind_speed: f64,
}

/// A typed reading together with the provider's response body, byte for
/// byte, which is what gets persisted to blob storage.
#[derive(Debug, Clone)]
pub struct CurrentConditions {
    pub reading: WeatherReading,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// One forecast time slot, in provider order.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: u8,
    pub description: String,
}
