use crate::{
    config::{Config, Service},
    error::{PipelineError, Result},
    model::Coordinates,
};

pub const STATIC_MAP_URL: &str = "https://atlas.microsoft.com/map/static/png";
pub const ZOOM: u8 = 8;
pub const LAYER: &str = "basic";
pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 500;

/// Builds Azure Maps static-image links. Never performs a request.
#[derive(Debug, Clone)]
pub struct StaticMapLink {
    subscription_key: Option<String>,
}

impl StaticMapLink {
    pub fn new(subscription_key: Option<String>) -> Self {
        Self { subscription_key }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.credential(Service::AzureMaps).map(str::to_owned))
    }

    /// Map centered on `coords`. The provider expects `center=lon,lat`.
    pub fn url(&self, coords: Coordinates) -> Result<String> {
        let key = self
            .subscription_key
            .as_deref()
            .ok_or(PipelineError::MissingCredential(Service::AzureMaps))?;

        Ok(format!(
            "{STATIC_MAP_URL}?subscription-key={key}&api-version=1.0&center={:?},{:?}&zoom={ZOOM}&layer={LAYER}&height={HEIGHT}&width={WIDTH}",
            coords.longitude, coords.latitude,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_puts_longitude_first() {
        let link = StaticMapLink::new(Some("MAPKEY".into()));
        let url = link
            .url(Coordinates { latitude: 51.5, longitude: -0.12 })
            .unwrap();

        assert_eq!(
            url,
            "https://atlas.microsoft.com/map/static/png?subscription-key=MAPKEY&api-version=1.0\
             &center=-0.12,51.5&zoom=8&layer=basic&height=500&width=800"
        );
    }

    #[test]
    fn whole_degree_coordinates_keep_decimal_point() {
        let url = StaticMapLink::new(Some("K".into()))
            .url(Coordinates { latitude: 52.0, longitude: -1.0 })
            .unwrap();
        assert!(url.contains("&center=-1.0,52.0&"));
    }

    #[test]
    fn missing_key_is_error() {
        let err = StaticMapLink::new(None)
            .url(Coordinates { latitude: 0.0, longitude: 0.0 })
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingCredential(Service::AzureMaps)));
    }
}
