use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fmt, fs, path::{Path, PathBuf}};

use crate::error::{PipelineError, Result};

pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";

/// A single secret or endpoint the pipeline needs from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    OpenWeather,
    TextAnalyticsKey,
    TextAnalyticsEndpoint,
    AzureMaps,
    BlobStorage,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::OpenWeather => "openweather",
            Service::TextAnalyticsKey => "text-analytics-key",
            Service::TextAnalyticsEndpoint => "text-analytics-endpoint",
            Service::AzureMaps => "maps",
            Service::BlobStorage => "blob",
        }
    }

    /// Environment variable that overrides the file-stored value.
    pub fn env_var(&self) -> &'static str {
        match self {
            Service::OpenWeather => "OPENWEATHERMAP_API_KEY",
            Service::TextAnalyticsKey => "TEXT_ANALYTICS_KEY",
            Service::TextAnalyticsEndpoint => "TEXT_ANALYTICS_ENDPOINT",
            Service::AzureMaps => "AZURE_MAPS_SUBSCRIPTION_KEY",
            Service::BlobStorage => "AZURE_BLOB_CONNECTION_STRING",
        }
    }

    /// Whether the value is a secret that must be masked in logs and prompts.
    pub fn is_secret(&self) -> bool {
        !matches!(self, Service::TextAnalyticsEndpoint)
    }

    pub const fn all() -> &'static [Service] {
        &[
            Service::OpenWeather,
            Service::TextAnalyticsKey,
            Service::TextAnalyticsEndpoint,
            Service::AzureMaps,
            Service::BlobStorage,
        ]
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Service {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        Service::all()
            .iter()
            .copied()
            .find(|s| s.as_str() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = Service::all().iter().map(Service::as_str).collect();
                anyhow::anyhow!(
                    "Unknown service '{value}'. Supported services: {}.",
                    known.join(", ")
                )
            })
    }
}

/// Stored value for a single service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub key: String,
}

/// Base URL overrides, mostly useful for testing against local mocks.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweather: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding: Option<String>,
}

/// Top-level configuration, loaded once per run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [services.openweather]
    /// key = "..."
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Load the config file (if any), then `.env`, then the process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut cfg = Self::load_from(&Self::config_file_path()?)?;
        cfg.apply_env(|name| env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source: std::io::Error| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).map_err(io_err)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather-cli")
            .ok_or(PipelineError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from an environment-like lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for service in Service::all() {
            if let Some(value) = lookup(service.env_var()).filter(|v| !v.trim().is_empty()) {
                self.upsert_credential(*service, value);
            }
        }
    }

    pub fn upsert_credential(&mut self, service: Service, key: String) {
        self.services.insert(service.as_str().to_string(), ServiceConfig { key });
    }

    pub fn credential(&self, service: Service) -> Option<&str> {
        self.services.get(service.as_str()).map(|cfg| cfg.key.as_str())
    }

    pub fn openweather_url(&self) -> &str {
        self.endpoints.openweather.as_deref().unwrap_or(DEFAULT_OPENWEATHER_URL)
    }

    pub fn geocoding_url(&self) -> &str {
        self.endpoints.geocoding.as_deref().unwrap_or(DEFAULT_GEOCODING_URL)
    }

    /// Log which services are configured, masking secrets.
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        for service in Service::all() {
            let shown = match self.credential(*service) {
                None => "<unset>".to_string(),
                Some(v) if service.is_secret() => mask(v),
                Some(v) => v.to_string(),
            };
            tracing::info!("  {:<30}: {}", service.env_var(), shown);
        }
        tracing::info!("  {:<30}: {}", "openweather endpoint", self.openweather_url());
        tracing::info!("  {:<30}: {}", "geocoding endpoint", self.geocoding_url());
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
