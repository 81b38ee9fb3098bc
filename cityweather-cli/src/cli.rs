use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{ChartRenderer, Config, NoChart, Pipeline, Service};
use inquire::{CustomUserError, Password, PasswordDisplayMode, Text, validator::Validation};

use crate::chart::PlotlarsChart;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "cityweather",
    version,
    about = "Current weather, sentiment, map link and forecast statistics for a city"
)]
pub struct Cli {
    /// Defaults to `run` with an interactive city prompt.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a credential in the config file.
    Configure {
        /// Service short name, e.g. "openweather", "maps" or "blob".
        service: String,
    },

    /// Run the full weather pipeline for a city.
    Run {
        /// City name; prompted for when absent.
        city: Option<String>,

        /// Skip opening the forecast chart.
        #[arg(long)]
        no_chart: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Run {
            city: None,
            no_chart: false,
        });

        match command {
            Command::Configure { service } => configure(&service),
            Command::Run { city, no_chart } => run_pipeline(city, no_chart).await,
        }
    }
}

fn configure(service: &str) -> anyhow::Result<()> {
    let service = Service::try_from(service)?;

    // Only the file is edited; environment values are not persisted.
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let message = format!("{service} ({}):", service.env_var());
    let value = if service.is_secret() {
        Password::new(&message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?
    } else {
        Text::new(&message).prompt()?
    };

    let value = value.trim();
    if value.is_empty() {
        bail!("No value entered for '{service}'; config unchanged.");
    }

    cfg.upsert_credential(service, value.to_string());
    cfg.save_to(&path)?;

    println!("Saved {service} to {}", path.display());
    Ok(())
}

fn prompt_city() -> anyhow::Result<String> {
    let city = Text::new("Enter the city name:")
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            if input.trim().is_empty() {
                Ok(Validation::Invalid("City name must not be empty".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()?;

    Ok(city.trim().to_string())
}

async fn run_pipeline(city: Option<String>, no_chart: bool) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.log_config();

    let city = match city.map(|c| c.trim().to_string()) {
        Some(c) if !c.is_empty() => c,
        _ => prompt_city()?,
    };

    let chart: Box<dyn ChartRenderer> = if no_chart {
        Box::new(NoChart)
    } else {
        Box::new(PlotlarsChart)
    };

    let pipeline = Pipeline::from_config(&config, chart);

    let mut stdout = std::io::stdout().lock();
    let outcome = pipeline
        .run(&city, &mut stdout)
        .await
        .with_context(|| format!("Weather pipeline failed for '{city}'"))?;

    tracing::info!(?outcome, "run finished");
    Ok(())
}
