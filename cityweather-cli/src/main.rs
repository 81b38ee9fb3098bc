//! Binary crate for the `cityweather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and prompting for the city
//! - Interactive credential configuration
//! - Logging setup
//! - Rendering the forecast chart

use std::{env, io::IsTerminal};

use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

mod chart;
mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// the weather report.
///
/// - `RUST_LOG` wins when set; otherwise `CITYWEATHER_LOG_LEVEL`
///   (trace|debug|info|warn|error, default `warn`)
/// - `FORCE_COLOR=1|true|yes` / `0|false|no` overrides TTY detection
fn init_tracing() {
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("CITYWEATHER_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
