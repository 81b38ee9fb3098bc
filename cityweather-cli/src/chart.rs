//! Forecast chart rendered with plotlars and opened in the system viewer.

use cityweather_core::{ChartRenderer, ForecastEntry, PipelineError};
use plotlars::{Plot, Text, TimeSeriesPlot};
use polars::prelude::*;

const CHART_TITLE: &str = "Historical Temperature";

#[derive(Debug, Default, Clone, Copy)]
pub struct PlotlarsChart;

/// One row per forecast slot, dates as ISO strings for the x axis.
fn forecast_frame(entries: &[ForecastEntry]) -> PolarsResult<DataFrame> {
    let dates: Vec<String> = entries
        .iter()
        .map(|e| e.date.format("%Y-%m-%d").to_string())
        .collect();
    let temperatures: Vec<f64> = entries.iter().map(|e| e.temperature).collect();

    df!(
        "date" => dates,
        "temperature" => temperatures,
    )
}

impl ChartRenderer for PlotlarsChart {
    fn render(&self, city: &str, entries: &[ForecastEntry]) -> Result<(), PipelineError> {
        let data = forecast_frame(entries).map_err(|e| PipelineError::Chart(e.to_string()))?;

        tracing::info!(city, points = entries.len(), "opening forecast chart");

        TimeSeriesPlot::builder()
            .data(&data)
            .x("date")
            .y("temperature")
            .plot_title(Text::from(CHART_TITLE))
            .x_title("Date")
            .y_title("Temperature (°C)")
            .build()
            .plot();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn title_is_fixed_for_every_city() {
        assert_eq!(CHART_TITLE, "Historical Temperature");
    }

    #[test]
    fn frame_keeps_entry_order() {
        let entries = vec![
            ForecastEntry {
                date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                temperature: 9.5,
                humidity: 80,
                description: "light rain".into(),
            },
            ForecastEntry {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                temperature: 12.0,
                humidity: 60,
                description: "few clouds".into(),
            },
        ];

        let df = forecast_frame(&entries).unwrap();
        assert_eq!(df.height(), 2);

        let dates = df.column("date").unwrap().as_materialized_series();
        let dates: Vec<Option<&str>> = dates.str().unwrap().into_iter().collect();
        assert_eq!(dates, vec![Some("2024-05-02"), Some("2024-05-01")]);

        let temps = df.column("temperature").unwrap().as_materialized_series();
        let temps: Vec<Option<f64>> = temps.f64().unwrap().into_iter().collect();
        assert_eq!(temps, vec![Some(9.5), Some(12.0)]);
    }
}
