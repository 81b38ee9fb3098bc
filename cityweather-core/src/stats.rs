//! Descriptive statistics over a flattened forecast.

use crate::model::ForecastEntry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl ForecastStats {
    /// Mean, max and min temperature. `None` when there are no entries.
    pub fn compute(entries: &[ForecastEntry]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let (sum, max, min) = entries.iter().map(|e| e.temperature).fold(
            (0.0, f64::NEG_INFINITY, f64::INFINITY),
            |(sum, max, min), t| (sum + t, max.max(t), min.min(t)),
        );

        Some(Self {
            mean: sum / entries.len() as f64,
            max,
            min,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(temperature: f64) -> ForecastEntry {
        ForecastEntry {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
            temperature,
            humidity: 50,
            description: "clear sky".to_string(),
        }
    }

    #[test]
    fn empty_forecast_has_no_stats() {
        assert_eq!(ForecastStats::compute(&[]), None);
    }

    #[test]
    fn mean_max_min_over_temperatures() {
        let entries: Vec<_> = [10.0, 14.0, 9.0, 15.0].into_iter().map(entry).collect();
        let stats = ForecastStats::compute(&entries).expect("stats");

        assert!((stats.mean - 12.0).abs() < 1e-9);
        assert_eq!(stats.max, 15.0);
        assert_eq!(stats.min, 9.0);
    }

    #[test]
    fn single_entry_is_its_own_mean_max_min() {
        let stats = ForecastStats::compute(&[entry(-3.5)]).expect("stats");
        assert_eq!(stats, ForecastStats { mean: -3.5, max: -3.5, min: -3.5 });
    }
}
