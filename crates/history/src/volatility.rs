//! Dispersion of recorded rates

use crate::HistoryEntry;

/// Coefficient of variation (population std-dev over mean) of the positive
/// rates in `entries`. `0.0` when no usable rate exists.
pub fn volatility(entries: &[HistoryEntry]) -> f64 {
    coefficient_of_variation(entries.iter().map(|e| e.best_rate))
}

pub fn coefficient_of_variation(rates: impl IntoIterator<Item = f64>) -> f64 {
    let rates: Vec<f64> = rates.into_iter().filter(|r| *r > 0.0).collect();
    if rates.is_empty() {
        return 0.0;
    }

    let n = rates.len() as f64;
    let mean = rates.iter().sum::<f64>() / n;
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() / mean
}
