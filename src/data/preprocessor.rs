// ============================================================
// Layer 4 — Series Preprocessor
// ============================================================
// Normalises raw column values before windowing.
//
// Why normalise?
//   Prices, volumes and indicator values live on wildly different
//   scales. Feeding raw magnitudes into the recurrent encoder
//   saturates the gate activations and makes the loss landscape
//   badly conditioned. Z-scoring every column (subtract mean,
//   divide by standard deviation) puts all features on a
//   comparable scale.
//
// The fitted statistics are part of the trained artifact: the
// same Scaler must be applied at prediction time, and predictions
// must be mapped back through the inverse transform. The struct
// is serde-serialisable so ScalerStore can persist it as JSON.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::domain::series::Series;

/// Guard against division by ~zero for constant columns.
const MIN_STD: f64 = 1e-12;

/// Per-column z-score normalisation fitted on a training series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    /// Column names the statistics were fitted on, in order
    pub columns: Vec<String>,
    /// Mean of each column
    pub means:   Vec<f64>,
    /// Standard deviation of each column (1.0 for constant columns)
    pub stds:    Vec<f64>,
}

impl Scaler {
    /// Fit per-column statistics on a series.
    pub fn fit(series: &Series) -> Result<Self> {
        if series.is_empty() {
            bail!("cannot fit a scaler on empty series '{}'", series.source);
        }

        let n = series.len() as f64;
        let width = series.columns.len();

        let mut means = vec![0.0; width];
        for row in &series.rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; width];
        for row in &series.rows {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m) * (v - m);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
            // Constant columns pass through unscaled instead of exploding
            if *s < MIN_STD {
                *s = 1.0;
            }
        }

        Ok(Self { columns: series.columns.clone(), means, stds })
    }

    /// Apply the fitted transform to a series with the same columns.
    pub fn transform(&self, series: &Series) -> Result<Series> {
        if series.columns != self.columns {
            bail!(
                "series '{}' columns ({}) do not match the fitted scaler ({})",
                series.source,
                series.columns.join(", "),
                self.columns.join(", ")
            );
        }

        let rows = series
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.means)
                    .zip(&self.stds)
                    .map(|((v, m), s)| (v - m) / s)
                    .collect()
            })
            .collect();

        Ok(Series::new(series.source.clone(), series.columns.clone(), rows))
    }

    /// Map a single normalised value back to the original scale
    /// of the named column.
    pub fn inverse_value(&self, column: &str, value: f64) -> Result<f64> {
        match self.columns.iter().position(|c| c == column) {
            Some(i) => Ok(value * self.stds[i] + self.means[i]),
            None => bail!("column '{}' was not fitted by this scaler", column),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Series {
        Series::new(
            "test.csv",
            vec!["a".into(), "b".into()],
            vec![
                vec![1.0, 10.0],
                vec![2.0, 10.0],
                vec![3.0, 10.0],
            ],
        )
    }

    #[test]
    fn test_transformed_columns_are_centered() {
        let series = sample();
        let scaler = Scaler::fit(&series).unwrap();
        let normed = scaler.transform(&series).unwrap();

        for col in 0..2 {
            let sum: f64 = normed.rows.iter().map(|r| r[col]).sum();
            assert!(sum.abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_column_passes_through_centered() {
        let series = sample();
        let scaler = Scaler::fit(&series).unwrap();
        // Column b is constant: std is clamped to 1, values become 0
        assert_eq!(scaler.stds[1], 1.0);
        let normed = scaler.transform(&series).unwrap();
        assert!(normed.rows.iter().all(|r| r[1] == 0.0));
    }

    #[test]
    fn test_inverse_round_trips() {
        let series = sample();
        let scaler = Scaler::fit(&series).unwrap();
        let normed = scaler.transform(&series).unwrap();

        let restored = scaler.inverse_value("a", normed.rows[2][0]).unwrap();
        assert!((restored - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        let scaler = Scaler::fit(&sample()).unwrap();
        let other = Series::new("other.csv", vec!["x".into()], vec![vec![1.0]]);
        assert!(scaler.transform(&other).is_err());
        assert!(scaler.inverse_value("x", 0.0).is_err());
    }

    #[test]
    fn test_empty_series_rejected() {
        let empty = Series::new("empty.csv", vec!["a".into()], vec![]);
        assert!(Scaler::fit(&empty).is_err());
    }
}
