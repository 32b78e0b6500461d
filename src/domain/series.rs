// ============================================================
// Layer 3 — Series Domain Type
// ============================================================
// Represents a numeric time series loaded from disk: an ordered
// set of rows over named columns. By the time a Series exists,
// all parsing (CSV quoting, headers, number formats) is done —
// this type only knows about ordered numbers.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A numeric time series with named columns.
/// Rows are ordered oldest to newest; every row has one value
/// per column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// The filename or path — kept for traceability
    pub source:  String,

    /// Column names, in file order
    pub columns: Vec<String>,

    /// One Vec<f64> per row, aligned with `columns`
    pub rows:    Vec<Vec<f64>>,
}

impl Series {
    pub fn new(source: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { source: source.into(), columns, rows }
    }

    /// Number of rows (timesteps) in the series
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column, or an error naming the available columns
    /// so a typo in a CLI flag is diagnosable from the message alone.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => Ok(idx),
            None => bail!(
                "column '{}' not found in '{}' (available: {})",
                name,
                self.source,
                self.columns.join(", ")
            ),
        }
    }

    /// Project the series onto the named columns, row by row.
    /// The output preserves row order and the requested column order.
    pub fn select(&self, names: &[String]) -> Result<Vec<Vec<f64>>> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<_>>()?;

        Ok(self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Series {
        Series::new(
            "test.csv",
            vec!["open".into(), "close".into(), "volume".into()],
            vec![
                vec![1.0, 2.0, 100.0],
                vec![2.0, 3.0, 200.0],
            ],
        )
    }

    #[test]
    fn test_select_preserves_requested_order() {
        let s = sample();
        let projected = s.select(&["volume".into(), "open".into()]).unwrap();
        assert_eq!(projected, vec![vec![100.0, 1.0], vec![200.0, 2.0]]);
    }

    #[test]
    fn test_unknown_column_names_available_ones() {
        let s = sample();
        let err = s.select(&["clse".into()]).unwrap_err();
        assert!(err.to_string().contains("open, close, volume"));
    }
}
