// ============================================================
// Layer 4 — Series Loader
// ============================================================
// Loads .csv files from a directory using the csv crate.
//
// Real-world market and sensor exports mix numeric columns with
// dates, symbols and other text. The loader keeps only the
// columns whose first data row parses as a number, so a leading
// timestamp column never poisons the whole file. Rows that fail
// to parse in a kept column are skipped with a warning rather
// than aborting the load.

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

use crate::domain::series::Series;
use crate::domain::traits::SeriesSource;

/// Loads all .csv files from a given directory.
/// Implements the SeriesSource trait from Layer 3.
pub struct CsvLoader {
    /// Path to the directory containing .csv files
    dir: String,
}

impl CsvLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load a single .csv file as a Series.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Series> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        parse_csv(&bytes[..], source)
    }
}

impl SeriesSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<Series>> {
        let dir = Path::new(&self.dir);

        // A missing directory returns empty rather than crashing, so the
        // system can still run in demo mode without data.
        if !dir.exists() {
            tracing::warn!(
                "Data directory '{}' does not exist — returning empty corpus",
                self.dir
            );
            return Ok(Vec::new());
        }

        let mut series = Vec::new();

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir))?
        {
            let entry = entry?;
            let path  = entry.path();

            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                match Self::load_file(&path) {
                    Ok(s) => {
                        tracing::debug!(
                            "Loaded: {} ({} rows, {} columns)",
                            s.source, s.len(), s.columns.len()
                        );
                        series.push(s);
                    }
                    // Log a warning but continue — don't fail on one bad file
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("Successfully loaded {} series", series.len());
        Ok(series)
    }
}

/// Parse CSV bytes into a Series, keeping only numeric columns.
///
/// Column selection is decided by the first data record: every field that
/// parses as f64 defines a kept column. Later rows with a parse failure in
/// a kept column are skipped with a warning.
fn parse_csv<R: std::io::Read>(reader: R, source: String) -> Result<Series> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("Cannot read CSV header of '{source}'"))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = rdr.records();

    // First data record decides which columns are numeric.
    let first = match records.next() {
        Some(rec) => rec.with_context(|| format!("Cannot read first row of '{source}'"))?,
        None => bail!("'{source}' contains a header but no data rows"),
    };

    let kept: Vec<usize> = first
        .iter()
        .enumerate()
        .filter(|(_, field)| field.parse::<f64>().is_ok())
        .map(|(i, _)| i)
        .collect();

    if kept.is_empty() {
        bail!("'{source}' has no numeric columns");
    }
    if kept.len() < headers.len() {
        let dropped: Vec<&str> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !kept.contains(i))
            .map(|(_, h)| h.as_str())
            .collect();
        tracing::debug!("'{}': dropping non-numeric columns: {}", source, dropped.join(", "));
    }

    let columns: Vec<String> = kept.iter().map(|&i| headers[i].clone()).collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in std::iter::once(Ok(first)).chain(records).enumerate() {
        let record = record?;
        match kept
            .iter()
            .map(|&i| record.get(i).unwrap_or("").parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
        {
            Ok(row) => rows.push(row),
            Err(_) => {
                skipped += 1;
                tracing::warn!("'{}': skipping unparsable row {}", source, line + 2);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("'{}': skipped {} unparsable rows", source, skipped);
    }

    Ok(Series::new(source, columns, rows))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_numeric_columns_and_drops_text() {
        let csv = "date,close,volume\n2024-01-01,10.5,100\n2024-01-02,11.0,200\n";
        let series = parse_csv(csv.as_bytes(), "test.csv".into()).unwrap();

        assert_eq!(series.columns, vec!["close", "volume"]);
        assert_eq!(series.rows, vec![vec![10.5, 100.0], vec![11.0, 200.0]]);
    }

    #[test]
    fn test_skips_rows_that_fail_to_parse() {
        let csv = "close\n1.0\nn/a\n3.0\n";
        let series = parse_csv(csv.as_bytes(), "test.csv".into()).unwrap();
        assert_eq!(series.rows, vec![vec![1.0], vec![3.0]]);
    }

    #[test]
    fn test_rejects_file_without_numeric_columns() {
        let csv = "date,symbol\n2024-01-01,ABC\n";
        assert!(parse_csv(csv.as_bytes(), "test.csv".into()).is_err());
    }

    #[test]
    fn test_rejects_empty_file() {
        let csv = "close,volume\n";
        assert!(parse_csv(csv.as_bytes(), "test.csv".into()).is_err());
    }
}
