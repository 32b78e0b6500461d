// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types we
// can swap implementations without changing the code that uses
// them. The model itself needs no trait of ours for save/load
// or train/eval mode — Burn's Module and AutodiffModule derive
// supply that capability set; these traits cover the seams this
// codebase owns.

use anyhow::Result;
use crate::domain::series::Series;

// ─── SeriesSource ─────────────────────────────────────────────────────────────
/// Any component that can load time series from a source.
///
/// Implementations:
///   - CsvLoader → loads from a directory of .csv files
///   - (future) ParquetLoader → loads from columnar files
pub trait SeriesSource {
    /// Load all available series from this source.
    fn load_all(&self) -> Result<Vec<Series>>;
}

// ─── Forecaster ───────────────────────────────────────────────────────────────
/// Any component that can turn one observation window into a prediction.
///
/// Implementations:
///   - Predictor → runs the trained recurrent model
pub trait Forecaster {
    /// Predict the target vector for a single window of normalised rows,
    /// optionally fused with a non-sequential feature vector.
    fn forecast(&self, window: &[Vec<f32>], non_seq: Option<&[f32]>) -> Result<Vec<f32>>;
}
