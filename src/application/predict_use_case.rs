// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Loads a trained checkpoint and predicts the next target value
// from the tail of a .csv file:
//   1. Reload config, scaler and model weights
//   2. Normalise the new series with the SAME fitted scaler
//   3. Take the most recent seq_len rows as the input window
//   4. Forecast, then map the value back to the original scale

use anyhow::{bail, Result};

use crate::data::loader::CsvLoader;
use crate::data::preprocessor::Scaler;
use crate::domain::traits::Forecaster;
use crate::infra::{checkpoint::CheckpointManager, scaler_store::ScalerStore};
use crate::application::train_use_case::TrainConfig;
use crate::ml::predictor::Predictor;

/// A single de-normalised forecast.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The column that was predicted
    pub target:  String,
    /// How many rows past the end of the file the value refers to
    pub horizon: usize,
    /// Predicted value on the original scale of the target column
    pub value:   f64,
}

pub struct PredictUseCase {
    config:    TrainConfig,
    scaler:    Scaler,
    predictor: Predictor,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let ckpt_manager = CheckpointManager::new(&checkpoint_dir);
        let config       = ckpt_manager.load_config()?;
        let scaler       = ScalerStore::new(&checkpoint_dir).load()?;
        let predictor    = Predictor::from_checkpoint(&ckpt_manager)?;
        Ok(Self { config, scaler, predictor })
    }

    /// Predict the target value `horizon` rows past the end of `data_path`.
    pub fn predict(&self, data_path: &str) -> Result<Prediction> {
        let cfg = &self.config;

        let series = CsvLoader::load_file(data_path)?;
        let normed = self.scaler.transform(&series)?;

        if normed.len() < cfg.seq_len {
            bail!(
                "'{}' has {} rows but the model was trained on windows of {}",
                data_path, normed.len(), cfg.seq_len
            );
        }

        // ── Most recent window of feature rows ────────────────────────────────
        let features = normed.select(&cfg.feature_cols)?;
        let start = normed.len() - cfg.seq_len;
        let window: Vec<Vec<f32>> = features[start..]
            .iter()
            .map(|row| row.iter().map(|&v| v as f32).collect())
            .collect();

        // ── Static vector from the last row, when configured ──────────────────
        let non_seq: Option<Vec<f32>> = if cfg.static_cols.is_empty() {
            None
        } else {
            let statics = normed.select(&cfg.static_cols)?;
            Some(statics[normed.len() - 1].iter().map(|&v| v as f32).collect())
        };

        let raw = self.predictor.forecast(&window, non_seq.as_deref())?;
        let normalised = match raw.first() {
            Some(&v) => v,
            None => bail!("model returned an empty prediction"),
        };

        let value = self.scaler.inverse_value(&cfg.target_col, normalised as f64)?;
        tracing::debug!(
            "Forecast for '{}': normalised={:.6} value={:.6}",
            cfg.target_col, normalised, value
        );

        Ok(Prediction {
            target:  cfg.target_col.clone(),
            horizon: cfg.horizon,
            value,
        })
    }
}
