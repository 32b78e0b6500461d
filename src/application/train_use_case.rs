// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load .csv series          (Layer 4 - data)
//   Step 2: Check column layouts      (Layer 2)
//   Step 3: Fit the scaler            (Layer 4 - data)
//   Step 4: Normalise + window        (Layer 4 - data)
//   Step 5: Split train/validation    (Layer 4 - data)
//   Step 6: Build datasets            (Layer 4 - data)
//   Step 7: Save config + scaler      (Layer 6 - infra)
//   Step 8: Run training loop         (Layer 5 - ml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::SeqDataset,
    loader::CsvLoader,
    preprocessor::Scaler,
    splitter::split_train_val,
    windowing::Windower,
};
use crate::domain::series::Series;
use crate::domain::traits::SeriesSource;
use crate::infra::{checkpoint::CheckpointManager, scaler_store::ScalerStore};
use crate::ml::model::{LstmNetConfig, OutputActivation};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so it can be
// saved next to the checkpoint and reloaded for prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    /// Columns fed into the recurrent encoder, per timestep
    pub feature_cols:   Vec<String>,
    /// Column whose future value is predicted
    pub target_col:     String,
    /// Columns fused as a non-sequential vector after the encoder
    /// (empty disables fusion)
    pub static_cols:    Vec<String>,
    pub seq_len:        usize,
    pub horizon:        usize,
    pub train_fraction: f64,
    pub shuffle_split:  bool,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub hidden_dim:     usize,
    pub n_layers:       usize,
    pub fc:             Vec<usize>,
    pub dropout:        f64,
    pub out_actv:       Option<OutputActivation>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/series".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            feature_cols:   vec!["close".to_string()],
            target_col:     "close".to_string(),
            static_cols:    Vec::new(),
            seq_len:        16,
            horizon:        1,
            train_fraction: 0.8,
            shuffle_split:  false,
            batch_size:     32,
            epochs:         10,
            lr:             1e-3,
            hidden_dim:     128,
            n_layers:       1,
            fc:             vec![128],
            dropout:        0.5,
            out_actv:       None,
        }
    }
}

impl TrainConfig {
    /// Derive the model architecture from the training configuration.
    /// Both the trainer and the predictor build the model through this
    /// one method so the two can never drift apart.
    pub fn model_config(&self) -> LstmNetConfig {
        LstmNetConfig::new(
            self.feature_cols.len(),
            1,
            self.hidden_dim,
            self.n_layers,
            self.fc.clone(),
        )
        .with_non_seq_dim(
            (!self.static_cols.is_empty()).then_some(self.static_cols.len()),
        )
        .with_dropout(self.dropout)
        .with_out_actv(self.out_actv)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load all .csv series ─────────────────────────────────────
        tracing::info!("Loading .csv files from '{}'", cfg.data_dir);
        let loader     = CsvLoader::new(&cfg.data_dir);
        let all_series = loader.load_all()?;
        if all_series.is_empty() {
            bail!("No usable .csv series found in '{}'", cfg.data_dir);
        }

        // ── Step 2: Keep series matching the first file's column layout ──────
        // One scaler serves the whole corpus, so every file must agree on
        // its columns; odd files are skipped, not fatal.
        let columns = all_series[0].columns.clone();
        let series_list: Vec<Series> = all_series
            .into_iter()
            .filter(|s| {
                if s.columns == columns {
                    true
                } else {
                    tracing::warn!(
                        "Skipping '{}': columns differ from '{}'",
                        s.source, columns.join(", ")
                    );
                    false
                }
            })
            .collect();

        // ── Step 3: Fit the scaler on the pooled rows ─────────────────────────
        let pooled_rows: Vec<Vec<f64>> = series_list
            .iter()
            .flat_map(|s| s.rows.iter().cloned())
            .collect();
        let pooled = Series::new("corpus", columns, pooled_rows);
        let scaler = Scaler::fit(&pooled)?;

        // ── Step 4: Normalise and window every series ─────────────────────────
        let windower = Windower::new(cfg.seq_len, cfg.horizon);
        let mut samples = Vec::new();
        for series in &series_list {
            let normed = scaler.transform(series)?;
            samples.extend(windower.windows(
                &normed,
                &cfg.feature_cols,
                &cfg.target_col,
                &cfg.static_cols,
            )?);
        }
        tracing::info!("Built {} training samples", samples.len());
        if samples.is_empty() {
            bail!(
                "No series is long enough for seq_len={} plus horizon={}",
                cfg.seq_len, cfg.horizon
            );
        }

        // ── Step 5: Train / validation split ──────────────────────────────────
        // Chronological by default: overlapping windows leak across a
        // random split, and the tail is what live prediction looks like.
        let (train_samples, val_samples) =
            split_train_val(samples, cfg.train_fraction, cfg.shuffle_split);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 6: Build Burn datasets ───────────────────────────────────────
        let train_dataset = SeqDataset::new(train_samples);
        let val_dataset   = SeqDataset::new(val_samples);

        // ── Step 7: Save config and scaler for prediction ─────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        ScalerStore::new(&cfg.checkpoint_dir).save(&scaler)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}
