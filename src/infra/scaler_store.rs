// ============================================================
// Layer 6 — Scaler Store
// ============================================================
// Persists the fitted normalisation statistics next to the model
// checkpoint. The scaler is as much a part of the trained
// artifact as the weights: predicting with a differently-scaled
// input silently produces garbage, so training saves the fitted
// scaler and prediction refuses to run without it.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::preprocessor::Scaler;

pub struct ScalerStore {
    dir: PathBuf,
}

impl ScalerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Save the fitted scaler as scaler.json.
    pub fn save(&self, scaler: &Scaler) -> Result<()> {
        fs::create_dir_all(&self.dir).ok();
        let path = self.dir.join("scaler.json");

        let json = serde_json::to_string_pretty(scaler)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write scaler to '{}'", path.display()))?;

        tracing::debug!("Saved scaler to '{}'", path.display());
        Ok(())
    }

    /// Load a previously saved scaler.
    pub fn load(&self) -> Result<Scaler> {
        let path = self.dir.join("scaler.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read scaler from '{}'. \
                     Make sure you have run 'train' before 'predict'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}
