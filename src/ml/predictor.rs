// ============================================================
// Layer 5 — Predictor
// ============================================================
use anyhow::{bail, Result};
use burn::prelude::*;

use crate::domain::traits::Forecaster;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::LstmNet;

type InferBackend = burn::backend::Wgpu;

pub struct Predictor {
    model:  LstmNet<InferBackend>,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Predictor {
    /// Rebuild the trained architecture from the saved config and pour
    /// the latest checkpoint's weights into it. The inference backend
    /// has no autodiff, so dropout never fires here.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt_manager.load_config()?;

        let model_cfg = cfg.model_config().with_dropout(0.0);
        let model: LstmNet<InferBackend> = model_cfg.init(&device)?;
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self { model, device })
    }
}

impl Forecaster for Predictor {
    /// window: seq_len normalised feature rows; non_seq: optional static
    /// vector. Returns the raw (still normalised) prediction values.
    fn forecast(&self, window: &[Vec<f32>], non_seq: Option<&[f32]>) -> Result<Vec<f32>> {
        if window.is_empty() {
            bail!("cannot forecast from an empty window");
        }
        let seq_len   = window.len();
        let input_dim = window[0].len();

        let flat: Vec<f32> = window.iter().flatten().copied().collect();
        let inputs = Tensor::<InferBackend, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([1, seq_len, input_dim]);

        let non_seq = non_seq.map(|values| {
            Tensor::<InferBackend, 1>::from_floats(values, &self.device)
                .reshape([1, values.len()])
        });

        let output = self.model.forward(inputs, non_seq);
        output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read prediction tensor: {e:?}"))
    }
}
