// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SeqSample>
// into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N SeqSamples, each a window of S rows with
//           F features (plus optional statics and a target)
//   Output: SeqBatch with an input tensor of shape [N, S, F]
//
//   We flatten every window into one long Vec, then reshape:
//   [s1_r1f1, ..., s1_rSfF, s2_r1f1, ..., sN_rSfF] → [N, S, F]
//
// All samples in a batch come from the same Windower run, so
// window length, feature width and statics presence are uniform
// by construction — the batcher relies on that invariant.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SeqSample;

// ─── SeqBatch ─────────────────────────────────────────────────────────────────
/// A batch of windowed samples ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct SeqBatch<B: Backend> {
    /// Input windows — shape: [batch_size, seq_len, input_dim]
    pub inputs:  Tensor<B, 3>,

    /// Static feature vectors — shape: [batch_size, non_seq_dim],
    /// None when the pipeline was configured without static columns
    pub non_seq: Option<Tensor<B, 2>>,

    /// Regression targets — shape: [batch_size, output_dim]
    pub targets: Tensor<B, 2>,
}

// ─── SeqBatcher ───────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct SeqBatcher<B: Backend> {
    /// The device to create tensors on (e.g. GPU index 0)
    pub device: B::Device,
}

impl<B: Backend> SeqBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SeqSample, SeqBatch<B>> for SeqBatcher<B> {
    fn batch(&self, items: Vec<SeqSample>) -> SeqBatch<B> {
        let batch_size = items.len();
        let seq_len    = items[0].seq_len();
        let input_dim  = items[0].input_dim();

        // ── Flatten windows ───────────────────────────────────────────────────
        let input_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.window.iter().flatten().copied())
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(input_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len, input_dim]);

        // ── Flatten static features, when present ─────────────────────────────
        let non_seq = items[0].non_seq.as_ref().map(|first| {
            let non_seq_dim = first.len();
            let flat: Vec<f32> = items
                .iter()
                .flat_map(|s| s.non_seq.as_deref().unwrap_or(&[]).iter().copied())
                .collect();
            Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
                .reshape([batch_size, non_seq_dim])
        });

        // ── Flatten targets ───────────────────────────────────────────────────
        let output_dim = items[0].target.len();
        let target_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.target.iter().copied())
            .collect();

        let targets = Tensor::<B, 1>::from_floats(target_flat.as_slice(), &self.device)
            .reshape([batch_size, output_dim]);

        SeqBatch { inputs, non_seq, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn sample(offset: f32, with_static: bool) -> SeqSample {
        SeqSample {
            window:  vec![vec![offset, offset + 1.0], vec![offset + 2.0, offset + 3.0]],
            non_seq: with_static.then(|| vec![offset * 10.0]),
            target:  vec![offset + 4.0],
        }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = SeqBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![sample(0.0, true), sample(1.0, true), sample(2.0, true)]);

        assert_eq!(batch.inputs.dims(), [3, 2, 2]);
        assert_eq!(batch.non_seq.unwrap().dims(), [3, 1]);
        assert_eq!(batch.targets.dims(), [3, 1]);
    }

    #[test]
    fn test_batch_without_statics() {
        let batcher = SeqBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![sample(0.0, false), sample(1.0, false)]);

        assert!(batch.non_seq.is_none());
        assert_eq!(batch.inputs.dims(), [2, 2, 2]);
    }

    #[test]
    fn test_values_keep_row_major_order() {
        let batcher = SeqBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![sample(0.0, false), sample(10.0, false)]);

        let values = batch.inputs.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0]);
    }
}
