use anyhow::{bail, Result};
use burn::{
    module::Ignored,
    nn::{
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
        Relu,
    },
    prelude::*,
    tensor::{activation, backend::AutodiffBackend},
};
use serde::{Deserialize, Serialize};

/// Activation applied to the final linear output, when configured.
/// Serialisable so it round-trips through the saved train config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputActivation {
    Sigmoid,
    Tanh,
}

impl OutputActivation {
    fn apply<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            OutputActivation::Sigmoid => activation::sigmoid(x),
            OutputActivation::Tanh    => activation::tanh(x),
        }
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct LstmNetConfig {
    /// Features per timestep of the input sequence
    pub input_dim:   usize,
    /// Width of the final prediction vector
    pub output_dim:  usize,
    /// Hidden width of every recurrent layer
    pub hidden_dim:  usize,
    /// Number of stacked recurrent layers
    pub n_layers:    usize,
    /// Widths of the intermediate dense layers, applied in order
    pub fc:          Vec<usize>,
    /// Width of the per-example non-sequential feature vector appended
    /// after the recurrent encoder. None disables fusion entirely.
    #[config(default = "None")]
    pub non_seq_dim: Option<usize>,
    /// Dropout probability for the dense head and between recurrent layers
    #[config(default = 0.5)]
    pub dropout:     f64,
    /// Optional activation on the final output. None returns raw logits.
    #[config(default = "None")]
    pub out_actv:    Option<OutputActivation>,
}

/// Dropout between stacked recurrent layers only exists when there is more
/// than one layer; a single-layer stack has no inter-layer connection to drop.
fn effective_recurrent_dropout(n_layers: usize, dropout: f64) -> f64 {
    if n_layers == 1 { 0.0 } else { dropout }
}

impl LstmNetConfig {
    /// Allocate all learnable parameters on `device`.
    ///
    /// Fails with a descriptive configuration error when any declared width
    /// is zero or the dense-width list is malformed; parameter shapes are
    /// chained so the whole pipeline is consistent by construction.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<LstmNet<B>> {
        self.validate()?;

        // Burn's Lstm is a single recurrent layer, so depth is expressed as
        // a stack: first layer consumes the input features, the rest consume
        // the previous layer's hidden output.
        let mut lstm = Vec::with_capacity(self.n_layers);
        lstm.push(LstmConfig::new(self.input_dim, self.hidden_dim, true).init(device));
        for _ in 1..self.n_layers {
            lstm.push(LstmConfig::new(self.hidden_dim, self.hidden_dim, true).init(device));
        }

        // Dense stack: the first layer sees the encoder summary plus the
        // fused non-sequential width (0 if unused); each layer chains on.
        let mut prev_out = self.hidden_dim + self.non_seq_dim.unwrap_or(0);
        let mut fc = Vec::with_capacity(self.fc.len());
        for &neurons in &self.fc {
            fc.push(LinearConfig::new(prev_out, neurons).init(device));
            prev_out = neurons;
        }
        let out = LinearConfig::new(prev_out, self.output_dim).init(device);

        Ok(LstmNet {
            lstm,
            lstm_dropout: DropoutConfig::new(
                effective_recurrent_dropout(self.n_layers, self.dropout),
            ).init(),
            fc,
            out,
            actv:       Relu::new(),
            dropout:    DropoutConfig::new(self.dropout).init(),
            out_actv:   self.out_actv.map(Ignored),
            n_layers:   self.n_layers,
            hidden_dim: self.hidden_dim,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.input_dim == 0 {
            bail!("input_dim must be positive");
        }
        if self.output_dim == 0 {
            bail!("output_dim must be positive");
        }
        if self.hidden_dim == 0 {
            bail!("hidden_dim must be positive");
        }
        if self.n_layers == 0 {
            bail!("n_layers must be positive");
        }
        if self.non_seq_dim == Some(0) {
            bail!("non_seq_dim must be positive when set (use None to disable fusion)");
        }
        if let Some(pos) = self.fc.iter().position(|&n| n == 0) {
            bail!("fc[{pos}] must be positive: every dense layer needs at least one neuron");
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            bail!("dropout must be within [0, 1], got {}", self.dropout);
        }
        Ok(())
    }
}

/// LSTM sequence-to-vector regressor.
///
/// A stack of recurrent layers summarises each input sequence into its final
/// timestep output; an optional non-sequential feature vector is concatenated
/// onto that summary; a dense head reduces it to the output width.
#[derive(Module, Debug)]
pub struct LstmNet<B: Backend> {
    /// Recurrent encoder, one entry per layer
    pub lstm:         Vec<Lstm<B>>,
    /// Dropout applied between recurrent layers (prob 0 for a single layer)
    pub lstm_dropout: Dropout,
    /// Intermediate dense layers, applied in order
    pub fc:           Vec<Linear<B>>,
    /// Final projection to the output width
    pub out:          Linear<B>,
    /// Non-linearity after each intermediate dense layer
    pub actv:         Relu,
    /// Dropout after each intermediate dense layer
    pub dropout:      Dropout,
    /// Optional activation on the final output
    pub out_actv:     Option<Ignored<OutputActivation>>,
    pub n_layers:     usize,
    pub hidden_dim:   usize,
}

impl<B: Backend> LstmNet<B> {
    /// x: [batch, seq_len, input_dim], non_seq: [batch, non_seq_dim]
    /// → [batch, output_dim]
    ///
    /// Stateless across calls: a fresh zero hidden state is created for the
    /// current batch size on every invocation. Numeric precision is fixed by
    /// the backend the model was constructed on. Dropout is active only on
    /// an autodiff backend during training; at inference it is a no-op.
    pub fn forward(&self, x: Tensor<B, 3>, non_seq: Option<Tensor<B, 2>>) -> Tensor<B, 2> {
        let [batch_size, seq_len, _] = x.dims();
        let device = x.device();

        let states = self.init_hidden(batch_size, &device);

        let last = self.lstm.len() - 1;
        let mut seq = x;
        for (i, (lstm, state)) in self.lstm.iter().zip(states).enumerate() {
            let (output, _state) = lstm.forward(seq, Some(state));
            seq = if i < last {
                self.lstm_dropout.forward(output)
            } else {
                output
            };
        }

        // Keep only the final timestep per sequence: the model is
        // sequence-to-vector, earlier timestep outputs are discarded.
        let summary = seq
            .slice([0..batch_size, seq_len - 1..seq_len, 0..self.hidden_dim])
            .squeeze::<2>(1);

        // Append non-sequential data after the recurrent encoder. A batch
        // mismatch here is a caller error and panics inside the tensor ops.
        let mut dense = match non_seq {
            Some(extra) => Tensor::cat(vec![summary, extra], 1),
            None        => summary,
        };

        for layer in &self.fc {
            dense = layer.forward(dense);
            dense = self.actv.forward(dense);
            dense = self.dropout.forward(dense);
        }

        let output = self.out.forward(dense);
        match &self.out_actv {
            Some(actv) => actv.0.apply(output),
            None       => output,
        }
    }

    /// Zero-filled recurrent state for a batch: one (cell, hidden) pair of
    /// shape [batch_size, hidden_dim] per layer. Pure and cheap; every call
    /// returns fresh, independent tensors.
    pub fn init_hidden(&self, batch_size: usize, device: &B::Device) -> Vec<LstmState<B, 2>> {
        (0..self.n_layers)
            .map(|_| {
                LstmState::new(
                    Tensor::zeros([batch_size, self.hidden_dim], device),
                    Tensor::zeros([batch_size, self.hidden_dim], device),
                )
            })
            .collect()
    }

    /// Training-path helper: forward pass plus mean-squared-error loss.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 3>,
        non_seq: Option<Tensor<B, 2>>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let predictions = self.forward(inputs, non_seq);
        let loss = MseLoss::new().forward(predictions.clone(), targets, Reduction::Mean);
        (loss, predictions)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
// All tests run on the CPU NdArray backend. NdArray is not an autodiff
// backend, so dropout is inert and forward passes are deterministic.
#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    /// The reference configuration: fc=[128], 100 features in, 1 value out,
    /// hidden 128, single layer, 5 fused non-sequential features.
    fn reference_config() -> LstmNetConfig {
        LstmNetConfig::new(100, 1, 128, 1, vec![128])
            .with_non_seq_dim(Some(5))
            .with_dropout(0.5)
    }

    #[test]
    fn test_forward_shape_on_zero_input() {
        let config = LstmNetConfig::new(4, 2, 8, 2, vec![16, 8]);
        let model: LstmNet<TestBackend> = config.init(&device()).unwrap();

        let x = Tensor::<TestBackend, 3>::zeros([3, 5, 4], &device());
        let output = model.forward(x, None);

        assert_eq!(output.dims(), [3, 2]);
        let values = output.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_reference_scenario() {
        let model: LstmNet<TestBackend> = reference_config().init(&device()).unwrap();

        let x = Tensor::<TestBackend, 3>::random(
            [32, 16, 100], Distribution::Default, &device(),
        );
        let non_seq = Tensor::<TestBackend, 2>::random(
            [32, 5], Distribution::Default, &device(),
        );

        let output = model.forward(x, Some(non_seq));
        assert_eq!(output.dims(), [32, 1]);
    }

    #[test]
    #[should_panic]
    fn test_omitting_non_seq_input_mismatches_dense_stack() {
        // Constructed for fused width 128 + 5 but called without the
        // non-sequential vector: the first dense layer receives width 128
        // and the underlying tensor ops reject the shape.
        let model: LstmNet<TestBackend> = reference_config().init(&device()).unwrap();
        let x = Tensor::<TestBackend, 3>::zeros([4, 16, 100], &device());
        let _ = model.forward(x, None);
    }

    #[test]
    fn test_init_hidden_is_zeroed_per_layer() {
        let config = LstmNetConfig::new(6, 1, 32, 3, vec![]);
        let model: LstmNet<TestBackend> = config.init(&device()).unwrap();

        let states = model.init_hidden(7, &device());
        assert_eq!(states.len(), 3);
        for state in &states {
            assert_eq!(state.cell.dims(),   [7, 32]);
            assert_eq!(state.hidden.dims(), [7, 32]);
            let cell_sum: f32   = state.cell.clone().sum().into_scalar().elem();
            let hidden_sum: f32 = state.hidden.clone().sum().into_scalar().elem();
            assert_eq!(cell_sum,   0.0);
            assert_eq!(hidden_sum, 0.0);
        }
    }

    #[test]
    fn test_init_hidden_calls_are_independent() {
        let config = LstmNetConfig::new(6, 1, 16, 2, vec![]);
        let model: LstmNet<TestBackend> = config.init(&device()).unwrap();

        let first  = model.init_hidden(4, &device());
        let second = model.init_hidden(4, &device());

        // Deriving a new tensor from one state leaves the other untouched.
        let bumped: f32 = (first[0].hidden.clone() + 1.0).sum().into_scalar().elem();
        assert_eq!(bumped, 4.0 * 16.0);
        let untouched: f32 = second[0].hidden.clone().sum().into_scalar().elem();
        assert_eq!(untouched, 0.0);
    }

    #[test]
    fn test_single_layer_forces_zero_recurrent_dropout() {
        assert_eq!(effective_recurrent_dropout(1, 0.5), 0.0);
        assert_eq!(effective_recurrent_dropout(2, 0.5), 0.5);
        assert_eq!(effective_recurrent_dropout(4, 0.3), 0.3);
    }

    #[test]
    fn test_fused_dense_input_width() {
        let model: LstmNet<TestBackend> = reference_config().init(&device()).unwrap();
        // hidden 128 + non_seq 5 = 133 inputs into the first dense layer
        assert_eq!(model.fc[0].weight.val().dims(), [133, 128]);

        let unfused: LstmNet<TestBackend> = LstmNetConfig::new(100, 1, 128, 1, vec![128])
            .init(&device())
            .unwrap();
        assert_eq!(unfused.fc[0].weight.val().dims(), [128, 128]);
    }

    #[test]
    fn test_empty_dense_stack_projects_from_encoder_width() {
        let config = LstmNetConfig::new(4, 3, 8, 1, vec![]);
        let model: LstmNet<TestBackend> = config.init(&device()).unwrap();

        assert_eq!(model.out.weight.val().dims(), [8, 3]);
        let x = Tensor::<TestBackend, 3>::zeros([2, 5, 4], &device());
        assert_eq!(model.forward(x, None).dims(), [2, 3]);
    }

    #[test]
    fn test_sigmoid_output_activation_bounds_values() {
        let config = LstmNetConfig::new(4, 2, 8, 1, vec![8])
            .with_out_actv(Some(OutputActivation::Sigmoid));
        let model: LstmNet<TestBackend> = config.init(&device()).unwrap();

        let x = Tensor::<TestBackend, 3>::random([5, 6, 4], Distribution::Default, &device());
        let values = model.forward(x, None).into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn test_no_output_activation_returns_raw_projection() {
        let config = LstmNetConfig::new(4, 2, 8, 1, vec![8]);
        let model: LstmNet<TestBackend> = config.init(&device()).unwrap();

        let x = Tensor::<TestBackend, 3>::random([5, 6, 4], Distribution::Default, &device());
        let raw = model.forward(x.clone(), None);

        // Same weights with a sigmoid bolted on must equal sigmoid(raw):
        // the None path applies nothing after the final projection.
        let mut with_actv = model.clone();
        with_actv.out_actv = Some(Ignored(OutputActivation::Sigmoid));
        let activated = with_actv.forward(x, None);

        assert!(activated.all_close(activation::sigmoid(raw), None, None));
    }

    #[test]
    fn test_config_rejects_zero_widths() {
        let device = device();

        let zero_hidden = LstmNetConfig::new(4, 1, 0, 1, vec![8]);
        assert!(zero_hidden.init::<TestBackend>(&device).is_err());

        let zero_input = LstmNetConfig::new(0, 1, 8, 1, vec![8]);
        assert!(zero_input.init::<TestBackend>(&device).is_err());

        let zero_layers = LstmNetConfig::new(4, 1, 8, 0, vec![8]);
        assert!(zero_layers.init::<TestBackend>(&device).is_err());

        let err = LstmNetConfig::new(4, 1, 8, 1, vec![16, 0, 8])
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert!(err.to_string().contains("fc[1]"));

        let zero_fusion = LstmNetConfig::new(4, 1, 8, 1, vec![8])
            .with_non_seq_dim(Some(0));
        assert!(zero_fusion.init::<TestBackend>(&device).is_err());
    }
}
