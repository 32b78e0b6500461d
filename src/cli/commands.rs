// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand, ValueEnum};
use crate::application::train_use_case::TrainConfig;
use crate::ml::model::OutputActivation;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the sequence regressor on .csv time series
    Train(TrainArgs),

    /// Forecast the next target value using a trained checkpoint
    Predict(PredictArgs),
}

/// Output activation choices exposed on the command line.
/// Kept separate from the model enum so clap types never leak
/// past this layer.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutActivationArg {
    Sigmoid,
    Tanh,
}

impl From<OutActivationArg> for OutputActivation {
    fn from(a: OutActivationArg) -> Self {
        match a {
            OutActivationArg::Sigmoid => OutputActivation::Sigmoid,
            OutActivationArg::Tanh    => OutputActivation::Tanh,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing .csv files to train on
    #[arg(long, default_value = "data/series")]
    pub data_dir: String,

    /// Directory to save model checkpoints and the fitted scaler
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Comma-separated columns fed into the recurrent encoder
    #[arg(long, value_delimiter = ',', default_value = "close")]
    pub features: Vec<String>,

    /// Column whose future value is predicted
    #[arg(long, default_value = "close")]
    pub target: String,

    /// Comma-separated columns appended as a non-sequential vector
    /// after the recurrent encoder (omit to disable fusion)
    #[arg(long, value_delimiter = ',')]
    pub static_features: Vec<String>,

    /// Number of rows in each input window
    #[arg(long, default_value_t = 16)]
    pub seq_len: usize,

    /// How many rows past the window the target value sits
    #[arg(long, default_value_t = 1)]
    pub horizon: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// How fast the model learns — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Hidden width of every recurrent layer
    #[arg(long, default_value_t = 128)]
    pub hidden_dim: usize,

    /// Number of stacked recurrent layers
    #[arg(long, default_value_t = 1)]
    pub n_layers: usize,

    /// Comma-separated widths of the intermediate dense layers
    #[arg(long, value_delimiter = ',', default_value = "128")]
    pub fc: Vec<usize>,

    /// Dropout probability — randomly zeroes activations during training
    /// to prevent overfitting
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Activation applied to the final output (omit for raw values)
    #[arg(long, value_enum)]
    pub out_activation: Option<OutActivationArg>,

    /// Proportion of samples used for training; the rest validate
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Shuffle before splitting instead of the chronological default
    #[arg(long, default_value_t = false)]
    pub shuffle_split: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            feature_cols:   a.features,
            target_col:     a.target,
            static_cols:    a.static_features,
            seq_len:        a.seq_len,
            horizon:        a.horizon,
            train_fraction: a.train_fraction,
            shuffle_split:  a.shuffle_split,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            hidden_dim:     a.hidden_dim,
            n_layers:       a.n_layers,
            fc:             a.fc,
            dropout:        a.dropout,
            out_actv:       a.out_activation.map(Into::into),
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The .csv file whose tail becomes the input window
    #[arg(long)]
    pub data: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
