use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One windowed, normalised training sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeqSample {
    /// seq_len rows of input features, oldest first
    pub window:  Vec<Vec<f32>>,
    /// Static features observed at the window's last row, if configured
    pub non_seq: Option<Vec<f32>>,
    /// Target values `horizon` rows past the window
    pub target:  Vec<f32>,
}

impl SeqSample {
    pub fn seq_len(&self) -> usize {
        self.window.len()
    }

    pub fn input_dim(&self) -> usize {
        self.window.first().map(|row| row.len()).unwrap_or(0)
    }
}

pub struct SeqDataset {
    samples: Vec<SeqSample>,
}

impl SeqDataset {
    pub fn new(samples: Vec<SeqSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SeqSample> for SeqDataset {
    fn get(&self, index: usize) -> Option<SeqSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
