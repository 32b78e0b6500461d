// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw .csv files to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   .csv files
//       │
//       ▼
//   CsvLoader         → reads files, extracts numeric columns
//       │
//       ▼
//   Scaler            → normalises each column (z-score)
//       │
//       ▼
//   Windower          → slides fixed-length windows over the rows
//       │
//       ▼
//   SeqDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   SeqBatcher        → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.

/// Loads .csv files from a directory using the csv crate
pub mod loader;

/// Fits and applies per-column normalisation
pub mod preprocessor;

/// Slides fixed-length windows over a series to build samples
pub mod windowing;

/// Implements Burn's Dataset trait for windowed samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Splits samples into train/validation sets
pub mod splitter;
