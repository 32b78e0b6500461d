// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   checkpoint.rs   — Saving and loading model weights with
//                     Burn's CompactRecorder, plus the
//                     TrainConfig JSON needed to rebuild the
//                     architecture at prediction time.
//
//   scaler_store.rs — Persistence for the fitted Scaler, so the
//                     exact normalisation used in training is
//                     reapplied (and inverted) at prediction.
//
//   metrics.rs      — Per-epoch training metrics appended to a
//                     CSV file for later analysis and plotting.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Fitted scaler saving and loading
pub mod scaler_store;

/// Training metrics CSV logger
pub mod metrics;
