// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// and the two data-pipeline modules that produce Burn tensors.
//
// What's in this layer:
//
//   model.rs     — The LSTM sequence regressor
//                  • stacked recurrent encoder with inter-layer
//                    dropout (zeroed for a single layer)
//                  • final-timestep sequence summary
//                  • optional non-sequential feature fusion
//                  • configurable dense head with ReLU + dropout
//                  • optional output activation
//
//   trainer.rs   — The training loop
//                  Forward pass, MSE loss, backward pass, Adam
//                  step, validation metrics, checkpoint saving
//                  per epoch
//
//   predictor.rs — The inference engine
//                  Loads a checkpoint and predicts from a single
//                  observation window

/// LSTM sequence regressor architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads a checkpoint and forecasts
pub mod predictor;
