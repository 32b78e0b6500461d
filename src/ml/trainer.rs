// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Backend split:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu)
//   - Validation batches must also use MyInnerBackend
//
// This backend split IS the model's two modes: dropout samples
// on the autodiff backend and is a no-op on the inner one, so
// training and validation see exactly the regularisation the
// mode calls for.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SeqBatcher, dataset::SeqDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::LstmNet;

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: SeqDataset,
    val_dataset:   SeqDataset,
    ckpt_manager:  CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    train_dataset: SeqDataset,
    val_dataset:   SeqDataset,
    ckpt_manager:  CheckpointManager,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<()> {

    // ── Build model ───────────────────────────────────────────────────────────
    // Any malformed width in the config is rejected here, before any
    // data loading or GPU work happens.
    let model_cfg = cfg.model_config();
    let mut model: LstmNet<MyBackend> = model_cfg.init(&device)?;
    tracing::info!(
        "Model ready: {} recurrent layers, hidden_dim={}, fc={:?}",
        cfg.n_layers, cfg.hidden_dim, cfg.fc
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SeqBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = SeqBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let metrics_logger = MetricsLogger::new(&cfg.checkpoint_dir)?;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(
                batch.inputs,
                batch.non_seq,
                batch.targets,
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → LstmNet<MyInnerBackend>, dropout disabled
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_mae_sum  = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let predictions = model_valid.forward(batch.inputs, batch.non_seq);

            let batch_loss: f64 = MseLoss::new()
                .forward(predictions.clone(), batch.targets.clone(), Reduction::Mean)
                .into_scalar().elem::<f64>();

            let batch_mae: f64 = (predictions - batch.targets)
                .abs().mean()
                .into_scalar().elem::<f64>();

            val_loss_sum += batch_loss;
            val_mae_sum  += batch_mae;
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let avg_val_mae  = if val_batches > 0 { val_mae_sum  / val_batches as f64 } else { f64::NAN };
        let val_rmse     = avg_val_loss.sqrt();

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_mae={:.4} | val_rmse={:.4}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, avg_val_mae, val_rmse,
        );

        metrics_logger.log(&EpochMetrics::new(
            epoch, avg_train_loss, avg_val_loss, avg_val_mae, val_rmse,
        ))?;

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(())
}
