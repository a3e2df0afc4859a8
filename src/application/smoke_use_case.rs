// ============================================================
// Layer 2 — SmokeUseCase
// ============================================================
// One forward pass on random data:
//
//   Step 1: Resolve + validate the model config  (Layer 2)
//   Step 2: Build the model, restore weights     (Layer 5/6)
//   Step 3: Forward a uniform [0, 1) batch       (Layer 5)
//   Step 4: Check the logits have the plan shape (Layer 3)

use anyhow::{ensure, Result};
use std::path::PathBuf;

use crate::application::model_source::ModelSource;
use crate::domain::{device::DeviceKind, shape_plan::ShapePlan};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::runner::run_smoke;

#[derive(Debug, Clone)]
pub struct SmokeConfig {
    pub source:         ModelSource,
    pub batch_size:     usize,
    pub device:         DeviceKind,
    pub seed:           u64,
    /// Restore weights from here instead of using a fresh initialisation
    pub checkpoint_dir: Option<PathBuf>,
}

pub struct SmokeUseCase {
    config: SmokeConfig,
}

impl SmokeUseCase {
    pub fn new(config: SmokeConfig) -> Self {
        Self { config }
    }

    /// Returns the shape of the logits tensor
    pub fn execute(&self) -> Result<[usize; 4]> {
        let cfg = &self.config;
        ensure!(cfg.batch_size > 0, "batch size must be positive");

        let checkpoint = cfg
            .checkpoint_dir
            .as_ref()
            .map(CheckpointManager::new)
            .transpose()?;

        let model_cfg = cfg.source.resolve(checkpoint.as_ref())?;
        tracing::info!(
            "Running forward pass: batch={} img_dim={} device={}",
            cfg.batch_size, model_cfg.img_dim, cfg.device
        );

        let shape = run_smoke(&model_cfg, cfg.batch_size, cfg.seed, cfg.device, checkpoint.as_ref())?;

        let plan = ShapePlan::new(&model_cfg.dims(), cfg.batch_size);
        ensure!(
            plan.output() == shape.as_slice(),
            "output shape {:?} does not match the expected {:?}",
            shape,
            plan.output()
        );
        Ok(shape)
    }
}
