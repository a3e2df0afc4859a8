// ============================================================
// Layer 2 — InitUseCase
// ============================================================
// Builds a freshly initialised model and writes it to a
// checkpoint directory (config JSON + weights), so later
// `smoke --checkpoint-dir` runs reuse the same parameters.

use anyhow::Result;
use std::path::PathBuf;

use crate::application::model_source::ModelSource;
use crate::domain::device::DeviceKind;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::runner::init_and_save;

#[derive(Debug, Clone)]
pub struct InitConfig {
    pub source:         ModelSource,
    pub checkpoint_dir: PathBuf,
    pub device:         DeviceKind,
    pub seed:           u64,
}

pub struct InitUseCase {
    config: InitConfig,
}

impl InitUseCase {
    pub fn new(config: InitConfig) -> Self {
        Self { config }
    }

    /// Returns the number of saved parameters
    pub fn execute(&self) -> Result<usize> {
        let cfg  = &self.config;
        let ckpt = CheckpointManager::new(cfg.checkpoint_dir.clone())?;

        // Flags or --config only; an existing checkpoint is overwritten
        let model_cfg = cfg.source.resolve(None)?;

        let params = init_and_save(&model_cfg, cfg.seed, cfg.device, &ckpt)?;
        tracing::info!("Saved {} parameters to '{}'", params, ckpt.dir().display());
        Ok(params)
    }
}
