// ============================================================
// Layer 2 — Model Source
// ============================================================
// Resolves the hyperparameters a command should use, in order
// of precedence:
//
//   1. --config <file.json>
//   2. model_config.json inside the checkpoint directory
//      (only when the command restores weights from it)
//   3. the individual hyperparameter flags
//
// Whatever wins is validated before any tensor is allocated, so
// a bad configuration is reported as an error instead of a
// shape-mismatch panic in the middle of the forward pass.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::domain::dims::ModelDims;
use crate::infra::checkpoint::{read_config, CheckpointManager};
use crate::ml::model::TransUnetConfig;

#[derive(Debug, Clone)]
pub struct ModelSource {
    pub dims:        ModelDims,
    pub config_file: Option<PathBuf>,
}

impl ModelSource {
    pub fn new(dims: ModelDims, config_file: Option<PathBuf>) -> Self {
        Self { dims, config_file }
    }

    /// Resolve and validate the model configuration.
    pub fn resolve(&self, checkpoint: Option<&CheckpointManager>) -> Result<TransUnetConfig> {
        let cfg = if let Some(path) = &self.config_file {
            tracing::info!("Reading model config from '{}'", path.display());
            read_config(path)?
        } else if let Some(ckpt) = checkpoint.filter(|c| c.has_config()) {
            tracing::info!("Reading model config from checkpoint '{}'", ckpt.dir().display());
            ckpt.load_config()?
        } else {
            TransUnetConfig::from(self.dims)
        };

        cfg.validate().context("Invalid model configuration")?;
        Ok(cfg)
    }
}
