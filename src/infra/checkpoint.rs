// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores a TransUNet using Burn's CompactRecorder.
//
// What gets saved:
//   1. model_config.json — the eight hyperparameters
//   2. model.mpk.gz      — all learned parameters and
//                          batch-norm running statistics
//
// The config is needed first: the model is rebuilt from it and
// the recorded weights are then loaded into that skeleton.
// CompactRecorder stores half precision, so restored weights
// match the originals to about three decimal places.
//
// File layout:
//   checkpoints/
//     model_config.json
//     model.mpk.gz

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::{TransUnet, TransUnetConfig};

const CONFIG_FILE: &str = "model_config.json";
const WEIGHTS_STEM: &str = "model";

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights to {dir}/model.mpk.gz
    pub fn save_model<B: Backend>(&self, model: &TransUnet<B>) -> Result<()> {
        // Without extension — the recorder adds it
        let path = self.dir.join(WEIGHTS_STEM);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        tracing::debug!("Saved weights to '{}'", path.display());
        Ok(())
    }

    /// Load weights into a model built from the matching config.
    ///
    /// Fails if the file is missing or the recorded architecture
    /// does not match `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  TransUnet<B>,
        device: &B::Device,
    ) -> Result<TransUnet<B>> {
        let path = self.dir.join(WEIGHTS_STEM);
        tracing::info!("Loading weights from '{}'", path.display());

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you run 'init' first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TransUnetConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TransUnetConfig> {
        read_config(&self.dir.join(CONFIG_FILE))
    }

    pub fn has_config(&self) -> bool {
        self.dir.join(CONFIG_FILE).exists()
    }
}

/// Read a TransUnetConfig from any JSON file.
pub fn read_config(path: &Path) -> Result<TransUnetConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

    serde_json::from_str(&json)
        .with_context(|| format!("Invalid model config in '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("trans-unet-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn tiny() -> TransUnetConfig {
        TransUnetConfig::new(32, 3, 8, 2, 16, 1, 16, 2)
    }

    #[test]
    fn test_config_survives_save_and_load() {
        let dir  = scratch_dir("config");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        assert!(!ckpt.has_config());

        ckpt.save_config(&tiny()).unwrap();
        assert!(ckpt.has_config());
        assert_eq!(ckpt.load_config().unwrap().dims(), tiny().dims());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_weights_restore_into_fresh_model() {
        let device = Default::default();
        let dir    = scratch_dir("weights");
        let ckpt   = CheckpointManager::new(&dir).unwrap();

        let saved: TransUnet<TestBackend> = tiny().init(&device);
        ckpt.save_model(&saved).unwrap();

        let fresh: TransUnet<TestBackend> = tiny().init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let expected = saved.decoder.head.weight.val().into_data();
        let actual   = loaded.decoder.head.weight.val().into_data();
        actual.assert_approx_eq(&expected, 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_weights_is_an_error() {
        let device = Default::default();
        let dir    = scratch_dir("missing");
        let ckpt   = CheckpointManager::new(&dir).unwrap();

        let model: TransUnet<TestBackend> = tiny().init(&device);
        assert!(ckpt.load_model(model, &device).is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_config_rejects_garbage() {
        let dir = scratch_dir("garbage");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(read_config(&path).is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
