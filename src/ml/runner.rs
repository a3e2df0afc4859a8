// ============================================================
// Layer 5 — Backend Runner
// ============================================================
// The only place that names concrete Burn backends. Everything
// else in this layer is generic over `B: Backend`; the runner
// picks NdArray or Wgpu from a DeviceKind and calls the
// generic function with the matching device.
//
// Neither backend is wrapped in Autodiff, so batch norm uses
// its running statistics and dropout is disabled.

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu},
    prelude::*,
    tensor::Distribution,
};

use crate::domain::device::DeviceKind;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{TransUnet, TransUnetConfig};

/// Parameters held by each top-level component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamCounts {
    pub encoder_cnn:  usize,
    pub transformer:  usize,
    pub projection:   usize,
    pub decoder:      usize,
}

impl ParamCounts {
    pub fn total(&self) -> usize {
        self.encoder_cnn + self.transformer + self.projection + self.decoder
    }
}

/// Build a model, optionally restore weights, and run one forward pass on
/// uniform [0, 1) images. Returns the output shape.
pub fn run_smoke(
    cfg:        &TransUnetConfig,
    batch_size: usize,
    seed:       u64,
    device:     DeviceKind,
    checkpoint: Option<&CheckpointManager>,
) -> Result<[usize; 4]> {
    match device {
        DeviceKind::Cpu => smoke::<NdArray>(cfg, batch_size, seed, NdArrayDevice::default(), checkpoint),
        DeviceKind::Wgpu => smoke::<Wgpu>(cfg, batch_size, seed, WgpuDevice::default(), checkpoint),
    }
}

fn smoke<B: Backend>(
    cfg:        &TransUnetConfig,
    batch_size: usize,
    seed:       u64,
    device:     B::Device,
    checkpoint: Option<&CheckpointManager>,
) -> Result<[usize; 4]> {
    tracing::info!("Using device: {:?}", device);
    B::seed(seed);

    let model: TransUnet<B> = cfg.init(&device);
    let model = match checkpoint {
        Some(ckpt) => ckpt.load_model(model, &device)?,
        None       => model,
    };
    tracing::info!("Model ready: {} parameters", model.num_params());

    let images = Tensor::<B, 4>::random(
        [batch_size, cfg.in_channels, cfg.img_dim, cfg.img_dim],
        Distribution::Default,
        &device,
    );
    tracing::debug!("Input shape: {:?}", images.dims());

    let logits = model.forward(images);
    Ok(logits.dims())
}

/// Build a freshly initialised model and persist config + weights.
pub fn init_and_save(
    cfg:    &TransUnetConfig,
    seed:   u64,
    device: DeviceKind,
    ckpt:   &CheckpointManager,
) -> Result<usize> {
    match device {
        DeviceKind::Cpu  => save_fresh::<NdArray>(cfg, seed, NdArrayDevice::default(), ckpt),
        DeviceKind::Wgpu => save_fresh::<Wgpu>(cfg, seed, WgpuDevice::default(), ckpt),
    }
}

fn save_fresh<B: Backend>(
    cfg:    &TransUnetConfig,
    seed:   u64,
    device: B::Device,
    ckpt:   &CheckpointManager,
) -> Result<usize> {
    B::seed(seed);
    let model: TransUnet<B> = cfg.init(&device);
    ckpt.save_config(cfg)?;
    ckpt.save_model(&model)?;
    Ok(model.num_params())
}

/// Count parameters per component on the CPU backend.
pub fn count_params(cfg: &TransUnetConfig) -> ParamCounts {
    let model: TransUnet<NdArray> = cfg.init(&NdArrayDevice::default());
    let enc = &model.encoder;

    let encoder_cnn = enc.stem_conv.num_params()
        + enc.stem_norm.num_params()
        + enc.encoder1.num_params()
        + enc.encoder2.num_params()
        + enc.encoder3.num_params();

    ParamCounts {
        encoder_cnn,
        transformer: enc.vit.num_params(),
        projection:  enc.projection.num_params(),
        decoder:     model.decoder.num_params(),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> TransUnetConfig {
        TransUnetConfig::new(32, 3, 8, 2, 16, 1, 16, 1)
    }

    #[test]
    fn test_smoke_on_cpu_returns_logit_shape() {
        let shape = run_smoke(&tiny(), 2, 42, DeviceKind::Cpu, None).unwrap();
        assert_eq!(shape, [2, 1, 32, 32]);
    }

    #[test]
    fn test_param_counts_add_up() {
        let cfg = tiny();
        let counts = count_params(&cfg);
        let model: TransUnet<NdArray> = cfg.init(&NdArrayDevice::default());
        assert_eq!(counts.total(), model.num_params());
        assert!(counts.transformer > 0);
    }

    #[test]
    fn test_head_has_one_filter_per_class() {
        let two   = count_params(&TransUnetConfig::new(32, 3, 8, 2, 16, 1, 16, 2));
        let three = count_params(&TransUnetConfig::new(32, 3, 8, 2, 16, 1, 16, 3));
        // Each extra class adds a 1×1 kernel over oc/8 = 1 channel plus a bias
        assert_eq!(three.decoder - two.decoder, 2);
        assert_eq!(three.encoder_cnn, two.encoder_cnn);
    }
}
