// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `smoke`, `init` and `summary`.
// All of them share the model hyperparameter flags; their
// defaults are the 128×128 reference configuration.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    init_use_case::InitConfig,
    model_source::ModelSource,
    smoke_use_case::SmokeConfig,
};
use crate::domain::{device::DeviceKind, dims::ModelDims};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one forward pass on random images and print the output shape
    Smoke(SmokeArgs),

    /// Initialise a model and save config + weights to a directory
    Init(InitArgs),

    /// Print per-stage tensor shapes and parameter counts
    Summary(SummaryArgs),
}

/// The eight TransUNet hyperparameters
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Height and width of the square input image
    #[arg(long, default_value_t = 128)]
    pub img_dim: usize,

    /// Channels of the input image
    #[arg(long, default_value_t = 3)]
    pub in_channels: usize,

    /// Base channel width of the CNN encoder (at least 8)
    #[arg(long, default_value_t = 128)]
    pub out_channels: usize,

    /// Attention heads; must divide 8 * out_channels
    #[arg(long, default_value_t = 4)]
    pub head_num: usize,

    /// Hidden width of the transformer MLP
    #[arg(long, default_value_t = 512)]
    pub mlp_dim: usize,

    /// Number of stacked transformer blocks
    #[arg(long, default_value_t = 8)]
    pub block_num: usize,

    /// img_dim / patch_dim is the transformer grid (16 for this encoder)
    #[arg(long, default_value_t = 16)]
    pub patch_dim: usize,

    /// Number of segmentation classes
    #[arg(long, default_value_t = 1)]
    pub class_num: usize,

    /// JSON model config; overrides every flag above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl From<ModelArgs> for ModelSource {
    fn from(a: ModelArgs) -> Self {
        let dims = ModelDims {
            img_dim:      a.img_dim,
            in_channels:  a.in_channels,
            out_channels: a.out_channels,
            head_num:     a.head_num,
            mlp_dim:      a.mlp_dim,
            block_num:    a.block_num,
            patch_dim:    a.patch_dim,
            class_num:    a.class_num,
        };
        ModelSource::new(dims, a.config)
    }
}

#[derive(Args, Debug)]
pub struct SmokeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Images in the random batch
    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// cpu (NdArray) or wgpu
    #[arg(long, default_value_t = DeviceKind::Cpu)]
    pub device: DeviceKind,

    /// Seed for weight initialisation and the random batch
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Restore weights (and config) saved by `init`
    #[arg(long)]
    pub checkpoint_dir: Option<PathBuf>,
}

impl From<SmokeArgs> for SmokeConfig {
    fn from(a: SmokeArgs) -> Self {
        SmokeConfig {
            source:         a.model.into(),
            batch_size:     a.batch_size,
            device:         a.device,
            seed:           a.seed,
            checkpoint_dir: a.checkpoint_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Directory to write model_config.json and the weights into
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    #[arg(long, default_value_t = DeviceKind::Cpu)]
    pub device: DeviceKind,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<InitArgs> for InitConfig {
    fn from(a: InitArgs) -> Self {
        InitConfig {
            source:         a.model.into(),
            checkpoint_dir: a.checkpoint_dir,
            device:         a.device,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Batch size used for the printed shapes
    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,
}
