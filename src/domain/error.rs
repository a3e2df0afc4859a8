// ============================================================
// Layer 3 — Configuration Errors
// ============================================================
// The model itself never checks shapes: a bad configuration
// surfaces as a panic deep inside Burn. These errors let the
// application layer reject such configurations up front.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A hyperparameter that must be positive was zero
    #[error("`{0}` must be a positive integer")]
    ZeroValue(&'static str),

    #[error("img_dim {img_dim} is not divisible by the convolutional downsampling factor {factor}")]
    ImageNotDivisible { img_dim: usize, factor: usize },

    /// img_dim / patch_dim must equal the grid the convolutions produce
    #[error(
        "transformer grid img_dim / patch_dim = {vit_grid} does not match \
         the encoder feature grid {feature_grid} (patch_dim must be {factor})"
    )]
    GridMismatch { vit_grid: usize, feature_grid: usize, factor: usize },

    #[error("embedding width {embedding_dim} is not divisible by head_num {head_num}")]
    HeadsNotDivisible { embedding_dim: usize, head_num: usize },

    /// The last decoder stage works on out_channels / 8 channels
    #[error("out_channels {0} must be at least 8")]
    ChannelsTooNarrow(usize),
}
