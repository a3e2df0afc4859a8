// ============================================================
// Layer 3 — Model Dimensions
// ============================================================
// The eight integers that fully determine a TransUNet:
//
//   img_dim      — height and width of the (square) input image
//   in_channels  — channels of the input image (3 for RGB)
//   out_channels — base channel width of the CNN encoder
//   head_num     — attention heads in the transformer
//   mlp_dim      — hidden width of the transformer MLP
//   block_num    — number of stacked transformer blocks
//   patch_dim    — img_dim / patch_dim is the transformer grid
//   class_num    — segmentation classes (output channels)
//
// The stem and the three encoder bottlenecks each halve the
// spatial size, so the transformer always sees an
// img_dim / 16 grid. The reshape after the transformer uses
// img_dim / patch_dim, which only lines up when patch_dim is 16.

use crate::domain::error::ConfigError;

/// Total spatial reduction of stem (×2) plus three bottlenecks (×2 each)
pub const DOWNSAMPLE_FACTOR: usize = 16;

/// Channel width of the encoder's projection after the transformer
pub const PROJECTION_CHANNELS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDims {
    pub img_dim:      usize,
    pub in_channels:  usize,
    pub out_channels: usize,
    pub head_num:     usize,
    pub mlp_dim:      usize,
    pub block_num:    usize,
    pub patch_dim:    usize,
    pub class_num:    usize,
}

impl ModelDims {
    /// Token width inside the transformer (channels of the deepest CNN stage)
    pub fn embedding_dim(&self) -> usize {
        self.out_channels * 8
    }

    /// Side of the grid the reshape after the transformer expects
    pub fn vit_grid(&self) -> usize {
        self.img_dim / self.patch_dim.max(1)
    }

    /// Side of the grid the convolutional stages actually produce
    pub fn feature_grid(&self) -> usize {
        self.img_dim / DOWNSAMPLE_FACTOR
    }

    /// Check every rule the forward pass relies on implicitly.
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("img_dim",      self.img_dim),
            ("in_channels",  self.in_channels),
            ("out_channels", self.out_channels),
            ("head_num",     self.head_num),
            ("mlp_dim",      self.mlp_dim),
            ("block_num",    self.block_num),
            ("patch_dim",    self.patch_dim),
            ("class_num",    self.class_num),
        ];
        if let Some(&(name, _)) = fields.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ZeroValue(name));
        }

        if self.img_dim % DOWNSAMPLE_FACTOR != 0 {
            return Err(ConfigError::ImageNotDivisible {
                img_dim: self.img_dim,
                factor:  DOWNSAMPLE_FACTOR,
            });
        }

        if self.img_dim % self.patch_dim != 0 || self.vit_grid() != self.feature_grid() {
            return Err(ConfigError::GridMismatch {
                vit_grid:     self.vit_grid(),
                feature_grid: self.feature_grid(),
                factor:       DOWNSAMPLE_FACTOR,
            });
        }

        if self.embedding_dim() % self.head_num != 0 {
            return Err(ConfigError::HeadsNotDivisible {
                embedding_dim: self.embedding_dim(),
                head_num:      self.head_num,
            });
        }

        if self.out_channels < 8 {
            return Err(ConfigError::ChannelsTooNarrow(self.out_channels));
        }

        Ok(())
    }
}

impl Default for ModelDims {
    /// The reference configuration: 128×128 RGB input, binary mask output
    fn default() -> Self {
        Self {
            img_dim:      128,
            in_channels:  3,
            out_channels: 128,
            head_num:     4,
            mlp_dim:      512,
            block_num:    8,
            patch_dim:    16,
            class_num:    1,
        }
    }
}
