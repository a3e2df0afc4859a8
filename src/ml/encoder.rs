// ============================================================
// Layer 5 — TransUNet Encoder
// ============================================================
//   input [b, in, S, S]
//     │ 7×7 conv stride 2 ─ BN ─ ReLU           → x1 [b, oc,  S/2 ]
//     │ EncoderBottleneck                        → x2 [b, 2oc, S/4 ]
//     │ EncoderBottleneck                        → x3 [b, 4oc, S/8 ]
//     │ EncoderBottleneck                        →    [b, 8oc, S/16]
//     │ ViT (patch_dim 1, every pixel a token)   →    [b, (S/16)², 8oc]
//     │ b (x y) c → b c x y
//     │ 3×3 conv ─ BN ─ ReLU                     →    [b, 512, S/16]
//     ▼
//   EncoderOutput { features, x1, x2, x3 }

use burn::{
    nn::{conv::Conv2d, BatchNorm},
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::dims::PROJECTION_CHANNELS;
use crate::ml::blocks::{batch_norm, conv2d, ConvNormAct, EncoderBottleneck, EncoderBottleneckConfig};
use crate::ml::vit::{Vit, VitConfig};

#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub img_dim:      usize,
    pub in_channels:  usize,
    pub out_channels: usize,
    pub head_num:     usize,
    pub mlp_dim:      usize,
    pub block_num:    usize,
    pub patch_dim:    usize,
}

impl EncoderConfig {
    /// Side of the token grid the reshape after the transformer uses
    pub fn vit_img_dim(&self) -> usize {
        self.img_dim / self.patch_dim
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        let oc = self.out_channels;

        let stem_conv = conv2d(self.in_channels, oc, 7, 2, 3, false, device);
        let stem_norm = batch_norm(oc, device);

        let encoder1 = EncoderBottleneckConfig::new(oc,     oc * 2).init(device);
        let encoder2 = EncoderBottleneckConfig::new(oc * 2, oc * 4).init(device);
        let encoder3 = EncoderBottleneckConfig::new(oc * 4, oc * 8).init(device);

        let vit = VitConfig::new(
            self.vit_img_dim(),
            oc * 8,
            oc * 8,
            self.head_num,
            self.mlp_dim,
            self.block_num,
            1,
        )
        .init(device);

        let projection = ConvNormAct::new(
            conv2d(oc * 8, PROJECTION_CHANNELS, 3, 1, 1, true, device),
            PROJECTION_CHANNELS,
            device,
        );

        Encoder {
            stem_conv,
            stem_norm,
            encoder1,
            encoder2,
            encoder3,
            vit,
            projection,
            vit_img_dim: self.vit_img_dim(),
        }
    }
}

/// Encoder result: the projected bottleneck plus the three skip tensors,
/// finest first.
#[derive(Debug, Clone)]
pub struct EncoderOutput<B: Backend> {
    /// [b, 512, S/16, S/16]
    pub features: Tensor<B, 4>,
    /// [b, oc, S/2, S/2]
    pub x1: Tensor<B, 4>,
    /// [b, 2·oc, S/4, S/4]
    pub x2: Tensor<B, 4>,
    /// [b, 4·oc, S/8, S/8]
    pub x3: Tensor<B, 4>,
}

#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub stem_conv:   Conv2d<B>,
    pub stem_norm:   BatchNorm<B, 2>,
    pub encoder1:    EncoderBottleneck<B>,
    pub encoder2:    EncoderBottleneck<B>,
    pub encoder3:    EncoderBottleneck<B>,
    pub vit:         Vit<B>,
    pub projection:  ConvNormAct<B>,
    pub vit_img_dim: usize,
}

impl<B: Backend> Encoder<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> EncoderOutput<B> {
        let x1 = relu(self.stem_norm.forward(self.stem_conv.forward(x)));

        let x2 = self.encoder1.forward(x1.clone());
        let x3 = self.encoder2.forward(x2.clone());
        let x  = self.encoder3.forward(x3.clone());
        tracing::debug!("encoder bottleneck: {:?}", x.dims());

        let tokens = self.vit.forward(x);
        let [batch, token_count, channels] = tokens.dims();

        // b (x y) c -> b c x y
        let grid = self.vit_img_dim;
        assert_eq!(
            token_count,
            grid * grid,
            "cannot reshape {token_count} transformer tokens into a {grid}x{grid} grid"
        );
        let x = tokens
            .reshape([batch, grid, grid, channels])
            .permute([0, 3, 1, 2]);

        let features = self.projection.forward(x);
        EncoderOutput { features, x1, x2, x3 }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_skip_tensors_at_half_quarter_eighth_resolution() {
        let device = Default::default();
        let encoder = EncoderConfig::new(32, 3, 8, 2, 16, 1, 16).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::ones([2, 3, 32, 32], &device);

        let out = encoder.forward(x);
        assert_eq!(out.x1.dims(), [2, 8, 16, 16]);
        assert_eq!(out.x2.dims(), [2, 16, 8, 8]);
        assert_eq!(out.x3.dims(), [2, 32, 4, 4]);
        assert_eq!(out.features.dims(), [2, PROJECTION_CHANNELS, 2, 2]);
    }

    #[test]
    fn test_vit_grid_follows_patch_dim() {
        assert_eq!(EncoderConfig::new(128, 3, 128, 4, 512, 8, 16).vit_img_dim(), 8);
        assert_eq!(EncoderConfig::new(64, 3, 128, 4, 512, 8, 16).vit_img_dim(), 4);
    }

    #[test]
    #[should_panic(expected = "cannot reshape 4 transformer tokens into a 4x4 grid")]
    fn test_patch_dim_not_matching_downsampling_panics() {
        let device = Default::default();
        // Convolutions give a 2×2 grid, the reshape expects 32 / 8 = 4
        let encoder = EncoderConfig::new(32, 3, 8, 2, 16, 1, 8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        let _ = encoder.forward(x);
    }
}
