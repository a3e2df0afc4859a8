// ============================================================
// Layer 5 — Bottleneck Blocks
// ============================================================
// The two convolutional building blocks of TransUNet.
//
// EncoderBottleneck (ResNet-style, one per downsampling step):
//
//   x ─┬─ 1×1 conv ─ BN ─ ReLU                        (width)
//      │  3×3 conv stride s ─ BN ─ ReLU               (width)
//      │  1×1 conv ─ BN ─ ReLU                        (out)
//      │                                               │
//      └─ 1×1 conv stride s ─ BN ───────────────────── + ─ ReLU
//
// DecoderBottleneck (one per upsampling step):
//
//   x ─ bilinear ×s ─ [concat skip] ─ (3×3 conv ─ BN ─ ReLU) ×2

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::upsample::upsample_bilinear_aligned;

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// Square convolution with symmetric padding.
pub(crate) fn conv2d<B: Backend>(
    in_channels:  usize,
    out_channels: usize,
    kernel:       usize,
    stride:       usize,
    padding:      usize,
    bias:         bool,
    device:       &B::Device,
) -> Conv2d<B> {
    Conv2dConfig::new([in_channels, out_channels], [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(padding, padding))
        .with_bias(bias)
        .init(device)
}

pub(crate) fn batch_norm<B: Backend>(channels: usize, device: &B::Device) -> BatchNorm<B, 2> {
    BatchNormConfig::new(channels).init(device)
}

/// conv → batch norm → ReLU, the unit every stage is built from
#[derive(Module, Debug)]
pub struct ConvNormAct<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
}

impl<B: Backend> ConvNormAct<B> {
    pub fn new(conv: Conv2d<B>, channels: usize, device: &B::Device) -> Self {
        Self { conv, norm: batch_norm(channels, device) }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.norm.forward(self.conv.forward(x)))
    }
}

// ─── EncoderBottleneck ────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct EncoderBottleneckConfig {
    pub in_channels:  usize,
    pub out_channels: usize,
    /// Spatial stride of the 3×3 conv and of the shortcut
    #[config(default = 2)]
    pub stride: usize,
    /// Bottleneck width is out_channels * base_width / 64
    #[config(default = 64)]
    pub base_width: usize,
}

impl EncoderBottleneckConfig {
    pub fn width(&self) -> usize {
        self.out_channels * self.base_width / 64
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderBottleneck<B> {
        let width = self.width();

        let downsample_conv = conv2d(self.in_channels, self.out_channels, 1, self.stride, 0, false, device);
        let downsample_norm = batch_norm(self.out_channels, device);

        let reduce = ConvNormAct::new(
            conv2d(self.in_channels, width, 1, 1, 0, false, device), width, device,
        );
        let spatial = ConvNormAct::new(
            conv2d(width, width, 3, self.stride, 1, false, device), width, device,
        );
        let expand = ConvNormAct::new(
            conv2d(width, self.out_channels, 1, 1, 0, false, device), self.out_channels, device,
        );

        EncoderBottleneck { downsample_conv, downsample_norm, reduce, spatial, expand }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBottleneck<B: Backend> {
    pub downsample_conv: Conv2d<B>,
    pub downsample_norm: BatchNorm<B, 2>,
    pub reduce:          ConvNormAct<B>,
    pub spatial:         ConvNormAct<B>,
    pub expand:          ConvNormAct<B>,
}

impl<B: Backend> EncoderBottleneck<B> {
    /// [b, in, h, w] → [b, out, ⌈h/s⌉, ⌈w/s⌉]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let shortcut = self.downsample_norm.forward(self.downsample_conv.forward(x.clone()));

        let x = self.reduce.forward(x);
        let x = self.spatial.forward(x);
        let x = self.expand.forward(x);

        relu(x + shortcut)
    }
}

// ─── DecoderBottleneck ────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct DecoderBottleneckConfig {
    /// Channels after concatenation (upsampled input + skip)
    pub in_channels:  usize,
    pub out_channels: usize,
    #[config(default = 2)]
    pub scale_factor: usize,
}

impl DecoderBottleneckConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DecoderBottleneck<B> {
        let conv1 = ConvNormAct::new(
            conv2d(self.in_channels, self.out_channels, 3, 1, 1, true, device),
            self.out_channels,
            device,
        );
        let conv2 = ConvNormAct::new(
            conv2d(self.out_channels, self.out_channels, 3, 1, 1, true, device),
            self.out_channels,
            device,
        );
        DecoderBottleneck { conv1, conv2, scale_factor: self.scale_factor }
    }
}

#[derive(Module, Debug)]
pub struct DecoderBottleneck<B: Backend> {
    pub conv1:        ConvNormAct<B>,
    pub conv2:        ConvNormAct<B>,
    pub scale_factor: usize,
}

impl<B: Backend> DecoderBottleneck<B> {
    /// Upsample `x`, prepend `skip` along channels when given, then convolve.
    ///
    /// The skip tensor must have the upsampled spatial size; this is not
    /// checked and a mismatch panics inside the concatenation.
    pub fn forward(&self, x: Tensor<B, 4>, skip: Option<Tensor<B, 4>>) -> Tensor<B, 4> {
        let x = upsample_bilinear_aligned(x, self.scale_factor);

        let x = match skip {
            Some(skip) => Tensor::cat(vec![skip, x], 1),
            None       => x,
        };

        self.conv2.forward(self.conv1.forward(x))
    }
}
