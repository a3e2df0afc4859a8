// ============================================================
// Layer 5 — TransUNet Decoder
// ============================================================
// Four upsampling stages, each doubling the resolution. The
// first three concatenate the encoder skip tensors, coarsest
// first (x3, x2, x1); the last one has nothing left to join.
//
//   features [b, 512, S/16]
//     │ D1 ⊕ x3  (512 + 4oc → 2oc)   → [b, 2oc,  S/8]
//     │ D2 ⊕ x2  (4oc → oc)          → [b, oc,   S/4]
//     │ D3 ⊕ x1  (2oc → oc/2)        → [b, oc/2, S/2]
//     │ D4       (oc/2 → oc/8)       → [b, oc/8, S  ]
//     │ 1×1 conv (oc/8 → class_num)
//     ▼
//   logits [b, class_num, S, S]

use burn::{nn::conv::Conv2d, prelude::*};

use crate::domain::dims::PROJECTION_CHANNELS;
use crate::ml::blocks::{conv2d, DecoderBottleneck, DecoderBottleneckConfig};
use crate::ml::encoder::EncoderOutput;

#[derive(Config, Debug)]
pub struct DecoderConfig {
    pub out_channels: usize,
    pub class_num:    usize,
}

impl DecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let oc = self.out_channels;

        Decoder {
            decoder1: DecoderBottleneckConfig::new(PROJECTION_CHANNELS + oc * 4, oc * 2).init(device),
            decoder2: DecoderBottleneckConfig::new(oc * 4, oc).init(device),
            decoder3: DecoderBottleneckConfig::new(oc * 2, oc / 2).init(device),
            decoder4: DecoderBottleneckConfig::new(oc / 2, oc / 8).init(device),
            head:     conv2d(oc / 8, self.class_num, 1, 1, 0, true, device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub decoder1: DecoderBottleneck<B>,
    pub decoder2: DecoderBottleneck<B>,
    pub decoder3: DecoderBottleneck<B>,
    pub decoder4: DecoderBottleneck<B>,
    pub head:     Conv2d<B>,
}

impl<B: Backend> Decoder<B> {
    /// Per-pixel class logits, no activation applied
    pub fn forward(&self, encoded: EncoderOutput<B>) -> Tensor<B, 4> {
        let EncoderOutput { features, x1, x2, x3 } = encoded;

        let x = self.decoder1.forward(features, Some(x3));
        let x = self.decoder2.forward(x, Some(x2));
        let x = self.decoder3.forward(x, Some(x1));
        let x = self.decoder4.forward(x, None);
        tracing::debug!("decoder output before head: {:?}", x.dims());

        self.head.forward(x)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_decoder_restores_full_resolution() {
        let device = Default::default();
        let decoder = DecoderConfig::new(8, 3).init::<TestBackend>(&device);

        let encoded = EncoderOutput {
            features: Tensor::<TestBackend, 4>::ones([2, PROJECTION_CHANNELS, 2, 2], &device),
            x1:       Tensor::<TestBackend, 4>::ones([2, 8, 16, 16], &device),
            x2:       Tensor::<TestBackend, 4>::ones([2, 16, 8, 8], &device),
            x3:       Tensor::<TestBackend, 4>::ones([2, 32, 4, 4], &device),
        };
        assert_eq!(decoder.forward(encoded).dims(), [2, 3, 32, 32]);
    }
}
