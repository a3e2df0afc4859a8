use burn::prelude::*;

use crate::domain::{dims::ModelDims, error::ConfigError};
use crate::ml::decoder::{Decoder, DecoderConfig};
use crate::ml::encoder::{Encoder, EncoderConfig, EncoderOutput};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TransUnetConfig {
    pub img_dim:      usize,
    pub in_channels:  usize,
    pub out_channels: usize,
    pub head_num:     usize,
    pub mlp_dim:      usize,
    pub block_num:    usize,
    pub patch_dim:    usize,
    pub class_num:    usize,
}

impl TransUnetConfig {
    pub fn dims(&self) -> ModelDims {
        ModelDims {
            img_dim:      self.img_dim,
            in_channels:  self.in_channels,
            out_channels: self.out_channels,
            head_num:     self.head_num,
            mlp_dim:      self.mlp_dim,
            block_num:    self.block_num,
            patch_dim:    self.patch_dim,
            class_num:    self.class_num,
        }
    }

    /// Reject configurations whose forward pass would hit a shape mismatch.
    /// `init` does not call this; an unchecked config builds fine and panics
    /// on its first forward pass instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dims().validate()
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TransUnet<B> {
        let encoder = EncoderConfig::new(
            self.img_dim, self.in_channels, self.out_channels,
            self.head_num, self.mlp_dim, self.block_num, self.patch_dim,
        )
        .init(device);
        let decoder = DecoderConfig::new(self.out_channels, self.class_num).init(device);
        TransUnet { encoder, decoder }
    }
}

impl From<ModelDims> for TransUnetConfig {
    fn from(d: ModelDims) -> Self {
        TransUnetConfig::new(
            d.img_dim, d.in_channels, d.out_channels, d.head_num,
            d.mlp_dim, d.block_num, d.patch_dim, d.class_num,
        )
    }
}

#[derive(Module, Debug)]
pub struct TransUnet<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> TransUnet<B> {
    /// images: [batch, in_channels, S, S] → logits: [batch, class_num, S, S]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decoder.forward(self.encoder.forward(images))
    }

    /// Encoder half only, exposing the skip tensors
    pub fn encode(&self, images: Tensor<B, 4>) -> EncoderOutput<B> {
        self.encoder.forward(images)
    }
}
