// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// and the checkpoint store in infra.
//
// What's in this layer, leaf-first:
//
//   upsample.rs — bilinear ×s upsampling with aligned corners
//   blocks.rs   — EncoderBottleneck / DecoderBottleneck
//   vit.rs      — vision transformer over patch tokens
//   encoder.rs  — stem + 3 bottlenecks + ViT + projection
//   decoder.rs  — 4 upsampling stages + 1×1 class head
//   model.rs    — TransUnet = Decoder(Encoder(x))
//   runner.rs   — picks a concrete backend and runs the model
//
// Reference: Chen et al. (2021) TransUNet
//            Dosovitskiy et al. (2021) An Image is Worth 16x16 Words
//            Burn Book §3 (Building Blocks)

pub mod upsample;

/// Convolutional encoder/decoder blocks
pub mod blocks;

/// Vision transformer
pub mod vit;

pub mod encoder;

pub mod decoder;

/// Full TransUNet model and its config
pub mod model;

/// Backend dispatch for the CLI commands
pub mod runner;
