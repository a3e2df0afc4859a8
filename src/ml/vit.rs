// ============================================================
// Layer 5 — Vision Transformer
// ============================================================
// Turns a [batch, channels, h, w] feature map into a sequence
// of patch tokens and runs it through a stack of transformer
// encoder blocks.
//
//   feature map
//       │  b c (gx p) (gy p) → b (gx gy) (p p c)
//       ▼
//   patch tokens ── Linear ──► embeddings
//       │
//       ▼  prepend [CLS], add learned position embedding, dropout
//   block_num × TransformerBlock (post-norm)
//       │
//       ├── non-classification: drop [CLS], return all patch tokens
//       └── classification:     Linear head on [CLS]
//
// Inside TransUNet it runs with patch_dim = 1, so every pixel
// of the deepest CNN feature map becomes one token.

use burn::{
    module::Param,
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Initializer,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::gelu, Shape},
};

#[derive(Config, Debug)]
pub struct VitConfig {
    /// Side of the square input grid
    pub img_dim:       usize,
    pub in_channels:   usize,
    pub embedding_dim: usize,
    pub head_num:      usize,
    pub mlp_dim:       usize,
    pub block_num:     usize,
    pub patch_dim:     usize,
    #[config(default = false)]
    pub classification: bool,
    #[config(default = 1)]
    pub num_classes: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl VitConfig {
    /// Tokens per image (excluding [CLS])
    pub fn num_tokens(&self) -> usize {
        let grid = self.img_dim / self.patch_dim;
        grid * grid
    }

    /// Width of one flattened patch before projection
    pub fn token_dim(&self) -> usize {
        self.in_channels * self.patch_dim * self.patch_dim
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Vit<B> {
        let projection = LinearConfig::new(self.token_dim(), self.embedding_dim).init(device);

        let position_embedding = Initializer::Uniform { min: 0.0, max: 1.0 }
            .init([self.num_tokens() + 1, self.embedding_dim], device);
        let cls_token = Initializer::Normal { mean: 0.0, std: 1.0 }
            .init([1, 1, self.embedding_dim], device);

        let blocks = (0..self.block_num)
            .map(|_| self.build_block(device))
            .collect();

        let head = self
            .classification
            .then(|| LinearConfig::new(self.embedding_dim, self.num_classes).init(device));

        Vit {
            projection,
            position_embedding,
            cls_token,
            dropout: DropoutConfig::new(self.dropout).init(),
            blocks,
            head,
            patch_dim: self.patch_dim,
        }
    }

    fn build_block<B: Backend>(&self, device: &B::Device) -> TransformerBlock<B> {
        TransformerBlock {
            // No dropout on the attention weights themselves
            attention: MultiHeadAttentionConfig::new(self.embedding_dim, self.head_num)
                .with_dropout(0.0)
                .init(device),
            norm1:       LayerNormConfig::new(self.embedding_dim).init(device),
            mlp_linear1: LinearConfig::new(self.embedding_dim, self.mlp_dim).init(device),
            mlp_linear2: LinearConfig::new(self.mlp_dim, self.embedding_dim).init(device),
            norm2:       LayerNormConfig::new(self.embedding_dim).init(device),
            dropout:     DropoutConfig::new(self.dropout).init(),
        }
    }
}

// ─── Transformer encoder block ────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct TransformerBlock<B: Backend> {
    pub attention:   MultiHeadAttention<B>,
    pub norm1:       LayerNorm<B>,
    pub mlp_linear1: Linear<B>,
    pub mlp_linear2: Linear<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> TransformerBlock<B> {
    /// Unmasked self-attention over the whole sequence, [b, n, d] → [b, n, d]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn = self.attention.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn));

        let mlp = gelu(self.mlp_linear1.forward(x.clone()));
        let mlp = self.dropout.forward(self.mlp_linear2.forward(self.dropout.forward(mlp)));
        self.norm2.forward(x + mlp)
    }
}

// ─── Vision transformer ───────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct Vit<B: Backend> {
    pub projection:         Linear<B>,
    /// [tokens + 1, embedding_dim]
    pub position_embedding: Param<Tensor<B, 2>>,
    /// [1, 1, embedding_dim]
    pub cls_token:          Param<Tensor<B, 3>>,
    pub dropout:            Dropout,
    pub blocks:             Vec<TransformerBlock<B>>,
    /// Present only when built with `classification = true`
    pub head:               Option<Linear<B>>,
    pub patch_dim:          usize,
}

/// `b c (gx p) (gy p) -> b (gx gy) (p p c)`; tokens are row-major over the grid.
pub fn patchify<B: Backend>(x: Tensor<B, 4>, patch_dim: usize) -> Tensor<B, 3> {
    let [batch, channels, height, width] = x.dims();
    let (gx, gy) = (height / patch_dim, width / patch_dim);

    x.reshape([batch, channels, gx, patch_dim, gy, patch_dim])
        .permute([0, 2, 4, 3, 5, 1])
        .reshape([batch, gx * gy, patch_dim * patch_dim * channels])
}

impl<B: Backend> Vit<B> {
    /// Embed patches and run every transformer block; includes the [CLS] token.
    fn encode(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        let tokens = self.projection.forward(patchify(x, self.patch_dim));
        let [batch, _, dim] = tokens.dims();

        let cls = self.cls_token.val().expand(Shape::new([batch, 1, dim]));
        let x = Tensor::cat(vec![cls, tokens], 1);

        // Position embeddings for [CLS] plus as many patches as arrived
        let seq_len = x.dims()[1];
        let position_embedding = self.position_embedding.val();
        let [slots, _] = position_embedding.dims();
        assert!(
            seq_len <= slots,
            "{} patch tokens exceed the {} position embedding slots",
            seq_len - 1,
            slots - 1
        );
        let x = x + position_embedding.slice([0..seq_len, 0..dim]).unsqueeze::<3>();

        let mut x = self.dropout.forward(x);
        for block in &self.blocks {
            x = block.forward(x);
        }
        x
    }

    /// [b, c, h, w] → patch tokens [b, (h/p)·(w/p), embedding_dim]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        let x = self.encode(x);
        let [batch, seq_len, dim] = x.dims();
        x.slice([0..batch, 1..seq_len, 0..dim])
    }

    /// [b, c, h, w] → class logits [b, num_classes], or `None` when the
    /// transformer was built without a classification head.
    pub fn classify(&self, x: Tensor<B, 4>) -> Option<Tensor<B, 2>> {
        let head = self.head.as_ref()?;
        let x = self.encode(x);
        let [batch, _, dim] = x.dims();
        let cls = x.slice([0..batch, 0..1, 0..dim]).reshape([batch, dim]);
        Some(head.forward(cls))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn small_config() -> VitConfig {
        VitConfig::new(4, 8, 16, 2, 32, 2, 1)
    }

    #[test]
    fn test_token_counts() {
        assert_eq!(small_config().num_tokens(), 16);
        assert_eq!(small_config().token_dim(), 8);
        let patched = VitConfig::new(8, 3, 16, 2, 32, 1, 2);
        assert_eq!(patched.num_tokens(), 16);
        assert_eq!(patched.token_dim(), 12);
    }

    #[test]
    fn test_patchify_pixel_tokens_are_row_major() {
        let device = Default::default();
        // One channel, 2×2 grid holding 0, 1, 2, 3
        let x = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 2.0, 3.0], &device)
            .reshape([1, 1, 2, 2]);
        let tokens = patchify(x, 1);
        assert_eq!(tokens.dims(), [1, 4, 1]);
        let values = tokens.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_patchify_groups_patch_pixels_then_channels() {
        let device = Default::default();
        // Two channels (0.. and 100..), 2×2 image, one 2×2 patch
        let x = Tensor::<TestBackend, 1>::from_floats(
            [0.0, 1.0, 2.0, 3.0, 100.0, 101.0, 102.0, 103.0],
            &device,
        )
        .reshape([1, 2, 2, 2]);
        let tokens = patchify(x, 2);
        assert_eq!(tokens.dims(), [1, 1, 8]);
        let values = tokens.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 100.0, 1.0, 101.0, 2.0, 102.0, 3.0, 103.0]);
    }

    #[test]
    fn test_forward_returns_patch_tokens_only() {
        let device = Default::default();
        let vit = small_config().init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::ones([3, 8, 4, 4], &device);
        assert_eq!(vit.forward(x).dims(), [3, 16, 16]);
    }

    #[test]
    fn test_classify_requires_head() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::ones([2, 8, 4, 4], &device);

        let plain = small_config().init::<TestBackend>(&device);
        assert!(plain.classify(x.clone()).is_none());

        let classifier = small_config()
            .with_classification(true)
            .with_num_classes(5)
            .init::<TestBackend>(&device);
        let logits = classifier.classify(x).expect("head is present");
        assert_eq!(logits.dims(), [2, 5]);
    }

    #[test]
    #[should_panic(expected = "25 patch tokens exceed the 16 position embedding slots")]
    fn test_too_many_tokens_panics() {
        let device = Default::default();
        let vit = small_config().init::<TestBackend>(&device);
        // 5×5 grid = 25 tokens, position embedding holds 16 + 1
        let x = Tensor::<TestBackend, 4>::ones([1, 8, 5, 5], &device);
        let _ = vit.forward(x);
    }

    #[test]
    fn test_fewer_tokens_use_leading_position_embeddings() {
        let device = Default::default();
        let vit = small_config().init::<TestBackend>(&device);
        // 3×3 grid = 9 tokens against 16 slots
        let x = Tensor::<TestBackend, 4>::ones([2, 8, 3, 3], &device);
        assert_eq!(vit.forward(x).dims(), [2, 9, 16]);
    }

    #[test]
    fn test_attention_weights_have_no_dropout() {
        let device = Default::default();
        let vit = small_config().init::<TestBackend>(&device);
        for block in &vit.blocks {
            assert_eq!(block.attention.dropout.prob, 0.0);
            assert_eq!(block.dropout.prob, 0.1);
        }
    }
}
