// ============================================================
// Layer 5 — Bilinear Upsampling (align_corners = true)
// ============================================================
// Resizes [batch, channels, h, w] to [batch, channels, h*s, w*s].
//
// With aligned corners the first and last pixels of input and
// output sit at the same position, and output index i samples
// the input at
//
//     src(i) = i * (in - 1) / (out - 1)
//
// Burn's bilinear interpolate already uses this mapping.

use burn::{
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

/// Upsample a 4-D tensor by an integer factor with bilinear,
/// corner-aligned interpolation.
pub fn upsample_bilinear_aligned<B: Backend>(x: Tensor<B, 4>, scale: usize) -> Tensor<B, 4> {
    let [_, _, height, width] = x.dims();
    interpolate(
        x,
        [height * scale, width * scale],
        InterpolateOptions::new(InterpolateMode::Bilinear),
    )
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_upsample_shape() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::zeros([2, 3, 4, 5], &device);
        assert_eq!(upsample_bilinear_aligned(x, 2).dims(), [2, 3, 8, 10]);
    }

    #[test]
    fn test_upsample_aligns_corners_and_interpolates_linearly() {
        let device = Default::default();
        // 2×2 ramp x + y scaled by 3; aligned corners give steps of 1
        let x = Tensor::<TestBackend, 1>::from_floats([0.0, 3.0, 3.0, 6.0], &device)
            .reshape([1, 1, 2, 2]);
        let y = upsample_bilinear_aligned(x, 2);
        assert_eq!(y.dims(), [1, 1, 4, 4]);

        let expected = Tensor::<TestBackend, 1>::from_floats(
            [
                0.0, 1.0, 2.0, 3.0,
                1.0, 2.0, 3.0, 4.0,
                2.0, 3.0, 4.0, 5.0,
                3.0, 4.0, 5.0, 6.0,
            ],
            &device,
        )
        .reshape([1, 1, 4, 4]);
        y.into_data().assert_approx_eq(&expected.into_data(), 4);
    }

    #[test]
    fn test_upsample_preserves_constant_images() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::ones([1, 2, 3, 3], &device).mul_scalar(7.0);
        let y = upsample_bilinear_aligned(x, 2);
        let expected = Tensor::<TestBackend, 4>::ones([1, 2, 6, 6], &device).mul_scalar(7.0);
        y.into_data().assert_approx_eq(&expected.into_data(), 4);
    }
}
