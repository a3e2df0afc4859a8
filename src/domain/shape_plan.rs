// ============================================================
// Layer 3 — Shape Plan
// ============================================================
// Pure arithmetic: which shape every stage of TransUNet
// produces for a given set of dimensions and batch size.
//
// Strided convolutions here (7×7/pad 3, 3×3/pad 1, 1×1/pad 0,
// all stride 2) produce ceil(n / 2) outputs, so the plan uses
// the same rounding the tensors will.
//
// Used by the `summary` command and by tests that compare the
// real tensors against the expected layout.

use std::fmt;

use crate::domain::dims::{ModelDims, PROJECTION_CHANNELS};

/// Output shape of one named stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageShape {
    pub name:  &'static str,
    pub shape: Vec<usize>,
}

impl StageShape {
    fn new(name: &'static str, shape: impl Into<Vec<usize>>) -> Self {
        Self { name, shape: shape.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePlan {
    pub stages: Vec<StageShape>,
}

fn halve(n: usize) -> usize {
    n.div_ceil(2)
}

impl ShapePlan {
    pub fn new(dims: &ModelDims, batch: usize) -> Self {
        let oc = dims.out_channels;

        let s1 = halve(dims.img_dim);
        let s2 = halve(s1);
        let s3 = halve(s2);
        let s4 = halve(s3);
        let grid = dims.vit_grid();

        let stages = vec![
            StageShape::new("input",       [batch, dims.in_channels, dims.img_dim, dims.img_dim]),
            StageShape::new("x1 (stem)",   [batch, oc,       s1, s1]),
            StageShape::new("x2",          [batch, oc * 2,   s2, s2]),
            StageShape::new("x3",          [batch, oc * 4,   s3, s3]),
            StageShape::new("bottleneck",  [batch, oc * 8,   s4, s4]),
            StageShape::new("tokens",      [batch, s4 * s4,  dims.embedding_dim()]),
            StageShape::new("projection",  [batch, PROJECTION_CHANNELS, grid, grid]),
            StageShape::new("decoder1",    [batch, oc * 2,   grid * 2,  grid * 2]),
            StageShape::new("decoder2",    [batch, oc,       grid * 4,  grid * 4]),
            StageShape::new("decoder3",    [batch, oc / 2,   grid * 8,  grid * 8]),
            StageShape::new("decoder4",    [batch, oc / 8,   grid * 16, grid * 16]),
            StageShape::new("logits",      [batch, dims.class_num, grid * 16, grid * 16]),
        ];

        Self { stages }
    }

    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Option<&[usize]> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.shape.as_slice())
    }

    pub fn output(&self) -> &[usize] {
        self.stages
            .last()
            .map(|s| s.shape.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Display for ShapePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "  {:<12} {:?}", stage.name, stage.shape)?;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_plan() {
        let plan = ShapePlan::new(&ModelDims::default(), 4);
        assert_eq!(plan.stage("x1 (stem)"),  Some(&[4, 128, 64, 64][..]));
        assert_eq!(plan.stage("x2"),         Some(&[4, 256, 32, 32][..]));
        assert_eq!(plan.stage("x3"),         Some(&[4, 512, 16, 16][..]));
        assert_eq!(plan.stage("tokens"),     Some(&[4, 64, 1024][..]));
        assert_eq!(plan.stage("projection"), Some(&[4, 512, 8, 8][..]));
        assert_eq!(plan.output(), &[4, 1, 128, 128]);
    }

    #[test]
    fn test_output_matches_input_resolution() {
        let dims = ModelDims { img_dim: 64, class_num: 5, ..ModelDims::default() };
        let plan = ShapePlan::new(&dims, 2);
        assert_eq!(plan.output(), &[2, 5, 64, 64]);
    }

    #[test]
    fn test_odd_image_rounds_up_like_strided_conv() {
        let dims = ModelDims { img_dim: 100, ..ModelDims::default() };
        let plan = ShapePlan::new(&dims, 1);
        // 100 → 50 → 25 → 13 → 7, but the reshape expects 100 / 16 = 6
        assert_eq!(plan.stage("bottleneck"), Some(&[1, 1024, 7, 7][..]));
        assert_eq!(plan.stage("projection"), Some(&[1, 512, 6, 6][..]));
    }

    #[test]
    fn test_display_lists_every_stage() {
        let plan = ShapePlan::new(&ModelDims::default(), 1);
        let text = plan.to_string();
        assert_eq!(text.lines().count(), plan.stages.len());
        assert!(text.contains("logits"));
    }
}
