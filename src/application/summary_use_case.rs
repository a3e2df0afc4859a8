// ============================================================
// Layer 2 — SummaryUseCase
// ============================================================
// Describes a configuration without running it: the shape of
// every stage and how many parameters each component holds.

use anyhow::Result;

use crate::application::model_source::ModelSource;
use crate::domain::shape_plan::ShapePlan;
use crate::ml::runner::{count_params, ParamCounts};

pub struct ModelSummary {
    pub plan:   ShapePlan,
    pub params: ParamCounts,
}

pub struct SummaryUseCase {
    source:     ModelSource,
    batch_size: usize,
}

impl SummaryUseCase {
    pub fn new(source: ModelSource, batch_size: usize) -> Self {
        Self { source, batch_size }
    }

    pub fn execute(&self) -> Result<ModelSummary> {
        let cfg = self.source.resolve(None)?;
        let plan = ShapePlan::new(&cfg.dims(), self.batch_size);
        let params = count_params(&cfg);
        Ok(ModelSummary { plan, params })
    }
}
