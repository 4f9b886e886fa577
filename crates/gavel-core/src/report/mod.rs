pub mod console;
pub mod json;

use crate::model::{PipelineMode, Verdict};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifacts {
    pub suite: String,
    pub mode: PipelineMode,
    pub verdicts: Vec<Verdict>,
    /// Seed the sampling decisions were derived from; logging it makes the
    /// sampled subset reproducible after the fact.
    pub order_seed: u64,
}

impl RunArtifacts {
    pub fn any_failed(&self) -> bool {
        self.verdicts.iter().any(|v| !v.overall_passed)
    }
}
