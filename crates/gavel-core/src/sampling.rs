use crate::checks_api::Gate;
use crate::model::PipelineMode;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Decides whether a gated check runs for a given case. Decisions are
/// independent Bernoulli trials per case and per check kind; there is no
/// cross-case state and no quota, so clustering within a finite batch is
/// expected.
#[derive(Debug, Clone, Copy)]
pub struct SamplingController {
    mode: PipelineMode,
    sample_rate: f64,
}

impl SamplingController {
    pub fn new(mode: PipelineMode, sample_rate: f64) -> Self {
        Self { mode, sample_rate }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    /// The rng is injected per case so a fixed run seed reproduces the
    /// exact sampled subset regardless of scheduling order.
    pub fn decide(&self, gate: Gate, rng: &mut StdRng) -> bool {
        match gate {
            Gate::Always => true,
            Gate::Sampled => match self.mode {
                PipelineMode::Offline => true,
                PipelineMode::Online => rng.gen::<f64>() < self.sample_rate,
            },
            Gate::OfflineOnly => self.mode == PipelineMode::Offline,
        }
    }
}

/// Stable per-case seed: hash of run seed and case id. Order-independent,
/// so parallel execution and shuffling do not perturb sampling decisions.
pub fn case_seed(run_seed: u64, case_id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    run_seed.hash(&mut hasher);
    case_id.hash(&mut hasher);
    hasher.finish()
}
