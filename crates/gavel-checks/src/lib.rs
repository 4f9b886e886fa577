use std::sync::Arc;

use gavel_core::checks_api::Check;
use gavel_core::providers::embedder::Embedder;
use gavel_core::providers::judge::JudgeClient;
use gavel_core::providers::nli::NliHandle;
use gavel_core::thresholds::Thresholds;

mod contradiction;
mod guardrail;
mod judge;
mod similarity;

pub use contradiction::ContradictionCheck;
pub use guardrail::GuardrailCheck;
pub use judge::JudgeCheck;
pub use similarity::SimilarityCheck;

/// Standard wiring: the guardrail plus the ordered per-tier pipelines.
/// Tier A: similarity (always) then the sampled contradiction audit.
/// Tier B: the offline-only judge.
pub fn standard_pipelines(
    embedder: Arc<dyn Embedder>,
    nli: Arc<NliHandle>,
    judge: Arc<dyn JudgeClient>,
    thresholds: Thresholds,
) -> (Arc<dyn Check>, Vec<Arc<dyn Check>>, Vec<Arc<dyn Check>>) {
    let guardrail: Arc<dyn Check> = Arc::new(GuardrailCheck);
    let tier_a: Vec<Arc<dyn Check>> = vec![
        Arc::new(SimilarityCheck::new(embedder, thresholds.similarity)),
        Arc::new(ContradictionCheck::new(nli, thresholds.contradiction)),
    ];
    let tier_b: Vec<Arc<dyn Check>> = vec![Arc::new(JudgeCheck::new(judge))];
    (guardrail, tier_a, tier_b)
}
