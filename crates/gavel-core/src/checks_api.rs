use crate::model::{CheckKind, CheckResult, TestCase};
use async_trait::async_trait;

/// Gating rule attached to each check descriptor. The per-tier pipelines
/// are ordered lists of (check, gate) pairs, so adding a tier or a check
/// does not touch routing logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Runs on every case the pipeline reaches.
    Always,
    /// Bernoulli-sampled in online mode, full coverage offline.
    Sampled,
    /// Runs only in offline mode, never sampled online.
    OfflineOnly,
}

#[async_trait]
pub trait Check: Send + Sync {
    fn kind(&self) -> CheckKind;
    fn gate(&self) -> Gate;
    async fn evaluate(&self, case: &TestCase) -> anyhow::Result<CheckResult>;
}
