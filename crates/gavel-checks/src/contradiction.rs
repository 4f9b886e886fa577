use async_trait::async_trait;
use gavel_core::checks_api::{Check, Gate};
use gavel_core::model::{CheckKind, CheckResult, TestCase};
use gavel_core::providers::nli::NliHandle;
use std::sync::Arc;

/// Cross-encoder logic audit. Premise is the golden reference, hypothesis
/// the candidate response; passes while the contradiction probability stays
/// below the threshold. The scorer is acquired lazily through the handle,
/// so a run where the audit is never sampled in never loads the model.
pub struct ContradictionCheck {
    nli: Arc<NliHandle>,
    threshold: f64,
}

impl ContradictionCheck {
    pub fn new(nli: Arc<NliHandle>, threshold: f64) -> Self {
        Self { nli, threshold }
    }
}

#[async_trait]
impl Check for ContradictionCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Contradiction
    }

    fn gate(&self) -> Gate {
        Gate::Sampled
    }

    async fn evaluate(&self, case: &TestCase) -> anyhow::Result<CheckResult> {
        let scorer = self.nli.get().await?;
        let score = scorer
            .contradiction(&case.golden_reference, &case.candidate_response)
            .await?;

        let passed = score < self.threshold;
        let detail = format!(
            "contradiction {:.3} vs threshold {:.2}",
            score, self.threshold
        );
        Ok(if passed {
            CheckResult::passed(CheckKind::Contradiction, Some(score), detail)
        } else {
            CheckResult::failed(CheckKind::Contradiction, Some(score), detail)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::model::QueryCategory;
    use gavel_core::providers::nli::{fake::FakeNli, NliScorer};

    fn case(response: &str, reference: &str) -> TestCase {
        TestCase {
            id: "tc".into(),
            intent: None,
            category: QueryCategory::Preset,
            user_query: "q".into(),
            candidate_response: response.into(),
            golden_reference: reference.into(),
            mandatory_patterns: vec![],
            forbidden_patterns: vec![],
            rubric: vec![],
        }
    }

    #[tokio::test]
    async fn low_contradiction_passes() {
        let check = ContradictionCheck::new(
            Arc::new(NliHandle::ready(Arc::new(FakeNli::constant(0.05)))),
            0.5,
        );
        let r = check
            .evaluate(&case("Refund processed", "Your refund has been processed"))
            .await
            .unwrap();
        assert!(r.passed);
    }

    #[tokio::test]
    async fn negation_detected_despite_topical_overlap() {
        let nli = FakeNli::constant(0.1).with_pair(
            "Refund processed",
            "Refund not processed",
            0.97,
        );
        let check = ContradictionCheck::new(Arc::new(NliHandle::ready(Arc::new(nli))), 0.5);
        let r = check
            .evaluate(&case("Refund not processed", "Refund processed"))
            .await
            .unwrap();
        assert!(r.ran);
        assert!(!r.passed);
        assert!(r.score.unwrap() > 0.9);
    }

    #[tokio::test]
    async fn scorer_acquired_on_first_evaluate_only() {
        let handle = Arc::new(NliHandle::new(|| async {
            Ok(Arc::new(FakeNli::constant(0.0)) as Arc<dyn NliScorer>)
        }));
        let check = ContradictionCheck::new(handle.clone(), 0.5);
        assert!(!handle.initialized());
        check.evaluate(&case("a", "b")).await.unwrap();
        assert!(handle.initialized());
        check.evaluate(&case("c", "d")).await.unwrap();
    }
}
