use async_trait::async_trait;
use gavel_core::checks_api::{Check, Gate};
use gavel_core::embeddings::cosine_similarity;
use gavel_core::model::{CheckKind, CheckResult, TestCase};
use gavel_core::providers::embedder::Embedder;
use std::sync::Arc;

/// Bi-encoder similarity between candidate response and golden reference.
///
/// Known limitation, deliberately not worked around here: embeddings weight
/// lexical and topical overlap over polarity, so a statement and its
/// negation ("refund processed" / "refund not processed") can both clear the
/// threshold. The contradiction audit exists to catch exactly that.
pub struct SimilarityCheck {
    embedder: Arc<dyn Embedder>,
    threshold: f64,
}

impl SimilarityCheck {
    pub fn new(embedder: Arc<dyn Embedder>, threshold: f64) -> Self {
        Self { embedder, threshold }
    }
}

#[async_trait]
impl Check for SimilarityCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Similarity
    }

    fn gate(&self) -> Gate {
        Gate::Always
    }

    async fn evaluate(&self, case: &TestCase) -> anyhow::Result<CheckResult> {
        let response_vec = self.embedder.embed(&case.candidate_response).await?;
        let reference_vec = self.embedder.embed(&case.golden_reference).await?;
        let score = cosine_similarity(&response_vec, &reference_vec)?;

        let passed = score >= self.threshold;
        let detail = format!(
            "cosine {:.3} vs threshold {:.2} ({})",
            score,
            self.threshold,
            self.embedder.model_id()
        );
        Ok(if passed {
            CheckResult::passed(CheckKind::Similarity, Some(score), detail)
        } else {
            CheckResult::failed(CheckKind::Similarity, Some(score), detail)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::model::QueryCategory;
    use gavel_core::providers::embedder::fake::FakeEmbedder;

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
    async fn identical_embeddings_pass() {
        let embedder = Arc::new(FakeEmbedder::new("fake-model", vec![0.3, 0.4, 0.5]));
        let check = SimilarityCheck::new(embedder.clone(), 0.75);
        let r = check.evaluate(&case("a", "b")).await.unwrap();
        assert!(r.passed);
        assert!((r.score.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(embedder.calls(), 2);
    }

    #[tokio::test]
    async fn dissimilar_embeddings_fail_below_threshold() {
        let embedder = Arc::new(
            FakeEmbedder::new("fake-model", vec![1.0, 0.0])
                .with_vector("the reference", vec![0.0, 1.0]),
        );
        let check = SimilarityCheck::new(embedder, 0.75);
        let r = check.evaluate(&case("the response", "the reference")).await.unwrap();
        assert!(r.ran);
        assert!(!r.passed);
        assert!(r.score.unwrap().abs() < 1e-9);
    }

    #[tokio::test]
    async fn provider_error_propagates_for_hard_failure() {
        let check = SimilarityCheck::new(Arc::new(FakeEmbedder::unavailable("fake-model")), 0.75);
        // The router maps this error to ran=false, passed=false.
        assert!(check.evaluate(&case("a", "b")).await.is_err());
    }
}
