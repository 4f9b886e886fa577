use crate::checks_api::{Check, Gate};
use crate::errors::EvalError;
use crate::model::{CheckResult, PipelineMode, TestCase, Tier, Verdict};
use crate::report::RunArtifacts;
use crate::sampling::{case_seed, SamplingController};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

#[derive(Debug, Clone)]
pub struct RouterPolicy {
    pub parallel: usize,
    pub provider_timeout: Duration,
}

impl Default for RouterPolicy {
    fn default() -> Self {
        Self {
            parallel: 4,
            provider_timeout: Duration::from_secs(30),
        }
    }
}

/// Orchestrates one verdict per case: guardrail first, then the tier's
/// ordered check pipeline, each entry gated by the sampling controller.
/// Holds no per-case state; cases are evaluated independently and verdicts
/// are never cached across runs.
pub struct Router {
    pub suite: String,
    pub guardrail: Arc<dyn Check>,
    pub tier_a: Vec<Arc<dyn Check>>,
    pub tier_b: Vec<Arc<dyn Check>>,
    pub sampler: SamplingController,
    pub seed: u64,
    pub policy: RouterPolicy,
}

/// A missing seed still needs to be pinned down so the sampled subset can be
/// replayed; generate one and log it.
pub fn resolve_seed(configured: Option<u64>) -> u64 {
    match configured {
        Some(s) => s,
        None => {
            let s = rand::random();
            tracing::info!(seed = s, "no seed provided, generated one for this run");
            s
        }
    }
}

impl Router {
    pub async fn run_batch(&self, cases: &[TestCase]) -> anyhow::Result<RunArtifacts> {
        let sem = Arc::new(Semaphore::new(self.policy.parallel.max(1)));
        let mut join_set = JoinSet::new();
        let mut in_flight = HashMap::new();

        for case in cases.iter() {
            let permit = sem.clone().acquire_owned().await?;
            let this = self.clone_for_task();
            let case = case.clone();
            let meta = (case.id.clone(), case.tier());
            let handle = join_set.spawn(async move {
                let _permit = permit;
                this.evaluate_case(&case).await
            });
            in_flight.insert(handle.id(), meta);
        }

        let mut verdicts = Vec::with_capacity(cases.len());
        while let Some(res) = join_set.join_next_with_id().await {
            // A panicked task costs only its own case, which still gets a
            // failed placeholder so the artifact stays one verdict per case.
            match res {
                Ok((id, v)) => {
                    in_flight.remove(&id);
                    verdicts.push(v);
                }
                Err(e) => {
                    tracing::error!(error = %e, "case task failed");
                    if let Some((case_id, tier)) = in_flight.remove(&e.id()) {
                        verdicts.push(Verdict {
                            case_id,
                            tier,
                            mode: self.sampler.mode(),
                            overall_passed: false,
                            checks: Vec::new(),
                            duration_ms: None,
                        });
                    }
                }
            }
        }

        // Completion order is nondeterministic under parallelism; sort for
        // stable artifacts.
        verdicts.sort_by(|a, b| a.case_id.cmp(&b.case_id));

        Ok(RunArtifacts {
            suite: self.suite.clone(),
            mode: self.sampler.mode(),
            verdicts,
            order_seed: self.seed,
        })
    }

    pub async fn evaluate_case(&self, case: &TestCase) -> Verdict {
        let start = Instant::now();
        let tier = case.tier();
        if let Some(intent) = &case.intent {
            tracing::debug!(case = %case.id, %tier, intent = %intent, "evaluating case");
        } else {
            tracing::debug!(case = %case.id, %tier, "evaluating case");
        }

        let mut rng = StdRng::seed_from_u64(case_seed(self.seed, &case.id));
        let mut checks = Vec::new();

        // Guardrail runs unconditionally; it encodes safety rules and is
        // the one check that is never sampled out.
        let guard = self.run_check(self.guardrail.as_ref(), case).await;
        let guard_passed = guard.passed;
        checks.push(guard);

        let pipeline = match tier {
            Tier::A => &self.tier_a,
            Tier::B => &self.tier_b,
        };

        if guard_passed {
            for check in pipeline {
                if self.sampler.decide(check.gate(), &mut rng) {
                    checks.push(self.run_check(check.as_ref(), case).await);
                } else {
                    checks.push(CheckResult::skipped(check.kind(), skip_reason(check.gate())));
                }
            }
        } else {
            // Short-circuit: a known hard violation already fails the case,
            // so the semantic checks are not paid for.
            for check in pipeline {
                checks.push(CheckResult::skipped(check.kind(), "skipped: guardrail failed"));
            }
        }

        let overall_passed = checks.iter().all(|c| c.passed);

        Verdict {
            case_id: case.id.clone(),
            tier,
            mode: self.sampler.mode(),
            overall_passed,
            checks,
            duration_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    async fn run_check(&self, check: &dyn Check, case: &TestCase) -> CheckResult {
        let err = match timeout(self.policy.provider_timeout, check.evaluate(case)).await {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => {
                tracing::warn!(case = %case.id, kind = %check.kind(), error = %e, "check errored");
                EvalError::ProviderUnavailable(e.to_string())
            }
            Err(_) => EvalError::ProviderUnavailable(format!(
                "timed out after {}s",
                self.policy.provider_timeout.as_secs()
            )),
        };
        CheckResult::unavailable(check.kind(), err.to_string())
    }

    fn clone_for_task(&self) -> Router {
        Router {
            suite: self.suite.clone(),
            guardrail: self.guardrail.clone(),
            tier_a: self.tier_a.clone(),
            tier_b: self.tier_b.clone(),
            sampler: self.sampler,
            seed: self.seed,
            policy: self.policy.clone(),
        }
    }
}

fn skip_reason(gate: Gate) -> &'static str {
    match gate {
        Gate::Always => "skipped",
        Gate::Sampled => "skipped: sampled out",
        Gate::OfflineOnly => "skipped: online mode",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks_api::{Check, Gate};
    use crate::model::{CheckKind, QueryCategory};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedCheck {
        kind: CheckKind,
        gate: Gate,
        passed: bool,
        calls: AtomicUsize,
        slow: bool,
        error: bool,
    }

    impl ScriptedCheck {
        fn passing(kind: CheckKind, gate: Gate) -> Self {
            Self {
                kind,
                gate,
                passed: true,
                calls: AtomicUsize::new(0),
                slow: false,
                error: false,
            }
        }

        fn failing(kind: CheckKind, gate: Gate) -> Self {
            Self {
                passed: false,
                ..Self::passing(kind, gate)
            }
        }
    }

    #[async_trait]
    impl Check for ScriptedCheck {
        fn kind(&self) -> CheckKind {
            self.kind
        }

        fn gate(&self) -> Gate {
            self.gate
        }

        async fn evaluate(&self, _case: &TestCase) -> anyhow::Result<CheckResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.error {
                anyhow::bail!("scripted provider error");
            }
            if self.passed {
                Ok(CheckResult::passed(self.kind, Some(1.0), "ok"))
            } else {
                Ok(CheckResult::failed(self.kind, Some(0.0), "scripted failure"))
            }
        }
    }

    fn case(id: &str, category: QueryCategory) -> TestCase {
        TestCase {
            id: id.into(),
            intent: None,
            category,
            user_query: "query".into(),
            candidate_response: "response".into(),
            golden_reference: "reference".into(),
            mandatory_patterns: vec![],
            forbidden_patterns: vec![],
            rubric: vec![],
        }
    }

    fn router(
        mode: PipelineMode,
        guardrail: Arc<dyn Check>,
        tier_a: Vec<Arc<dyn Check>>,
        tier_b: Vec<Arc<dyn Check>>,
    ) -> Router {
        Router {
            suite: "router-contract".into(),
            guardrail,
            tier_a,
            tier_b,
            sampler: SamplingController::new(mode, 0.10),
            seed: 1234,
            policy: RouterPolicy {
                parallel: 2,
                provider_timeout: Duration::from_millis(200),
            },
        }
    }

    #[tokio::test]
    async fn preset_classifies_tier_a_and_other_tier_b() {
        let r = router(
            PipelineMode::Offline,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![Arc::new(ScriptedCheck::passing(
                CheckKind::Similarity,
                Gate::Always,
            ))],
            vec![Arc::new(ScriptedCheck::passing(
                CheckKind::Judge,
                Gate::OfflineOnly,
            ))],
        );
        let a = r.evaluate_case(&case("a", QueryCategory::Preset)).await;
        assert_eq!(a.tier, Tier::A);
        assert!(a.check(CheckKind::Similarity).is_some());
        assert!(a.check(CheckKind::Judge).is_none());

        let b = r.evaluate_case(&case("b", QueryCategory::Other)).await;
        assert_eq!(b.tier, Tier::B);
        assert!(b.check(CheckKind::Judge).is_some());
        assert!(b.check(CheckKind::Similarity).is_none());
    }

    #[tokio::test]
    async fn guardrail_failure_short_circuits_everything() {
        let similarity = Arc::new(ScriptedCheck::passing(CheckKind::Similarity, Gate::Always));
        let contradiction = Arc::new(ScriptedCheck::passing(
            CheckKind::Contradiction,
            Gate::Sampled,
        ));
        let r = router(
            PipelineMode::Offline,
            Arc::new(ScriptedCheck::failing(CheckKind::Guardrail, Gate::Always)),
            vec![similarity.clone(), contradiction.clone()],
            vec![],
        );

        let v = r.evaluate_case(&case("a", QueryCategory::Preset)).await;
        assert!(!v.overall_passed);
        assert!(!v.check(CheckKind::Similarity).unwrap().ran);
        assert!(!v.check(CheckKind::Contradiction).unwrap().ran);
        assert_eq!(similarity.calls.load(Ordering::SeqCst), 0);
        assert_eq!(contradiction.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tier_b_online_is_guardrail_only() {
        let judge = Arc::new(ScriptedCheck::failing(CheckKind::Judge, Gate::OfflineOnly));
        let r = router(
            PipelineMode::Online,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![],
            vec![judge.clone()],
        );

        let v = r.evaluate_case(&case("b", QueryCategory::Other)).await;
        // Accepted coverage gap: the judge would fail, but online mode never
        // consults it, so the guardrail alone decides.
        assert!(v.overall_passed);
        assert!(!v.check(CheckKind::Judge).unwrap().ran);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tier_b_offline_judge_decides() {
        let r = router(
            PipelineMode::Offline,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![],
            vec![Arc::new(ScriptedCheck::failing(
                CheckKind::Judge,
                Gate::OfflineOnly,
            ))],
        );
        let v = r.evaluate_case(&case("b", QueryCategory::Other)).await;
        assert!(!v.overall_passed);
        assert!(v.check(CheckKind::Judge).unwrap().ran);
    }

    #[tokio::test]
    async fn check_error_fails_case_without_aborting_batch() {
        let broken = Arc::new(ScriptedCheck {
            error: true,
            ..ScriptedCheck::passing(CheckKind::Similarity, Gate::Always)
        });
        let r = router(
            PipelineMode::Online,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![broken],
            vec![],
        );

        let cases = vec![case("a", QueryCategory::Preset), case("b", QueryCategory::Other)];
        let artifacts = r.run_batch(&cases).await.unwrap();
        assert_eq!(artifacts.verdicts.len(), 2);

        let a = &artifacts.verdicts[0];
        assert!(!a.overall_passed);
        let sim = a.check(CheckKind::Similarity).unwrap();
        assert!(!sim.ran);
        assert!(!sim.passed);
        assert_eq!(
            sim.detail,
            EvalError::ProviderUnavailable("scripted provider error".into()).to_string()
        );

        // The sibling case is unaffected.
        assert!(artifacts.verdicts[1].overall_passed);
    }

    struct PanickyCheck;

    #[async_trait]
    impl Check for PanickyCheck {
        fn kind(&self) -> CheckKind {
            CheckKind::Similarity
        }

        fn gate(&self) -> Gate {
            Gate::Always
        }

        async fn evaluate(&self, case: &TestCase) -> anyhow::Result<CheckResult> {
            if case.id == "b" {
                panic!("scripted panic");
            }
            Ok(CheckResult::passed(CheckKind::Similarity, Some(1.0), "ok"))
        }
    }

    #[tokio::test]
    async fn panicked_case_yields_failed_placeholder_verdict() {
        let r = router(
            PipelineMode::Online,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![Arc::new(PanickyCheck)],
            vec![],
        );
        let cases = vec![
            case("a", QueryCategory::Preset),
            case("b", QueryCategory::Preset),
            case("c", QueryCategory::Preset),
        ];
        let artifacts = r.run_batch(&cases).await.unwrap();
        assert_eq!(artifacts.verdicts.len(), 3, "one verdict per input case");

        let b = artifacts
            .verdicts
            .iter()
            .find(|v| v.case_id == "b")
            .unwrap();
        assert!(!b.overall_passed);
        assert!(b.checks.is_empty());
        assert!(artifacts
            .verdicts
            .iter()
            .filter(|v| v.case_id != "b")
            .all(|v| v.overall_passed));
    }

    #[tokio::test]
    async fn slow_provider_times_out_as_unavailable() {
        let slow = Arc::new(ScriptedCheck {
            slow: true,
            ..ScriptedCheck::passing(CheckKind::Similarity, Gate::Always)
        });
        let r = router(
            PipelineMode::Online,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![slow],
            vec![],
        );

        let v = r.evaluate_case(&case("a", QueryCategory::Preset)).await;
        assert!(!v.overall_passed);
        let sim = v.check(CheckKind::Similarity).unwrap();
        assert!(!sim.ran);
        assert!(sim.detail.contains("timed out"));
    }

    #[tokio::test]
    async fn sampling_reproducible_and_converges_online() {
        let contradiction = Arc::new(ScriptedCheck::passing(
            CheckKind::Contradiction,
            Gate::Sampled,
        ));
        let r = router(
            PipelineMode::Online,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![contradiction],
            vec![],
        );

        let cases: Vec<TestCase> = (0..2000)
            .map(|i| case(&format!("case-{:04}", i), QueryCategory::Preset))
            .collect();
        let first = r.run_batch(&cases).await.unwrap();
        let second = r.run_batch(&cases).await.unwrap();

        let sampled = |arts: &RunArtifacts| -> Vec<String> {
            arts.verdicts
                .iter()
                .filter(|v| v.check(CheckKind::Contradiction).unwrap().ran)
                .map(|v| v.case_id.clone())
                .collect()
        };
        let first_subset = sampled(&first);
        assert_eq!(first_subset, sampled(&second));

        let fraction = first_subset.len() as f64 / cases.len() as f64;
        assert!(
            (fraction - 0.10).abs() < 0.03,
            "fraction {} outside tolerance",
            fraction
        );
    }

    #[tokio::test]
    async fn offline_runs_every_audit() {
        let r = router(
            PipelineMode::Offline,
            Arc::new(ScriptedCheck::passing(CheckKind::Guardrail, Gate::Always)),
            vec![Arc::new(ScriptedCheck::passing(
                CheckKind::Contradiction,
                Gate::Sampled,
            ))],
            vec![],
        );
        let cases: Vec<TestCase> = (0..50)
            .map(|i| case(&format!("case-{:02}", i), QueryCategory::Preset))
            .collect();
        let artifacts = r.run_batch(&cases).await.unwrap();
        assert!(artifacts
            .verdicts
            .iter()
            .all(|v| v.check(CheckKind::Contradiction).unwrap().ran));
    }
}
