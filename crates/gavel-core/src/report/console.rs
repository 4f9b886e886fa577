use crate::model::{CheckKind, Verdict};
use crate::report::RunArtifacts;

/// Per-check coverage is reported alongside pass/fail so a run where the
/// audits were all sampled out can never read as a 100% pass rate.
pub fn print_summary(artifacts: &RunArtifacts) {
    let mut pass = 0;
    let mut fail = 0;
    for v in &artifacts.verdicts {
        if v.overall_passed {
            pass += 1;
        } else {
            fail += 1;
        }
    }

    eprintln!(
        "Suite '{}' ({} mode, seed {}): pass={} fail={}",
        artifacts.suite, artifacts.mode, artifacts.order_seed, pass, fail
    );

    for kind in [
        CheckKind::Guardrail,
        CheckKind::Similarity,
        CheckKind::Contradiction,
        CheckKind::Judge,
    ] {
        let (ran, skipped, failed) = coverage(&artifacts.verdicts, kind);
        if ran + skipped == 0 {
            continue;
        }
        eprintln!(
            "  {:<13} ran={} skipped={} failed={}",
            kind.to_string(),
            ran,
            skipped,
            failed
        );
    }
}

pub fn print_verdict(v: &Verdict) {
    let status = if v.overall_passed { "PASS" } else { "FAIL" };
    eprintln!("[{}] {} (tier {})", status, v.case_id, v.tier);
    for c in &v.checks {
        let mark = if !c.ran && c.passed {
            "SKIP"
        } else if c.passed {
            "PASS"
        } else {
            "FAIL"
        };
        let score = c
            .score
            .map(|s| format!(" score={:.3}", s))
            .unwrap_or_default();
        eprintln!("    {:<13} {}{} {}", c.kind.to_string(), mark, score, c.detail);
    }
}

fn coverage(verdicts: &[Verdict], kind: CheckKind) -> (usize, usize, usize) {
    let mut ran = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for v in verdicts {
        if let Some(c) = v.check(kind) {
            if c.ran {
                ran += 1;
            } else {
                skipped += 1;
            }
            if !c.passed {
                failed += 1;
            }
        }
    }
    (ran, skipped, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckResult, PipelineMode, Tier};

    #[test]
    fn coverage_separates_ran_from_skipped() {
        let verdicts = vec![
            Verdict {
                case_id: "a".into(),
                tier: Tier::A,
                mode: PipelineMode::Online,
                overall_passed: true,
                checks: vec![CheckResult::skipped(CheckKind::Contradiction, "sampled out")],
                duration_ms: None,
            },
            Verdict {
                case_id: "b".into(),
                tier: Tier::A,
                mode: PipelineMode::Online,
                overall_passed: false,
                checks: vec![CheckResult::failed(
                    CheckKind::Contradiction,
                    Some(0.9),
                    "contradiction",
                )],
                duration_ms: None,
            },
        ];
        assert_eq!(coverage(&verdicts, CheckKind::Contradiction), (1, 1, 1));
    }
}
