use async_trait::async_trait;
use gavel_core::checks_api::{Check, Gate};
use gavel_core::config::compile_pattern;
use gavel_core::model::{CheckKind, CheckResult, TestCase};

const EXCERPT_LEN: usize = 40;

/// Regex guardrail: every mandatory pattern must match the response, no
/// forbidden pattern may. Pure string evaluation, deterministic, no
/// providers; the one check that always runs.
pub struct GuardrailCheck;

#[async_trait]
impl Check for GuardrailCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Guardrail
    }

    fn gate(&self) -> Gate {
        Gate::Always
    }

    async fn evaluate(&self, case: &TestCase) -> anyhow::Result<CheckResult> {
        let response = &case.candidate_response;

        // Forbidden hits are reported before missing mandatory fields: a
        // safety violation must not be shadowed by a lower-severity
        // omission.
        for pattern in &case.forbidden_patterns {
            let re = compile_pattern(pattern)?;
            if let Some(m) = re.find(response) {
                return Ok(CheckResult::failed(
                    CheckKind::Guardrail,
                    None,
                    format!(
                        "forbidden pattern '{}' matched: \"{}\"",
                        pattern,
                        excerpt(response, m.start(), m.end())
                    ),
                ));
            }
        }

        for pattern in &case.mandatory_patterns {
            let re = compile_pattern(pattern)?;
            if !re.is_match(response) {
                return Ok(CheckResult::failed(
                    CheckKind::Guardrail,
                    None,
                    format!("missing mandatory pattern '{}'", pattern),
                ));
            }
        }

        Ok(CheckResult::passed(CheckKind::Guardrail, None, "ok"))
    }
}

fn excerpt(text: &str, start: usize, end: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(10)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let mut to = end;
    while to < text.len() && to - from < EXCERPT_LEN {
        to += 1;
    }
    while !text.is_char_boundary(to) {
        to += 1;
    }
    &text[from..to]
}
