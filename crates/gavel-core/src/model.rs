use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Query category pre-labeled upstream. Drives tier selection; the router
/// never infers intent on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryCategory {
    Preset,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
}

impl From<QueryCategory> for Tier {
    fn from(cat: QueryCategory) -> Self {
        match cat {
            QueryCategory::Preset => Tier::A,
            QueryCategory::Other => Tier::B,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Guardrail,
    Similarity,
    Contradiction,
    Judge,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckKind::Guardrail => "guardrail",
            CheckKind::Similarity => "similarity",
            CheckKind::Contradiction => "contradiction",
            CheckKind::Judge => "judge",
        };
        write!(f, "{}", s)
    }
}

/// ONLINE runs the cheap commit-time path with sampled audits; OFFLINE runs
/// full coverage. Read once at startup and passed into the router, never a
/// global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    #[default]
    Online,
    Offline,
}

impl FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(PipelineMode::Online),
            "offline" => Ok(PipelineMode::Offline),
            other => Err(format!(
                "unknown pipeline mode '{}' (expected 'online' or 'offline')",
                other
            )),
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineMode::Online => write!(f, "online"),
            PipelineMode::Offline => write!(f, "offline"),
        }
    }
}

/// One rubric criterion for judge scoring. Scores are on a 1-5 scale; a
/// response must meet `min_score` on every criterion to pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

fn default_weight() -> f64 {
    1.0
}

fn default_min_score() -> f64 {
    3.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub intent: Option<String>,
    pub category: QueryCategory,
    pub user_query: String,
    /// Text produced by the agent under test. The router consumes it as-is;
    /// driving the agent is the harness's job.
    pub candidate_response: String,
    #[serde(default)]
    pub golden_reference: String,
    #[serde(default)]
    pub mandatory_patterns: Vec<String>,
    #[serde(default)]
    pub forbidden_patterns: Vec<String>,
    #[serde(default)]
    pub rubric: Vec<RubricCriterion>,
}

impl TestCase {
    pub fn tier(&self) -> Tier {
        Tier::from(self.category)
    }
}

/// Outcome of a single check. `ran = false` means sampled out or gated off,
/// which is distinct from a failure. Owned by the verdict that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub ran: bool,
    pub score: Option<f64>,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn passed(kind: CheckKind, score: Option<f64>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            ran: true,
            score,
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn failed(kind: CheckKind, score: Option<f64>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            ran: true,
            score,
            passed: false,
            detail: detail.into(),
        }
    }

    /// Check did not execute for this case (sampling or mode gate).
    pub fn skipped(kind: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            ran: false,
            score: None,
            passed: true,
            detail: detail.into(),
        }
    }

    /// Provider could not be reached in time. A hard failure for the case:
    /// an unsampled check must never silently pass by being unavailable.
    pub fn unavailable(kind: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            ran: false,
            score: None,
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub case_id: String,
    pub tier: Tier,
    pub mode: PipelineMode,
    pub overall_passed: bool,
    pub checks: Vec<CheckResult>,
    pub duration_ms: Option<u64>,
}

impl Verdict {
    pub fn check(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_derived_from_category() {
        assert_eq!(Tier::from(QueryCategory::Preset), Tier::A);
        assert_eq!(Tier::from(QueryCategory::Other), Tier::B);
    }

    #[test]
    fn pipeline_mode_parses_case_insensitive() {
        assert_eq!("ONLINE".parse::<PipelineMode>().unwrap(), PipelineMode::Online);
        assert_eq!("offline".parse::<PipelineMode>().unwrap(), PipelineMode::Offline);
        assert!("nightly".parse::<PipelineMode>().is_err());
    }

    #[test]
    fn skipped_result_is_not_a_failure() {
        let r = CheckResult::skipped(CheckKind::Contradiction, "sampled out");
        assert!(!r.ran);
        assert!(r.passed);
        let u = CheckResult::unavailable(CheckKind::Similarity, "provider unavailable: timeout");
        assert!(!u.ran);
        assert!(!u.passed);
    }
}
