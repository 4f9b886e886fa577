use serde::{Deserialize, Serialize};

/// Minimum cosine similarity between response and golden reference.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Contradiction probability at or above which the logic audit fails.
pub const DEFAULT_CONTRADICTION_THRESHOLD: f64 = 0.5;

/// Fraction of online-mode Tier A cases that receive the contradiction audit.
pub const DEFAULT_AUDIT_SAMPLE_RATE: f64 = 0.10;

/// Central tuning knobs. Thresholds live here, not at call sites, so they
/// can be adjusted per suite without touching check logic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_similarity")]
    pub similarity: f64,
    #[serde(default = "default_contradiction")]
    pub contradiction: f64,
}

fn default_similarity() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_contradiction() -> f64 {
    DEFAULT_CONTRADICTION_THRESHOLD
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            similarity: DEFAULT_SIMILARITY_THRESHOLD,
            contradiction: DEFAULT_CONTRADICTION_THRESHOLD,
        }
    }
}
