use thiserror::Error;

/// Error taxonomy for a run. Per-case provider failures are folded into the
/// case's check results and never abort the batch; only configuration
/// problems are fatal before evaluation starts.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Network or model-load failure, including timeouts. Treated as a
    /// check failure for the affected case.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Judge responded but the response could not be parsed into the
    /// expected structured form. A JUDGE check failure, never a pass.
    #[error("malformed judge output: {0}")]
    MalformedJudgeOutput(String),

    /// A broken guardrail must never silently pass, so a malformed regex in
    /// a case definition is fatal at load time.
    #[error("invalid pattern '{pattern}' in case '{case_id}': {detail}")]
    InvalidPattern {
        case_id: String,
        pattern: String,
        detail: String,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl EvalError {
    pub fn config(msg: impl Into<String>) -> Self {
        EvalError::Config(msg.into())
    }
}
