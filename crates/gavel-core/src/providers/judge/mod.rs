use async_trait::async_trait;

pub mod fake;
pub mod openai;

/// LLM judge backend. Callers build the rubric prompt; the client only
/// completes it. Decoding is pinned to temperature 0 by every
/// implementation: the judge is the one residually nondeterministic check in
/// the system, and occasional pass/fail flips at temperature 0 are an
/// accepted bounded risk, never something to retry away.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
    fn name(&self) -> &'static str;
}
