use super::JudgeClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted judge for tests: returns canned completions in order, errors
/// when the script runs out.
#[derive(Clone)]
pub struct FakeJudge {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeJudge {
    pub fn scripted(responses: Vec<&str>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(String::from).collect(),
            )),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JudgeClient for FakeJudge {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut resps = self.responses.lock().unwrap();
        if resps.is_empty() {
            anyhow::bail!("no more scripted judge responses");
        }
        Ok(resps.remove(0))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
