use super::NliScorer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FakeNli {
    calls: Arc<AtomicUsize>,
    scores: Arc<Mutex<HashMap<(String, String), f64>>>,
    default_score: f64,
    fail: bool,
}

impl FakeNli {
    /// Scorer returning the same contradiction probability for every pair.
    pub fn constant(score: f64) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            scores: Arc::new(Mutex::new(HashMap::new())),
            default_score: score,
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        let mut s = Self::constant(0.0);
        s.fail = true;
        s
    }

    pub fn with_pair(self, premise: &str, hypothesis: &str, score: f64) -> Self {
        self.scores
            .lock()
            .unwrap()
            .insert((premise.to_string(), hypothesis.to_string()), score);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NliScorer for FakeNli {
    async fn contradiction(&self, premise: &str, hypothesis: &str) -> anyhow::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("fake nli scorer configured to fail");
        }
        let scores = self.scores.lock().unwrap();
        Ok(scores
            .get(&(premise.to_string(), hypothesis.to_string()))
            .copied()
            .unwrap_or(self.default_score))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
