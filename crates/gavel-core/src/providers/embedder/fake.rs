use super::Embedder;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Test embedder returning canned vectors per text, with a call counter so
/// tests can assert how often the provider was actually hit.
#[derive(Clone)]
pub struct FakeEmbedder {
    model: String,
    calls: Arc<AtomicUsize>,
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    default_vec: Vec<f32>,
    fail: bool,
}

impl FakeEmbedder {
    pub fn new(model: &str, default_vec: Vec<f32>) -> Self {
        Self {
            model: model.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
            vectors: Arc::new(Mutex::new(HashMap::new())),
            default_vec,
            fail: false,
        }
    }

    /// Embedder whose every call fails, for provider-unavailable paths.
    pub fn unavailable(model: &str) -> Self {
        let mut e = Self::new(model, vec![1.0]);
        e.fail = true;
        e
    }

    pub fn with_vector(self, text: &str, vec: Vec<f32>) -> Self {
        self.vectors.lock().unwrap().insert(text.to_string(), vec);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("fake embedder configured to fail");
        }
        let vectors = self.vectors.lock().unwrap();
        Ok(vectors.get(text).cloned().unwrap_or_else(|| self.default_vec.clone()))
    }

    fn name(&self) -> &'static str {
        "fake"
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}
