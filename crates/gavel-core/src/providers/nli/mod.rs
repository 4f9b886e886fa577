use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub mod fake;
pub mod http;

/// Cross-encoder contradiction scoring. Convention, fixed across the
/// codebase: premise is the golden reference, hypothesis is the candidate
/// response.
#[async_trait]
pub trait NliScorer: Send + Sync {
    /// Contradiction probability in [0, 1].
    async fn contradiction(&self, premise: &str, hypothesis: &str) -> anyhow::Result<f64>;
    fn name(&self) -> &'static str;
}

type NliFactory = Box<
    dyn Fn() -> Pin<Box<dyn Future<Output = anyhow::Result<Arc<dyn NliScorer>>> + Send>>
        + Send
        + Sync,
>;

/// Lazy handle around the NLI scorer. The model is heavy, so it is acquired
/// the first time an audit is actually sampled in, once per process; the
/// OnceCell guard keeps concurrent first-uses from double-initializing.
pub struct NliHandle {
    cell: OnceCell<Arc<dyn NliScorer>>,
    factory: NliFactory,
}

impl NliHandle {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<dyn NliScorer>>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(move || Box::pin(factory())),
        }
    }

    /// Handle that is already initialized; used by tests and by callers that
    /// pay the acquisition cost up front.
    pub fn ready(scorer: Arc<dyn NliScorer>) -> Self {
        let cell = OnceCell::new();
        cell.set(scorer).ok();
        Self {
            cell,
            factory: Box::new(|| {
                Box::pin(async {
                    Err::<Arc<dyn NliScorer>, anyhow::Error>(anyhow::anyhow!(
                        "nli scorer already initialized"
                    ))
                })
            }),
        }
    }

    pub async fn get(&self) -> anyhow::Result<&Arc<dyn NliScorer>> {
        self.cell
            .get_or_try_init(|| {
                tracing::info!("acquiring NLI model for contradiction audit (first use)");
                (self.factory)()
            })
            .await
    }

    pub fn initialized(&self) -> bool {
        self.cell.initialized()
    }
}
