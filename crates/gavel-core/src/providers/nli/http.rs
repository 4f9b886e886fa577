use super::NliScorer;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// NLI cross-encoder served over an HTTP inference endpoint
/// (HuggingFace-style: a zero-shot entailment model returning per-label
/// scores for the premise/hypothesis pair).
pub struct HttpNli {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl HttpNli {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NliScorer for HttpNli {
    async fn contradiction(&self, premise: &str, hypothesis: &str) -> anyhow::Result<f64> {
        let mut req = self.client.post(&self.endpoint).json(&json!({
            "inputs": { "text": premise, "text_pair": hypothesis }
        }));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("NLI inference endpoint error (status {}): {}", status, body);
        }

        let labels: Vec<LabelScore> = resp.json().await?;
        let contradiction = labels
            .iter()
            .find(|l| l.label.eq_ignore_ascii_case("contradiction"))
            .ok_or_else(|| {
                anyhow::anyhow!("NLI response carried no 'contradiction' label score")
            })?;

        Ok(contradiction.score.clamp(0.0, 1.0))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
