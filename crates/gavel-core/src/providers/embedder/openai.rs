use super::Embedder;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Bi-encoder over the OpenAI embeddings API. Each call embeds one text;
/// response and reference are embedded independently and compared by cosine.
pub struct OpenAIEmbedder {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl OpenAIEmbedder {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let resp = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .bearer_auth(&self.api_key)
            .json(&json!({
                "input": text,
                "model": self.model,
                "encoding_format": "float"
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI embeddings API error (status {}): {}", status, body);
        }

        let parsed: EmbeddingsResponse = resp.json().await?;
        let row = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("OpenAI embeddings response contained no data rows"))?;

        Ok(row.embedding)
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}
