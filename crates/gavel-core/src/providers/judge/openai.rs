use super::JudgeClient;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Chat-completions judge. Temperature is not configurable: rubric scoring
/// must use deterministic decoding.
pub struct OpenAIJudge {
    model: String,
    api_key: String,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

impl OpenAIJudge {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            max_tokens,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl JudgeClient for OpenAIJudge {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": 0.0,
                "max_tokens": self.max_tokens,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI chat API error (status {}): {}", status, body);
        }

        let parsed: ChatResponse = resp.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("OpenAI chat response contained no choices"))?;

        Ok(choice.message.content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
