//! Secondary language-model judge used by the score extractor's fallback
//! path. The judge is advisory only: every transport or model failure is
//! caught at the call site and treated as "no judge score".

use async_trait::async_trait;
use serde_json::json;

#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Ask the judge a free-form question and return its raw reply text.
    async fn ask(&self, question: &str) -> anyhow::Result<String>;

    fn judge_name(&self) -> &'static str;
}

/// Judge backed by a local Ollama chat endpoint.
pub struct OllamaJudge {
    pub model: String,
    pub endpoint: String,
    client: reqwest::Client,
}

impl OllamaJudge {
    pub fn new(model: String, endpoint: String) -> Self {
        Self {
            model,
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl JudgeClient for OllamaJudge {
    async fn ask(&self, question: &str) -> anyhow::Result<String> {
        let url = format!("{}/api/chat", self.endpoint.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": question }],
            "stream": false,
        });

        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            anyhow::bail!("ollama chat API error (status {}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("ollama chat response missing message content"))?
            .to_string();

        Ok(text)
    }

    fn judge_name(&self) -> &'static str {
        "ollama"
    }
}
