use super::ChatbotBackend;
use async_trait::async_trait;
use serde_json::json;

const API_URL: &str = "https://api.kindroid.ai/v1/send-message";

/// Kindroid chat adapter, bound to one Kin id. The API replies with the
/// message text as a plain body rather than a JSON envelope.
pub struct KindroidClient {
    pub api_key: String,
    pub ai_id: String,
    client: reqwest::Client,
}

impl KindroidClient {
    pub fn new(api_key: String, ai_id: String) -> Self {
        Self {
            api_key,
            ai_id,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatbotBackend for KindroidClient {
    async fn send_message(&self, prompt: &str) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({ "ai_id": self.ai_id, "message": prompt }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            anyhow::bail!("kindroid API error (status {}): {}", status, error_text);
        }

        Ok(resp.text().await?)
    }

    fn backend_name(&self) -> &'static str {
        "kindroid"
    }
}
