use super::ChatbotBackend;
use async_trait::async_trait;
use serde_json::json;

const API_BASE: &str = "https://api.nomi.ai/v1";

/// Nomi.ai chat adapter, bound to one Nomi id.
pub struct NomiClient {
    pub api_key: String,
    pub nomi_id: String,
    client: reqwest::Client,
}

impl NomiClient {
    pub fn new(api_key: String, nomi_id: String) -> Self {
        Self {
            api_key,
            nomi_id,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatbotBackend for NomiClient {
    async fn send_message(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/nomis/{}/chat", API_BASE, self.nomi_id);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&json!({ "messageText": prompt }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            anyhow::bail!("nomi.ai chat API error (status {}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/replyMessage/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("nomi.ai response missing reply text"))?
            .to_string();

        Ok(text)
    }

    fn backend_name(&self) -> &'static str {
        "nomi_ai"
    }
}
