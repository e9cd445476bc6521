//! Drives one benchmark run end to end: expand the prompt sequence, walk it
//! through the backend strictly sequentially, then score and persist.
//!
//! The backend holds one conversational turn-state, so prompts go out one
//! at a time with a fixed pause in between for the platform to settle. A
//! failed interaction is recorded as the `NONE` sentinel and the walk
//! continues; skipping an element would shift every later response onto
//! the wrong scenario.

use crate::engine::reassemble;
use crate::judge::JudgeClient;
use crate::model::{EnhancementMethod, Exchange, ScenarioRecord, Tier, Variant};
use crate::prompt;
use crate::providers::chatbot::ChatbotBackend;
use crate::storage::{ConversationTable, COL_CHATBOT_RESPONSE};
use std::sync::Arc;
use std::time::Duration;

pub struct Runner {
    pub backend: Arc<dyn ChatbotBackend>,
    pub judge: Option<Arc<dyn JudgeClient>>,
    /// Settle time between consecutive prompts.
    pub pause: Duration,
}

impl Runner {
    /// Execute one run and append every row to `table`.
    ///
    /// `prior` is the recorded baseline conversation, required for
    /// proxy re-evaluation runs and ignored otherwise.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        tier: Tier,
        variant: Variant,
        method: EnhancementMethod,
        scenarios: &[ScenarioRecord],
        user_context: &[String],
        prior: Option<&ConversationTable>,
        table: &mut ConversationTable,
    ) -> anyhow::Result<()> {
        let prior_responses = match prior {
            Some(prior) => Some(prior.column_after_preamble(COL_CHATBOT_RESPONSE)?),
            None => None,
        };

        let prompts = prompt::expand(
            scenarios,
            method,
            tier,
            user_context,
            prior_responses.as_deref(),
        )?;
        tracing::info!(
            backend = self.backend.backend_name(),
            tier = tier.number(),
            variant = variant.number(),
            method = method.label(),
            prompts = prompts.len(),
            "starting benchmark run"
        );

        let exchanges = self.collect_exchanges(&prompts).await;
        reassemble::write_rows(
            table,
            scenarios,
            &exchanges,
            method,
            tier,
            variant,
            self.judge.as_deref(),
        )
        .await?;

        tracing::info!(rows = table.row_count(), "benchmark run completed");
        Ok(())
    }

    async fn collect_exchanges(&self, prompts: &[String]) -> Vec<Exchange> {
        let mut exchanges = Vec::with_capacity(prompts.len());
        for (idx, prompt) in prompts.iter().enumerate() {
            tracing::info!(prompt = idx + 1, total = prompts.len(), "chatbot interaction started");
            match self.backend.send_message(prompt).await {
                Ok(response) => {
                    tracing::info!(prompt = idx + 1, "chatbot interaction succeeded");
                    exchanges.push(Exchange {
                        prompt: prompt.clone(),
                        response,
                    });
                }
                Err(e) => {
                    tracing::warn!(prompt = idx + 1, "chatbot interaction failed: {e}");
                    exchanges.push(Exchange::failed(prompt.clone()));
                }
            }
            if idx + 1 < prompts.len() && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }
        exchanges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend double: replays canned responses, erroring on demand.
    struct ScriptedBackend {
        responses: Mutex<Vec<anyhow::Result<String>>>,
    }

    #[async_trait]
    impl ChatbotBackend for ScriptedBackend {
        async fn send_message(&self, _prompt: &str) -> anyhow::Result<String> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                anyhow::bail!("no more scripted responses");
            }
            responses.remove(0)
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn failed_interactions_keep_sequence_alignment() {
        let backend = ScriptedBackend {
            responses: Mutex::new(vec![
                Ok("first".to_string()),
                Err(anyhow::anyhow!("connection reset")),
                Ok("third".to_string()),
            ]),
        };
        let runner = Runner {
            backend: Arc::new(backend),
            judge: None,
            pause: Duration::ZERO,
        };

        let prompts: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let exchanges = runner.collect_exchanges(&prompts).await;

        assert_eq!(exchanges.len(), 3);
        assert_eq!(exchanges[0].response, "first");
        assert!(exchanges[1].is_failed());
        assert_eq!(exchanges[1].prompt, "b");
        assert_eq!(exchanges[2].response, "third");
    }
}
