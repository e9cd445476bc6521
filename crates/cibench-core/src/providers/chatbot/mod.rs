//! Chatbot platform adapters.
//!
//! Every platform is polymorphic over one capability: deliver a prompt to
//! the bound character and return its reply text. Failures surface as
//! errors here; the engine maps them to the `NONE` sentinel so a single
//! failed interaction never breaks sequence alignment. Browser-driven
//! platforms plug in through the same trait from outside this crate.

mod kindroid;
mod nomi;

pub use kindroid::KindroidClient;
pub use nomi::NomiClient;

use async_trait::async_trait;

#[async_trait]
pub trait ChatbotBackend: Send + Sync {
    /// Send one prompt to the bound character and return the reply text.
    async fn send_message(&self, prompt: &str) -> anyhow::Result<String>;

    fn backend_name(&self) -> &'static str;
}
