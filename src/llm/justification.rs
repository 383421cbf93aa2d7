//! Short natural-language justifications for match scores

use crate::config::Config;
use crate::error::Result;
use crate::llm::client::{ChatClient, LlmError};
use crate::llm::prompts::PromptTemplates;
use log::debug;
use std::future::Future;

/// Explains a score. One call per resume.
pub trait Justifier {
    fn model_name(&self) -> &str;

    fn justify(
        &self,
        job_description: &str,
        resume_text: &str,
        score: f64,
    ) -> impl Future<Output = std::result::Result<String, LlmError>> + Send;
}

pub struct JustificationGenerator {
    client: ChatClient,
    templates: PromptTemplates,
}

impl JustificationGenerator {
    pub fn new(client: ChatClient, templates: PromptTemplates) -> Self {
        Self { client, templates }
    }

    /// Fails with a configuration error when no API credential is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        let client = ChatClient::new(&config.llm, api_key)?;
        let templates = PromptTemplates::default().with_snippet_chars(config.processing.snippet_chars);
        Ok(Self::new(client, templates))
    }
}

impl Justifier for JustificationGenerator {
    fn model_name(&self) -> &str {
        self.client.model()
    }

    async fn justify(
        &self,
        job_description: &str,
        resume_text: &str,
        score: f64,
    ) -> std::result::Result<String, LlmError> {
        let prompt = self.templates.render_justification(job_description, resume_text, score);
        debug!("Requesting justification ({} prompt chars)", prompt.chars().count());
        self.client.complete(&prompt).await
    }
}
