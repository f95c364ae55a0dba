//! Grammar correction through the language model

use std::sync::Arc;

use tracing::warn;

use crate::llm::{GenerateRequest, GenerationConfig, LlmProvider};

pub const GRAMMAR_PROMPT: &str = "You are a helpful grammar assistant. \
Your sole task is to correct the grammar of the user's input. \
Return ONLY the corrected text. \
Do not add explanations, quotes, or conversational filler. \
If the text is already correct, return it as is.";

pub struct GrammarService {
    llm: Arc<dyn LlmProvider>,
    generation: GenerationConfig,
}

impl GrammarService {
    pub fn new(llm: Arc<dyn LlmProvider>, generation: GenerationConfig) -> Self {
        Self { llm, generation }
    }

    /// Corrected text, or `text` unchanged when the model call fails.
    pub async fn correct(&self, text: &str) -> String {
        let request = GenerateRequest::single_turn(GRAMMAR_PROMPT, text, self.generation.clone());
        match self.llm.generate(request).await {
            Ok(response) => response.text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "grammar correction failed, returning input");
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::fakes::ScriptedLlm;

    #[tokio::test]
    async fn test_output_is_trimmed() {
        let llm = Arc::new(ScriptedLlm::replying("  The owl flies.\n"));
        let service = GrammarService::new(llm.clone(), GenerationConfig::default());

        assert_eq!(service.correct("the owl fly").await, "The owl flies.");

        let seen = llm.requests();
        assert_eq!(seen[0].system.as_deref(), Some(GRAMMAR_PROMPT));
        assert_eq!(seen[0].messages[0].content, "the owl fly");
    }

    #[tokio::test]
    async fn test_failure_returns_original() {
        let service = GrammarService::new(Arc::new(ScriptedLlm::failing()), GenerationConfig::default());
        assert_eq!(service.correct("the owl fly").await, "the owl fly");
    }
}
