use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::text::truncate_chars;

/// "Generate text given a prompt". Errors are recovered by the chain runner.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct LLMClient {
    pub client: Client<OpenAIConfig>,
    pub model: String,
    temperature: f32,
    max_output_tokens: u32,
    max_prompt_chars: Option<usize>,
}

impl LLMClient {
    pub fn new(api_key: String, config: &LlmConfig) -> Self {
        let mut openai = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = &config.base_url {
            openai = openai.with_api_base(url);
        }
        let client = Client::with_config(openai);
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            max_prompt_chars: config.max_prompt_chars,
        }
    }

    /// Applies the optional prompt cap, keeping the head of the prompt.
    fn capped<'a>(&self, prompt: &'a str) -> &'a str {
        match self.max_prompt_chars {
            Some(max) => {
                let capped = truncate_chars(prompt, max);
                if capped.len() < prompt.len() {
                    warn!(
                        "✂️ [LLM] Prompt truncated to {} chars (was {})",
                        max,
                        prompt.chars().count()
                    );
                }
                capped
            }
            None => prompt,
        }
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    #[allow(deprecated)]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        info!("🤖 Sending request to LLM (Model: {})...", self.model);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .max_tokens(self.max_output_tokens)
            .messages([ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(self.capped(prompt))
                    .build()?,
            )])
            .build()?;

        let response = self.client.chat().create(request).await?;

        info!("🤖 LLM Response received.");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
