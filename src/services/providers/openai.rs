/// Chat-completion provider (OpenAI-compatible)
///
/// API Flow:
/// 1. POST /chat/completions with `{model, messages: [{role: "user", content}]}`
/// 2. Read `choices[0].message.content` from the response
use crate::{
    config::ApiKey,
    error::{AppError, AppResult},
    models::CompletionResult,
    services::providers::{ensure_success, CompletionProvider},
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: ApiKey,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http_client: HttpClient, api_key: ApiKey, api_url: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn extract_content(response: ChatResponse) -> AppResult<CompletionResult> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(CompletionResult::new)
            .ok_or_else(|| {
                AppError::ExternalApi("Completion response has no first choice".to_string())
            })
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> AppResult<CompletionResult> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(PROVIDER, response).await?;

        let response_text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, provider = PROVIDER, "Failed to deserialize completion response");
            AppError::ExternalApi(format!("Failed to parse completion response: {}", e))
        })?;

        let result = Self::extract_content(parsed)?;

        tracing::info!(
            provider = PROVIDER,
            model = %self.model,
            chars = result.raw_text.len(),
            "Completion received"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
