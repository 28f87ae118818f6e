use std::time::Duration;

use brochure_core::config::LlmConfig;
use brochure_core::error::AppError;
use brochure_core::models::{ChatPrompt, OutputFormat};
use brochure_core::traits::{FragmentStream, LanguageModel};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::sse;

/// OpenAI-compatible chat completion client.
///
/// Works with any OpenAI-compatible API, including:
/// - Gemini via compatibility layer (`https://generativelanguage.googleapis.com/v1beta/openai`)
/// - OpenAI directly (`https://api.openai.com/v1`)
///
/// The configured timeout bounds a whole `complete` call. For `stream` it
/// bounds connecting and each wait for the next chunk, so a long brochure
/// that keeps arriving is never cut off.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &ChatPrompt, format: Option<OutputFormat>, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            response_format: match format {
                Some(OutputFormat::Json) => Some(ResponseFormat {
                    format_type: "json_object".to_string(),
                }),
                _ => None,
            },
            stream,
        }
    }

    /// POST the request; any non-2xx answer becomes an error here.
    ///
    /// `deadline` caps the whole exchange, response body included.
    async fn send(&self, request: &ChatRequest, deadline: Option<Duration>) -> Result<Response, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request);
        if let Some(deadline) = deadline {
            builder = builder.timeout(deadline);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout.as_secs())
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {}", e))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        if status_code == 429 {
            return Err(AppError::RateLimitExceeded);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status_code, body));

        Err(AppError::LlmError {
            message,
            status_code,
        })
    }
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &ChatPrompt, format: OutputFormat) -> Result<String, AppError> {
        let request = self.request(prompt, Some(format), false);
        let response = self.send(&request, Some(self.timeout)).await?;

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout.as_secs())
            } else {
                AppError::HttpError(format!("Failed to parse LLM response: {}", e))
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::LlmError {
                message: "Empty response from LLM".into(),
                status_code: 200,
            })
    }

    async fn stream(&self, prompt: &ChatPrompt) -> Result<FragmentStream, AppError> {
        let request = self.request(prompt, None, true);
        let response = self.send(&request, None).await?;

        tracing::debug!(model = %self.model, "LLM stream established");
        Ok(sse::fragments(response.bytes_stream()))
    }
}
