//! OpenAIプロバイダー実装
//!
//! Chat Completions APIをreqwestで直接呼び出す。
//! Azure OpenAIとOpenAI互換エンドポイント（ローカルLLMなど）にも対応。

use crate::llm::{
    config::{LlmConfig, ProviderKind},
    error::{LlmError, LlmResult},
    providers::LlmProvider,
    types::{LlmRequest, LlmResponse, Message, TokenUsage},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const AZURE_API_VERSION: &str = "2024-02-01";
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// OpenAIプロバイダー
pub struct OpenAIProvider {
    client: Client,
    config: LlmConfig,
    base_url: String,
    retry_delay: Duration,
}

impl OpenAIProvider {
    /// 設定を検証してプロバイダーを作成
    ///
    /// OpenAIでエンドポイント未指定の場合は公式APIを使う。
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let base_url = match (&config.endpoint, config.provider) {
            (Some(endpoint), _) => endpoint.trim_end_matches('/').to_string(),
            (None, ProviderKind::OpenAI) => OPENAI_API_URL.to_string(),
            (None, kind) => {
                return Err(LlmError::ConfigError(format!(
                    "Endpoint is required for provider {:?}",
                    kind
                )))
            }
        };

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("ai-seo-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::ConfigError(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            config,
            base_url,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// リトライ間隔を設定（試行回数に比例して伸びる）
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn completions_url(&self) -> String {
        match self.config.provider {
            ProviderKind::AzureOpenAI => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, self.config.default_model, AZURE_API_VERSION
            ),
            _ => format!("{}/chat/completions", self.base_url),
        }
    }

    fn build_body<'a>(&'a self, request: &'a LlmRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.default_model,
            messages: &request.messages,
            temperature: request
                .temperature
                .unwrap_or(self.config.default_temperature),
            max_tokens: self.config.max_tokens,
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (self.config.api_key(), self.config.provider) {
            (Some(key), ProviderKind::AzureOpenAI) => builder.header("api-key", key),
            (Some(key), _) => builder.bearer_auth(key),
            (None, _) => builder,
        }
    }

    /// 1回分のAPI呼び出し
    async fn send_once(
        &self,
        url: &str,
        body: &ChatCompletionRequest<'_>,
    ) -> LlmResult<ChatCompletionResponse> {
        let request = self.authorize(self.client.post(url)).json(body);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_secs)
            } else {
                LlmError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| LlmError::NetworkError(e.to_string()))?;
            return Ok(serde_json::from_str(&text)?);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(classify_status(status, error_text))
    }
}

/// HTTPステータスをエラー種別に変換
fn classify_status(status: StatusCode, body: String) -> LlmError {
    let detail = format!("{} {}", status, body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthError(detail),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitError(detail),
        s if s.is_server_error() => LlmError::NetworkError(detail),
        _ => LlmError::ApiError(detail),
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let body = self.build_body(request);
        let url = self.completions_url();
        let max_attempts = self.config.max_retries.max(1);

        let mut attempt = 1;
        let response = loop {
            debug!(model = body.model, attempt, "chat completion request");

            match self.send_once(&url, &body).await {
                Ok(response) => break response,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!("LLM request failed on attempt {}: {}, retrying...", attempt, e);
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ApiError("No choices in response".to_string()))?;

        if let Some(reason) = choice.finish_reason.as_deref().filter(|r| *r != "stop") {
            warn!(finish_reason = reason, "Completion did not finish normally");
        }

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response
                .model
                .unwrap_or_else(|| self.config.default_model.clone()),
            usage,
        })
    }

    fn name(&self) -> &str {
        match self.config.provider {
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::AzureOpenAI => "Azure OpenAI",
            ProviderKind::Local => "Local",
            ProviderKind::Custom => "Custom",
        }
    }
}

/// チャット完了リクエスト
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: usize,
}

/// チャット完了レスポンス
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
