//! LLMクライアント

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    providers::{create_provider, LlmProvider},
    types::{LlmRequest, LlmResponse, Message},
};

/// LLMクライアント
pub struct LlmClient {
    provider: Box<dyn LlmProvider>,
}

impl LlmClient {
    /// 設定からクライアントを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        Ok(Self {
            provider: create_provider(&config)?,
        })
    }

    /// 任意のプロバイダーでクライアントを作成
    pub fn with_provider(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// 完了リクエストを送信
    pub async fn complete(&self, request: LlmRequest) -> LlmResult<LlmResponse> {
        self.provider.complete(&request).await
    }

    /// システムプロンプト付きの完了
    pub async fn complete_with_system(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        temperature: f32,
    ) -> LlmResult<LlmResponse> {
        let messages = vec![Message::system(system_prompt), Message::user(user_prompt)];
        let request = LlmRequest::new(messages).with_temperature(temperature);
        self.complete(request).await
    }

    /// プロバイダー名を取得
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
