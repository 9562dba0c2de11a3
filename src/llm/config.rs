//! LLM接続設定（`[llm]` セクション）

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 接続先の種類
///
/// ローカル・カスタムはOpenAI互換APIとして呼び出す。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAI,
    AzureOpenAI,
    Local,
    Custom,
}

/// LLM設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// APIキー（ログ・サンプル設定には出さない）
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,
    /// ベースURL（Azure・ローカル・カスタム時は必須）
    pub endpoint: Option<String>,
    /// モデル名（Azureではデプロイ名）
    pub default_model: String,
    pub timeout_secs: u64,
    /// 試行回数の上限（初回を含む）
    pub max_retries: u32,
    pub default_temperature: f32,
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            api_key: None,
            endpoint: None,
            default_model: "gpt-4".to_string(),
            timeout_secs: 60,
            max_retries: 3,
            default_temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

impl LlmConfig {
    /// OpenAI向けの設定
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            default_model: model.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// APIキー（空文字列は未設定扱い）
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .filter(|k| !k.is_empty())
    }

    /// 設定を検証
    pub fn validate(&self) -> LlmResult<()> {
        let needs_key = matches!(self.provider, ProviderKind::OpenAI | ProviderKind::AzureOpenAI);
        if needs_key && self.api_key().is_none() {
            return Err(LlmError::ConfigError(
                "API key is required for OpenAI providers".to_string(),
            ));
        }

        if self.provider != ProviderKind::OpenAI && self.endpoint.is_none() {
            return Err(LlmError::ConfigError(format!(
                "Endpoint is required for provider {:?}",
                self.provider
            )));
        }

        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(LlmError::ConfigError(
                "Temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if !(1..=100_000).contains(&self.max_tokens) {
            return Err(LlmError::ConfigError(
                "max_tokens must be between 1 and 100000".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(LlmError::ConfigError(
                "max_retries must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
