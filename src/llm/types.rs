//! チャット補完の入出力型

use serde::Serialize;

/// メッセージのロール
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// チャットメッセージ（APIへそのまま送る形）
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 補完リクエスト
///
/// モデルと最大トークン数は `LlmConfig` の値を使う。
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    /// 未指定なら設定のデフォルト温度
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// 補完結果
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// 生成されたテキスト
    pub content: String,
    /// 実際に応答したモデル
    pub model: String,
    pub usage: TokenUsage,
}

/// トークン使用量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}
