//! LLM統合のエラー型定義

use thiserror::Error;

/// LLM統合システムのエラー型
#[derive(Error, Debug)]
pub enum LlmError {
    /// API呼び出しエラー
    #[error("API error: {0}")]
    ApiError(String),

    /// 認証エラー
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// レート制限エラー
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// ネットワークエラー
    #[error("Network error: {0}")]
    NetworkError(String),

    /// タイムアウト
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// JSONパースエラー
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LlmError {
    /// リトライで回復しうるエラーか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimitError(_) | LlmError::NetworkError(_) | LlmError::Timeout(_)
        )
    }
}

/// LLM統合システムの結果型
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::RateLimitError("429".into()).is_retryable());
        assert!(LlmError::Timeout(60).is_retryable());
        assert!(!LlmError::AuthError("bad key".into()).is_retryable());
        assert!(!LlmError::ApiError("400 Bad Request".into()).is_retryable());
    }
}
