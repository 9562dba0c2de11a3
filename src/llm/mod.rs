//! LLM統合システム
//!
//! このモジュールは、OpenAI・Azure OpenAI・OpenAI互換エンドポイントとの
//! 統合機能を提供します。

pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use client::LlmClient;
pub use config::{LlmConfig, ProviderKind};
pub use error::{LlmError, LlmResult};
pub use providers::LlmProvider;
pub use types::{LlmRequest, LlmResponse, Message, Role, TokenUsage};
