//! AI SEO最適化
//!
//! プロンプト生成、LLM応答の解析、スコア計算

pub mod optimizer;
pub mod parser;
pub mod prompt;
pub mod score;

pub use optimizer::{SeoAnalysis, SeoOptimizer};
pub use parser::{ParsedRecommendations, ResponseParser};
pub use prompt::{AiSettings, ContentData, OptimizationLevel, PromptProfile};
pub use score::{calculate_score, ScoreBreakdown, ScoreGrade};
