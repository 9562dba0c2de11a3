//! SEO Optimizer
//!
//! プロンプト生成 → LLM呼び出し → 応答解析 → スコア計算 を一つの操作にまとめる

use super::parser::{ParsedRecommendations, ResponseParser};
use super::prompt::{build_prompt, system_prompt, AiSettings, ContentData, PromptProfile};
use super::score::{score_breakdown, ScoreBreakdown, ScoreGrade};
use crate::content::SeoMetadata;
use crate::error::{Error, Result};
use crate::llm::LlmClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

/// 生成時の温度
pub const OPTIMIZATION_TEMPERATURE: f32 = 0.7;

/// SEO分析結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub meta_title: String,
    pub meta_description: String,
    pub focus_keyword: String,
    pub meta_keywords: String,
    pub content_suggestions: Vec<String>,
    pub suggested_headings: Vec<String>,
    pub local_seo_recommendations: Vec<String>,
    pub og_title: String,
    pub og_description: String,
    pub structured_data: Option<Value>,
    /// 最適化スコア (0-100)
    pub optimization_score: u8,
    pub score_grade: ScoreGrade,
    /// スコアの加点内訳
    pub score_breakdown: ScoreBreakdown,
    /// LLMの生の応答
    pub ai_response: String,
    pub last_optimization_run: DateTime<Utc>,
}

impl SeoAnalysis {
    fn from_parsed(parsed: ParsedRecommendations, ai_response: String) -> Self {
        let breakdown = score_breakdown(
            &parsed.meta_title,
            &parsed.meta_description,
            &parsed.focus_keyword,
        );

        Self {
            meta_title: parsed.meta_title,
            meta_description: parsed.meta_description,
            focus_keyword: parsed.focus_keyword,
            meta_keywords: parsed.meta_keywords,
            content_suggestions: parsed.content_suggestions,
            suggested_headings: parsed.suggested_headings,
            local_seo_recommendations: parsed.local_seo_recommendations,
            og_title: parsed.og_title,
            og_description: parsed.og_description,
            structured_data: parsed.structured_data,
            optimization_score: breakdown.score,
            score_grade: breakdown.grade(),
            score_breakdown: breakdown,
            ai_response,
            last_optimization_run: Utc::now(),
        }
    }
}

/// SEO最適化エンジン
pub struct SeoOptimizer {
    llm: LlmClient,
    parser: ResponseParser,
    profile: PromptProfile,
}

impl SeoOptimizer {
    /// 新しい最適化エンジンを作成
    pub fn new(llm: LlmClient, profile: PromptProfile) -> Self {
        Self {
            llm,
            parser: ResponseParser::new(),
            profile,
        }
    }

    /// 使用中のプロバイダー名
    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    /// コンテンツを分析し、SEO推奨値を生成
    pub async fn optimize(
        &self,
        content: &ContentData,
        current_seo: Option<&SeoMetadata>,
        settings: &AiSettings,
    ) -> Result<SeoAnalysis> {
        info!(
            content_type = %content.content_type,
            title = %content.title,
            level = ?settings.optimization_level,
            "Starting SEO optimization"
        );
        if let Some(seo) = current_seo {
            debug!(
                meta_title = seo.meta_title.as_deref().unwrap_or(""),
                focus_keyword = seo.focus_keyword.as_deref().unwrap_or(""),
                "Current SEO metadata"
            );
        }

        let prompt = build_prompt(content, settings, &self.profile);

        let response = self
            .llm
            .complete_with_system(
                system_prompt(&self.profile),
                prompt,
                OPTIMIZATION_TEMPERATURE,
            )
            .await
            .map_err(|e| {
                error!("AI SEO optimization error: {}", e);
                Error::Optimization(e.to_string())
            })?;

        debug!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "LLM response received"
        );

        let parsed = self.parser.parse(&response.content, &self.profile);
        let analysis = SeoAnalysis::from_parsed(parsed, response.content);

        info!(
            score = analysis.optimization_score,
            grade = ?analysis.score_grade,
            "SEO optimization completed"
        );

        Ok(analysis)
    }
}
