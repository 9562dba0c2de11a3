//! Prompt Builder
//!
//! ページ内容とAI設定からLLM向けのプロンプトを組み立てる

use serde::{Deserialize, Serialize};

/// 最適化対象のページ内容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    /// ページタイトル
    #[serde(default)]
    pub title: String,
    /// 本文
    #[serde(default)]
    pub content: Option<String>,
    /// 抜粋
    #[serde(default)]
    pub excerpt: Option<String>,
    /// スラッグ
    #[serde(default)]
    pub slug: Option<String>,
    /// コンテンツ種別
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "blog_post".to_string()
}

impl ContentData {
    /// タイトルと本文からページ内容を作成
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Some(content.into()),
            excerpt: None,
            slug: None,
            content_type: default_content_type(),
        }
    }
}

/// 最適化レベル
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// 最小限
    Basic,
    /// 標準
    #[default]
    Standard,
    /// 積極的
    Aggressive,
}

impl OptimizationLevel {
    /// 要求する改善提案の数
    fn suggestion_range(&self) -> &'static str {
        match self {
            OptimizationLevel::Basic | OptimizationLevel::Standard => "2-3",
            OptimizationLevel::Aggressive => "4-5",
        }
    }
}

/// エディターが指定するAI設定
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    /// ターゲットキーワード（カンマ区切り）
    pub target_keywords: String,
    /// 地域フォーカス
    pub geographic_focus: String,
    /// 最適化レベル
    pub optimization_level: OptimizationLevel,
    /// 分析後に自動適用するか
    pub auto_apply: bool,
}

/// プロンプトの固定パラメータ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptProfile {
    /// 対象業種（例: "law firms"）
    pub industry: String,
    /// 本文プレビューの最大文字数
    pub content_preview_chars: usize,
    /// メタタイトルの最大文字数
    pub title_max: usize,
    /// メタディスクリプションの最大文字数
    pub description_max: usize,
}

impl Default for PromptProfile {
    fn default() -> Self {
        Self {
            industry: "law firms".to_string(),
            content_preview_chars: 1500,
            title_max: 60,
            description_max: 155,
        }
    }
}

/// システムプロンプトを生成
pub fn system_prompt(profile: &PromptProfile) -> String {
    format!(
        "You are an expert SEO specialist for {industry} with deep knowledge of {industry} marketing and search engine optimization.",
        industry = profile.industry
    )
}

/// 本文プレビューを作成（文字単位で切り詰め）
pub fn content_preview(content: Option<&str>, max_chars: usize) -> String {
    match content {
        Some(text) if !text.is_empty() => match text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        },
        _ => "No content provided".to_string(),
    }
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

/// ユーザープロンプトを生成
pub fn build_prompt(
    content: &ContentData,
    settings: &AiSettings,
    profile: &PromptProfile,
) -> String {
    let geographic_focus =
        or_placeholder(Some(settings.geographic_focus.as_str()), "Not specified");
    let target_keywords = or_placeholder(Some(settings.target_keywords.as_str()), "Not specified");
    let excerpt = or_placeholder(content.excerpt.as_deref(), "No excerpt provided");
    let preview = content_preview(content.content.as_deref(), profile.content_preview_chars);

    let mut prompt = format!(
        r#"
As an SEO expert for {industry}, optimize the following content for search engines:

CONTENT TYPE: {content_type}
GEOGRAPHIC FOCUS: {geographic_focus}

CURRENT TITLE: "{title}"

CONTENT PREVIEW:
{preview}

CURRENT EXCERPT:
{excerpt}

TARGET KEYWORDS: {target_keywords}

Please provide optimized SEO metadata including:
1. Meta title (max {title_max} characters)
2. Meta description (max {description_max} characters)
3. Focus keyword (most important keyword phrase)
4. Content improvement suggestions ({suggestions} points)
5. Schema markup recommendations (as a JSON-LD code block)
6. Meta keywords (comma-separated)
7. OG title
8. OG description
9. Suggested headings
"#,
        industry = profile.industry,
        content_type = content.content_type,
        title = content.title,
        title_max = profile.title_max,
        description_max = profile.description_max,
        suggestions = settings.optimization_level.suggestion_range(),
    );

    if !settings.geographic_focus.trim().is_empty() {
        prompt.push_str("10. Local SEO recommendations\n");
    }

    prompt.push_str(&format!(
        "\nAnswer each item on its own line as \"Label: value\", put list items on separate lines starting with \"-\", and leave a blank line between sections.\nMake the recommendations specific for a {} website.\n",
        profile.industry
    ));

    prompt
}
