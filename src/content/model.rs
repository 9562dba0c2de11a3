//! Content Model
//!
//! CMSのコンテンツレコードと `seo.seo-metadata` コンポーネントの型定義

use crate::error::Error;
use crate::seo::prompt::OptimizationLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// robots メタタグの値
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MetaRobots {
    #[default]
    #[serde(rename = "index, follow")]
    IndexFollow,
    #[serde(rename = "index, nofollow")]
    IndexNofollow,
    #[serde(rename = "noindex, follow")]
    NoindexFollow,
    #[serde(rename = "noindex, nofollow")]
    NoindexNofollow,
}

/// 適用済み提案の履歴
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedSuggestion {
    pub applied: bool,
    pub applied_at: DateTime<Utc>,
    /// 適用前の値（未設定なら null）
    pub original_value: Value,
    pub new_value: Value,
}

/// AI最適化の状態
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiOptimization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_optimization_run: Option<DateTime<Utc>>,
    pub optimization_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic_focus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_level: Option<OptimizationLevel>,
    /// フィールド名 → 適用履歴
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub applied_suggestions: BTreeMap<String, AppliedSuggestion>,
}

/// SEOメタデータ
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoMetadata {
    #[validate(length(max = 70))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,

    #[validate(length(max = 160))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_keyword: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,

    #[validate(url)]
    #[serde(rename = "canonicalURL", skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,

    pub meta_robots: MetaRobots,

    #[validate(length(max = 70))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,

    #[validate(length(max = 200))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_optimization: Option<AiOptimization>,
}

/// 選択適用できるフィールド
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SeoField {
    MetaTitle,
    MetaDescription,
    FocusKeyword,
    MetaKeywords,
    OgTitle,
    OgDescription,
    StructuredData,
}

impl SeoField {
    /// 一括適用の対象（適用順）
    pub const ALL: [SeoField; 7] = [
        SeoField::MetaTitle,
        SeoField::MetaDescription,
        SeoField::FocusKeyword,
        SeoField::MetaKeywords,
        SeoField::StructuredData,
        SeoField::OgTitle,
        SeoField::OgDescription,
    ];

    /// 文字数上限（`SeoMetadata` の検証と同じ値）
    pub fn max_len(&self) -> Option<usize> {
        match self {
            SeoField::MetaTitle | SeoField::OgTitle => Some(70),
            SeoField::MetaDescription => Some(160),
            SeoField::OgDescription => Some(200),
            _ => None,
        }
    }

    /// JSON上のフィールド名
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoField::MetaTitle => "metaTitle",
            SeoField::MetaDescription => "metaDescription",
            SeoField::FocusKeyword => "focusKeyword",
            SeoField::MetaKeywords => "metaKeywords",
            SeoField::OgTitle => "ogTitle",
            SeoField::OgDescription => "ogDescription",
            SeoField::StructuredData => "structuredData",
        }
    }
}

impl fmt::Display for SeoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeoField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metaTitle" => Ok(SeoField::MetaTitle),
            "metaDescription" => Ok(SeoField::MetaDescription),
            "focusKeyword" => Ok(SeoField::FocusKeyword),
            "metaKeywords" => Ok(SeoField::MetaKeywords),
            "ogTitle" => Ok(SeoField::OgTitle),
            "ogDescription" => Ok(SeoField::OgDescription),
            "structuredData" => Ok(SeoField::StructuredData),
            other => Err(Error::InvalidRequest(format!("Unknown SEO field: {}", other))),
        }
    }
}

/// コンテンツレコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub content_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub seo: SeoMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// 新しいレコードを作成（IDは自動採番）
    pub fn new(content_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content_type: content_type.into(),
            title: title.into(),
            content: None,
            excerpt: None,
            slug: None,
            seo: SeoMetadata::default(),
            updated_at: None,
        }
    }

    /// 本文を設定
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}
