//! Recommendation Apply
//!
//! 分析結果を既存のSEOメタデータへマージする

use super::model::{AiOptimization, AppliedSuggestion, SeoField, SeoMetadata};
use crate::error::{Error, Result};
use crate::seo::optimizer::SeoAnalysis;
use crate::seo::prompt::AiSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// エディターから送られる推奨値（全体適用用）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoRecommendations {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub focus_keyword: Option<String>,
    pub optimization_score: Option<u8>,
    pub target_keywords: Option<String>,
}

/// 分析結果のうち一括適用で使う項目
///
/// `/analyze` のレスポンスをそのまま受け取れる（他のキーは無視）。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisFields {
    pub meta_title: String,
    pub meta_description: String,
    pub focus_keyword: String,
    pub meta_keywords: String,
    pub structured_data: Option<Value>,
    pub og_title: String,
    pub og_description: String,
    pub optimization_score: u8,
    pub last_optimization_run: Option<DateTime<Utc>>,
}

impl AnalysisFields {
    /// 一括適用で書き込まれるフィールド
    pub fn present_fields(&self) -> Vec<SeoField> {
        SeoField::ALL
            .into_iter()
            .filter(|f| self.value(*f).is_some())
            .collect()
    }

    /// 適用する値（空なら None）
    fn value(&self, field: SeoField) -> Option<Value> {
        let text = match field {
            SeoField::MetaTitle => &self.meta_title,
            SeoField::MetaDescription => &self.meta_description,
            SeoField::FocusKeyword => &self.focus_keyword,
            SeoField::MetaKeywords => &self.meta_keywords,
            SeoField::OgTitle => &self.og_title,
            SeoField::OgDescription => &self.og_description,
            SeoField::StructuredData => {
                return self.structured_data.clone().filter(|v| !v.is_null())
            }
        };
        non_empty(text).map(|t| Value::String(clamp(field, t)))
    }
}

/// 空でなければ推奨値、そうでなければ既存値
fn prefer(recommended: Option<&str>, existing: &Option<String>) -> Option<String> {
    match recommended {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => existing.clone(),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// フィールドの文字数上限で切り詰める
fn clamp(field: SeoField, value: &str) -> String {
    match field.max_len() {
        Some(max) => value.chars().take(max).collect(),
        None => value.to_string(),
    }
}

fn optional_value(value: &Option<String>) -> Value {
    value.as_ref().map_or(Value::Null, |v| Value::String(v.clone()))
}

/// 推奨値を一括適用
pub fn apply_recommendations(
    existing: &SeoMetadata,
    recommendations: &SeoRecommendations,
    now: DateTime<Utc>,
) -> Result<SeoMetadata> {
    let previous = existing.ai_optimization.clone().unwrap_or_default();

    let updated = SeoMetadata {
        meta_title: prefer(recommendations.meta_title.as_deref(), &existing.meta_title),
        meta_description: prefer(
            recommendations.meta_description.as_deref(),
            &existing.meta_description,
        ),
        focus_keyword: prefer(recommendations.focus_keyword.as_deref(), &existing.focus_keyword),
        ai_optimization: Some(AiOptimization {
            last_optimization_run: Some(now),
            optimization_score: recommendations.optimization_score.unwrap_or(0),
            target_keywords: prefer(
                recommendations.target_keywords.as_deref(),
                &previous.target_keywords,
            ),
            ..previous
        }),
        ..existing.clone()
    };

    updated.validate()?;
    Ok(updated)
}

fn string_value(field: SeoField, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(Error::InvalidRequest(format!(
            "{} must be a string",
            field.as_str()
        ))),
    }
}

/// 文字列フィールドの格納先（structuredData は None）
fn string_slot(seo: &mut SeoMetadata, field: SeoField) -> Option<&mut Option<String>> {
    match field {
        SeoField::MetaTitle => Some(&mut seo.meta_title),
        SeoField::MetaDescription => Some(&mut seo.meta_description),
        SeoField::FocusKeyword => Some(&mut seo.focus_keyword),
        SeoField::MetaKeywords => Some(&mut seo.meta_keywords),
        SeoField::OgTitle => Some(&mut seo.og_title),
        SeoField::OgDescription => Some(&mut seo.og_description),
        SeoField::StructuredData => None,
    }
}

/// フィールドへ値を書き込み、適用履歴を残す
fn set_field(
    seo: &mut SeoMetadata,
    ai: &mut AiOptimization,
    field: SeoField,
    value: Value,
    now: DateTime<Utc>,
) -> Result<()> {
    let original_value = current_value(seo, field);

    match string_slot(seo, field) {
        Some(slot) => *slot = string_value(field, &value)?,
        None => seo.structured_data = (!value.is_null()).then(|| value.clone()),
    }

    ai.applied_suggestions.insert(
        field.as_str().to_string(),
        AppliedSuggestion {
            applied: true,
            applied_at: now,
            original_value,
            new_value: value,
        },
    );
    Ok(())
}

/// 単一フィールドを適用し、適用履歴を記録
pub fn apply_field(
    existing: &SeoMetadata,
    field: SeoField,
    value: Value,
    now: DateTime<Utc>,
) -> Result<SeoMetadata> {
    let mut updated = existing.clone();
    let mut ai = updated.ai_optimization.take().unwrap_or_default();

    set_field(&mut updated, &mut ai, field, value, now)?;
    updated.ai_optimization = Some(ai);

    updated.validate()?;
    Ok(updated)
}

/// 分析結果の全フィールドを適用
///
/// 空でない項目だけを書き込み、それぞれに適用履歴を残す。
pub fn apply_all(
    existing: &SeoMetadata,
    analysis: &AnalysisFields,
    now: DateTime<Utc>,
) -> Result<SeoMetadata> {
    let mut updated = existing.clone();
    let mut ai = updated.ai_optimization.take().unwrap_or_default();

    for field in SeoField::ALL {
        if let Some(value) = analysis.value(field) {
            set_field(&mut updated, &mut ai, field, value, now)?;
        }
    }

    ai.optimization_score = analysis.optimization_score;
    ai.last_optimization_run = Some(analysis.last_optimization_run.unwrap_or(now));
    updated.ai_optimization = Some(ai);

    updated.validate()?;
    Ok(updated)
}

/// 自動適用時のマージ
///
/// 文字数上限を超える値は切り詰めてから検証する。
pub fn merge_analysis(
    existing: &SeoMetadata,
    analysis: &SeoAnalysis,
    settings: &AiSettings,
    now: DateTime<Utc>,
) -> Result<SeoMetadata> {
    let previous = existing.ai_optimization.clone().unwrap_or_default();
    let meta_title = clamp(SeoField::MetaTitle, &analysis.meta_title);
    let meta_description = clamp(SeoField::MetaDescription, &analysis.meta_description);

    let merged = SeoMetadata {
        meta_title: prefer(non_empty(&meta_title), &existing.meta_title),
        meta_description: prefer(non_empty(&meta_description), &existing.meta_description),
        focus_keyword: prefer(non_empty(&analysis.focus_keyword), &existing.focus_keyword),
        meta_keywords: prefer(non_empty(&analysis.meta_keywords), &existing.meta_keywords),
        structured_data: analysis
            .structured_data
            .clone()
            .or_else(|| existing.structured_data.clone()),
        ai_optimization: Some(AiOptimization {
            last_optimization_run: Some(now),
            optimization_score: analysis.optimization_score,
            target_keywords: prefer(
                non_empty(&settings.target_keywords),
                &previous.target_keywords,
            ),
            geographic_focus: prefer(
                non_empty(&settings.geographic_focus),
                &previous.geographic_focus,
            ),
            optimization_level: Some(settings.optimization_level),
            ..previous
        }),
        ..existing.clone()
    };

    merged.validate()?;
    Ok(merged)
}

/// 適用前の値を取得（監査用）
pub fn current_value(seo: &SeoMetadata, field: SeoField) -> Value {
    match field {
        SeoField::MetaTitle => optional_value(&seo.meta_title),
        SeoField::MetaDescription => optional_value(&seo.meta_description),
        SeoField::FocusKeyword => optional_value(&seo.focus_keyword),
        SeoField::MetaKeywords => optional_value(&seo.meta_keywords),
        SeoField::OgTitle => optional_value(&seo.og_title),
        SeoField::OgDescription => optional_value(&seo.og_description),
        SeoField::StructuredData => seo.structured_data.clone().unwrap_or(Value::Null),
    }
}
