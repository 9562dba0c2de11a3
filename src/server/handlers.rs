//! Route handlers for the `/api/ai-seo` endpoints.

use super::error::ApiError;
use super::AppState;
use crate::content::{
    apply_all, apply_field, apply_recommendations, merge_analysis, AnalysisFields, SeoField,
    SeoMetadata, SeoRecommendations,
};
use crate::error::Error;
use crate::seo::{AiSettings, ContentData, SeoAnalysis};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// CMS content type of the record, used for auto-apply
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_id: Option<Value>,
    /// Prompt input; its own `contentType` defaults to `blog_post`
    #[serde(default)]
    pub content: Option<ContentData>,
    #[serde(default)]
    pub seo: Option<SeoMetadata>,
    #[serde(default)]
    pub ai_settings: Option<AiSettings>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: SeoAnalysis,
    pub auto_applied: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_id: Option<Value>,
    #[serde(default)]
    pub recommendations: Option<SeoRecommendations>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyFieldRequest {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_id: Option<Value>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAllRequest {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_id: Option<Value>,
    #[serde(default)]
    pub analysis: Option<AnalysisFields>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub content_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<SeoField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_fields: Option<Vec<SeoField>>,
    pub updated: bool,
    pub applied_at: DateTime<Utc>,
}

impl ApplyResponse {
    fn new(content_id: Value, applied_at: DateTime<Utc>) -> Self {
        Self {
            content_id,
            field: None,
            applied_fields: None,
            updated: true,
            applied_at,
        }
    }
}

/// Content ids arrive as either strings or numbers.
fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pulls `(contentType, id, payload)` out of an apply body, or names the required keys.
fn require<T>(
    content_type: Option<String>,
    content_id: &Value,
    payload: Option<T>,
    payload_name: &str,
) -> Result<(String, String, T), ApiError> {
    match (non_empty(content_type), id_string(content_id), payload) {
        (Some(content_type), Some(id), Some(payload)) => Ok((content_type, id, payload)),
        _ => Err(ApiError::BadRequest(format!(
            "ContentId, contentType, and {} are required",
            payload_name
        ))),
    }
}

fn apply_failure(err: Error) -> ApiError {
    match err {
        Error::NotFound(_) => ApiError::NotFound("Content not found".to_string()),
        other => ApiError::BadRequest(format!("Failed to apply SEO recommendations: {}", other)),
    }
}

/// `POST /api/ai-seo/analyze`
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (content_type, content) = match (non_empty(request.content_type), request.content) {
        (Some(content_type), Some(content)) => (content_type, content),
        _ => {
            return Err(ApiError::BadRequest(
                "Content and contentType are required".to_string(),
            ))
        }
    };
    let settings = request.ai_settings.unwrap_or_default();

    info!(
        content_type = %content_type,
        prompt_type = %content.content_type,
        title = %content.title,
        "AI SEO analysis requested"
    );

    let analysis = state
        .optimizer
        .optimize(&content, request.seo.as_ref(), &settings)
        .await
        .map_err(|e| {
            error!("AI SEO analysis failed: {}", e);
            ApiError::BadRequest(format!("AI SEO analysis failed: {}", e))
        })?;

    let mut auto_applied = false;
    if settings.auto_apply {
        if let Some(id) = request.content_id.as_ref().and_then(id_string) {
            auto_applied = auto_apply(&state, &content_type, &id, &analysis, &settings).await;
        }
    }

    Ok(Json(AnalyzeResponse {
        analysis,
        auto_applied,
    }))
}

/// Merges the analysis into the stored record. Failures are logged, never returned.
async fn auto_apply(
    state: &AppState,
    content_type: &str,
    id: &str,
    analysis: &SeoAnalysis,
    settings: &AiSettings,
) -> bool {
    let analysis = analysis.clone();
    let settings = settings.clone();
    let now = Utc::now();

    let result = state
        .store
        .modify_seo(
            content_type,
            id,
            Box::new(move |seo: &SeoMetadata| merge_analysis(seo, &analysis, &settings, now)),
        )
        .await;

    match result {
        Ok(_) => {
            info!("Auto-applied SEO recommendations to {}/{}", content_type, id);
            true
        }
        Err(Error::NotFound(_)) => {
            warn!("Auto-apply skipped: {}/{} not found", content_type, id);
            false
        }
        Err(e) => {
            warn!("Auto-apply failed for {}/{}: {}", content_type, id, e);
            false
        }
    }
}

/// `POST /api/ai-seo/apply`
pub async fn apply(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let content_id = request.content_id.unwrap_or(Value::Null);
    let (content_type, id, recommendations) = require(
        request.content_type,
        &content_id,
        request.recommendations,
        "recommendations",
    )?;

    info!(content_type = %content_type, content_id = %id, "Applying SEO recommendations");

    let applied_at = Utc::now();
    state
        .store
        .modify_seo(
            &content_type,
            &id,
            Box::new(move |seo: &SeoMetadata| {
                apply_recommendations(seo, &recommendations, applied_at)
            }),
        )
        .await
        .map_err(apply_failure)?;

    Ok(Json(ApplyResponse::new(content_id, applied_at)))
}

/// `POST /api/ai-seo/apply-field`
pub async fn apply_single_field(
    State(state): State<AppState>,
    payload: Result<Json<ApplyFieldRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let content_id = request.content_id.unwrap_or(Value::Null);
    let (content_type, id, field) = require(
        request.content_type,
        &content_id,
        non_empty(request.field),
        "field",
    )?;
    let field: SeoField = field.parse().map_err(apply_failure)?;

    info!(
        content_type = %content_type,
        content_id = %id,
        field = %field,
        "Applying single SEO field"
    );

    let applied_at = Utc::now();
    let value = request.value;
    state
        .store
        .modify_seo(
            &content_type,
            &id,
            Box::new(move |seo: &SeoMetadata| apply_field(seo, field, value, applied_at)),
        )
        .await
        .map_err(apply_failure)?;

    Ok(Json(ApplyResponse {
        field: Some(field),
        ..ApplyResponse::new(content_id, applied_at)
    }))
}

/// `POST /api/ai-seo/apply-all`
pub async fn apply_all_fields(
    State(state): State<AppState>,
    payload: Result<Json<ApplyAllRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let content_id = request.content_id.unwrap_or(Value::Null);
    let (content_type, id, analysis) =
        require(request.content_type, &content_id, request.analysis, "analysis")?;

    info!(content_type = %content_type, content_id = %id, "Applying all analysis fields");

    let applied_at = Utc::now();
    let applied_fields = analysis.present_fields();
    state
        .store
        .modify_seo(
            &content_type,
            &id,
            Box::new(move |seo: &SeoMetadata| apply_all(seo, &analysis, applied_at)),
        )
        .await
        .map_err(apply_failure)?;

    Ok(Json(ApplyResponse {
        applied_fields: Some(applied_fields),
        ..ApplyResponse::new(content_id, applied_at)
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "provider": state.optimizer.provider_name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
