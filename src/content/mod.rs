//! コンテンツレコードとSEOメタデータ
//!
//! - `model`: レコード・メタデータの型
//! - `store`: 永続化抽象とIn-memory実装
//! - `apply`: 推奨値の一括/選択/全項目/自動適用

pub mod apply;
pub mod model;
pub mod store;

pub use apply::{
    apply_all, apply_field, apply_recommendations, merge_analysis, AnalysisFields,
    SeoRecommendations,
};
pub use model::{
    AiOptimization, AppliedSuggestion, ContentRecord, MetaRobots, SeoField, SeoMetadata,
};
pub use store::{ContentStore, InMemoryContentStore, SeoUpdate};
