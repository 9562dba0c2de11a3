//! Content Store
//!
//! コンテンツレコードの永続化抽象とIn-memory実装

use super::model::{ContentRecord, SeoMetadata};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 現在のSEOメタデータから新しい値を作る処理
pub type SeoUpdate = Box<dyn FnOnce(&SeoMetadata) -> Result<SeoMetadata> + Send>;

/// コンテンツストア
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// レコードを取得
    async fn find_one(&self, content_type: &str, id: &str) -> Result<Option<ContentRecord>>;

    /// SEOメタデータを読み取り・変更・保存まで一括で行う
    ///
    /// 同じレコードへの変更は直列化され、`update` がエラーを返した場合は何も保存しない。
    async fn modify_seo(
        &self,
        content_type: &str,
        id: &str,
        update: SeoUpdate,
    ) -> Result<ContentRecord>;

    /// SEOメタデータを置き換え、更新後のレコードを返す
    async fn update_seo(
        &self,
        content_type: &str,
        id: &str,
        seo: SeoMetadata,
    ) -> Result<ContentRecord> {
        self.modify_seo(content_type, id, Box::new(move |_| Ok(seo)))
            .await
    }

    /// レコードを追加（同じキーは上書き）
    async fn insert(&self, record: ContentRecord) -> Result<()>;
}

type RecordKey = (String, String);

/// In-memoryコンテンツストア
///
/// `data_file` を指定すると更新のたびにJSONファイルへ書き出す。
/// 書き出しに失敗した更新はメモリにも反映しない。
#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    records: Arc<RwLock<HashMap<RecordKey, ContentRecord>>>,
    data_file: Option<PathBuf>,
}

fn key_of(record: &ContentRecord) -> RecordKey {
    (record.content_type.clone(), record.id.clone())
}

/// レコードを (contentType, id) 順でJSON配列として書き出す
async fn write_records(path: &Path, mut records: Vec<&ContentRecord>) -> Result<()> {
    records.sort_by(|a, b| (&a.content_type, &a.id).cmp(&(&b.content_type, &b.id)));
    let json = serde_json::to_string_pretty(&records)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

impl InMemoryContentStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// JSONファイルから読み込む（ファイルがなければ空）
    ///
    /// `persist` が true の場合、以降の更新を同じファイルへ保存する。
    pub async fn load_from_file(path: impl AsRef<Path>, persist: bool) -> Result<Self> {
        let path = path.as_ref();
        let records: Vec<ContentRecord> = match tokio::fs::read_to_string(path).await {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Content data file {} not found, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} content records from {}", records.len(), path.display());

        let map = records.into_iter().map(|r| (key_of(&r), r)).collect();

        Ok(Self {
            records: Arc::new(RwLock::new(map)),
            data_file: persist.then(|| path.to_path_buf()),
        })
    }

    /// レコード数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// 空かどうか
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// 全レコードをJSONファイルへ保存
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let records = self.records.read().await;
        write_records(path.as_ref(), records.values().collect()).await
    }

    /// 変更後の全体をファイルへ書き、成功したらメモリへ反映
    async fn commit(
        &self,
        records: &mut HashMap<RecordKey, ContentRecord>,
        record: ContentRecord,
    ) -> Result<()> {
        let key = key_of(&record);

        if let Some(path) = &self.data_file {
            let snapshot: Vec<&ContentRecord> = records
                .iter()
                .filter(|(k, _)| **k != key)
                .map(|(_, r)| r)
                .chain(std::iter::once(&record))
                .collect();

            write_records(path, snapshot)
                .await
                .map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))?;
        }

        records.insert(key, record);
        Ok(())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn find_one(&self, content_type: &str, id: &str) -> Result<Option<ContentRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(content_type.to_string(), id.to_string()))
            .cloned())
    }

    async fn modify_seo(
        &self,
        content_type: &str,
        id: &str,
        update: SeoUpdate,
    ) -> Result<ContentRecord> {
        let mut records = self.records.write().await;

        let current = records
            .get(&(content_type.to_string(), id.to_string()))
            .ok_or_else(|| Error::NotFound(format!("{}/{}", content_type, id)))?;

        let mut updated = current.clone();
        updated.seo = update(&current.seo)?;
        updated.updated_at = Some(Utc::now());

        self.commit(&mut records, updated.clone()).await?;
        Ok(updated)
    }

    async fn insert(&self, record: ContentRecord) -> Result<()> {
        let mut records = self.records.write().await;
        self.commit(&mut records, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::apply::apply_field;
    use crate::content::model::SeoField;
    use serde_json::json;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    fn record(content_type: &str, id: &str) -> ContentRecord {
        let mut record = ContentRecord::new(content_type, "Title");
        record.id = id.to_string();
        record
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryContentStore::new();
        let record = record("blog_post", "42");
        store.insert(record.clone()).await.unwrap();

        assert_eq!(store.find_one("blog_post", "42").await.unwrap(), Some(record));
        assert!(store.find_one("page", "42").await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_seo_sets_timestamp() {
        let store = InMemoryContentStore::new();
        store.insert(record("page", "about")).await.unwrap();

        let seo = SeoMetadata {
            meta_title: Some("About us".to_string()),
            ..SeoMetadata::default()
        };
        let updated = assert_ok!(store.update_seo("page", "about", seo.clone()).await);
        assert_eq!(updated.seo, seo);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = InMemoryContentStore::new();
        let err = assert_err!(
            store
                .update_seo("page", "missing", SeoMetadata::default())
                .await
        );
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_modify_seo_error_keeps_record() {
        let store = InMemoryContentStore::new();
        store.insert(record("page", "1")).await.unwrap();

        let err = assert_err!(
            store
                .modify_seo(
                    "page",
                    "1",
                    Box::new(|_: &SeoMetadata| -> Result<SeoMetadata> {
                        Err(Error::InvalidRequest("rejected".to_string()))
                    })
                )
                .await
        );
        assert!(matches!(err, Error::InvalidRequest(_)));

        let stored = store.find_one("page", "1").await.unwrap().unwrap();
        assert!(stored.updated_at.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_field_updates_are_all_kept() {
        let store = InMemoryContentStore::new();
        store.insert(record("page", "1")).await.unwrap();

        let changes = [
            (SeoField::MetaTitle, "Title A"),
            (SeoField::OgTitle, "OG B"),
            (SeoField::FocusKeyword, "estate lawyer"),
            (SeoField::MetaKeywords, "wills, trusts"),
        ];

        let handles: Vec<_> = changes
            .into_iter()
            .map(|(field, value)| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .modify_seo(
                            "page",
                            "1",
                            Box::new(move |seo: &SeoMetadata| {
                                apply_field(seo, field, json!(value), Utc::now())
                            }),
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }

        let seo = store.find_one("page", "1").await.unwrap().unwrap().seo;
        assert_eq!(seo.meta_title.as_deref(), Some("Title A"));
        assert_eq!(seo.og_title.as_deref(), Some("OG B"));
        assert_eq!(seo.focus_keyword.as_deref(), Some("estate lawyer"));
        assert_eq!(seo.meta_keywords.as_deref(), Some("wills, trusts"));
        assert_eq!(seo.ai_optimization.unwrap().applied_suggestions.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = InMemoryContentStore::load_from_file(dir.path().join("none.json"), false)
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_persist_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("content.json");

        let store = InMemoryContentStore::load_from_file(&path, true).await.unwrap();
        store.insert(record("practice_area", "dui")).await.unwrap();
        store
            .update_seo(
                "practice_area",
                "dui",
                SeoMetadata {
                    focus_keyword: Some("dui lawyer".to_string()),
                    ..SeoMetadata::default()
                },
            )
            .await
            .unwrap();

        let reloaded = InMemoryContentStore::load_from_file(&path, false).await.unwrap();
        let record = reloaded.find_one("practice_area", "dui").await.unwrap().unwrap();
        assert_eq!(record.seo.focus_keyword.as_deref(), Some("dui lawyer"));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_insert() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("content.json");

        let store = InMemoryContentStore::load_from_file(&path, true).await.unwrap();
        let err = assert_err!(store.insert(record("page", "1")).await);
        assert!(matches!(err, Error::Storage(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_update() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();

        let store = InMemoryContentStore::load_from_file(data_dir.join("content.json"), true)
            .await
            .unwrap();
        store.insert(record("page", "1")).await.unwrap();
        std::fs::remove_dir_all(&data_dir).unwrap();

        let seo = SeoMetadata {
            meta_title: Some("Never stored".to_string()),
            ..SeoMetadata::default()
        };
        let err = assert_err!(store.update_seo("page", "1", seo).await);
        assert!(matches!(err, Error::Storage(_)));

        let stored = store.find_one("page", "1").await.unwrap().unwrap();
        assert!(stored.seo.meta_title.is_none());
        assert!(stored.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = InMemoryContentStore::load_from_file(&path, false).await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
