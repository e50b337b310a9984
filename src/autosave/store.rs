//! # 저장소(ContentStore) 추상화
//!
//! 스케줄러가 호출하는 저장 엔드포인트의 계약입니다.
//! 스케줄러는 생성 시점에 `Arc<dyn ContentStore>`를 주입받으며,
//! 전역 클라이언트 인스턴스는 없습니다.
//!
//! 구현체:
//! - `SqliteContentStore`: 같은 프로세스의 SQLite 풀에 직접 조건부 갱신
//! - `HttpContentStore` (`autosave::http`): REST 엔드포인트 호출

use super::SaveError;
use crate::{
    db,
    error::AppError,
    models::{ContentUpdate, Document, DocumentStats},
    services,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// 저장 요청 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSave {
    pub document_id: String,
    pub content: String,
    /// 낙관적 잠금 토큰: 클라이언트가 믿고 있는 현재(증가 전) 버전
    pub expected_version: i64,
    pub stats: DocumentStats,
}

impl ContentSave {
    /// 본문에서 통계를 계산하여 요청을 만듭니다.
    pub fn new(document_id: impl Into<String>, content: impl Into<String>, expected_version: i64) -> Self {
        let content = content.into();
        let stats = services::compute_stats(&content);
        Self {
            document_id: document_id.into(),
            content,
            expected_version,
            stats,
        }
    }
}

/// 조건부 갱신과 재조회를 제공하는 저장소
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// 본문을 조건부로 저장합니다.
    ///
    /// 성공하면 `version = expected_version + 1`인 행을 반환하고,
    /// 버전이 맞지 않으면 `SaveError::Conflict`를 반환해야 합니다.
    async fn update_content(&self, save: &ContentSave) -> Result<Document, SaveError>;

    /// 서버에 저장된 최신 문서를 읽습니다 (충돌 후 재조회).
    async fn fetch_document(&self, document_id: &str) -> Result<Document, SaveError>;
}

/// SQLite 풀에 직접 접근하는 저장소
#[derive(Debug, Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
    max_content_bytes: usize,
}

impl SqliteContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_content_bytes: usize::MAX,
        }
    }

    /// 본문 최대 크기를 지정합니다. 넘으면 `SaveError::Validation`
    pub fn with_max_content_bytes(mut self, max_content_bytes: usize) -> Self {
        self.max_content_bytes = max_content_bytes;
        self
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn update_content(&self, save: &ContentSave) -> Result<Document, SaveError> {
        if (save.stats.size_bytes as usize) > self.max_content_bytes {
            return Err(SaveError::Validation(format!(
                "content is {} bytes, limit is {}",
                save.stats.size_bytes, self.max_content_bytes
            )));
        }

        let result = db::update_document_content(
            &self.pool,
            &save.document_id,
            &save.content,
            save.expected_version,
            &save.stats,
        )
        .await
        .map_err(transient)?;

        match result {
            ContentUpdate::Updated(document) => Ok(document),
            ContentUpdate::VersionMismatch { .. } => Err(SaveError::Conflict {
                document_id: save.document_id.clone(),
                expected_version: save.expected_version,
            }),
            ContentUpdate::NotFound => Err(SaveError::NotFound(save.document_id.clone())),
        }
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Document, SaveError> {
        db::get_document(&self.pool, document_id)
            .await
            .map_err(transient)?
            .ok_or_else(|| SaveError::NotFound(document_id.to_string()))
    }
}

fn transient(err: AppError) -> SaveError {
    SaveError::Transient(err.to_string())
}
