//! # 충돌 해결기
//!
//! 실패한 저장이 낙관적 잠금 충돌인지 일반 실패인지 구분합니다.
//! 충돌이면 서버의 최신 문서를 다시 읽어 호출자에게 넘기고,
//! 그 외의 실패는 재조회 없이 그대로 돌려줍니다.

use super::{ContentStore, ErrorKind, SaveError};
use crate::models::Document;
use std::sync::Arc;

/// 실패한 저장의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 충돌: 서버에 저장된 최신 사본
    Reconciled(Document),
    /// 일반 실패, 또는 충돌 후 재조회마저 실패한 경우
    Failed(SaveError),
}

#[derive(Clone)]
pub struct ConflictResolver {
    store: Arc<dyn ContentStore>,
}

impl ConflictResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, document_id: &str, error: SaveError) -> Resolution {
        if error.kind() != ErrorKind::Conflict {
            return Resolution::Failed(error);
        }

        match self.store.fetch_document(document_id).await {
            Ok(server) => {
                tracing::warn!(
                    document_id,
                    server_version = server.version,
                    "Save rejected by a newer version, adopting server copy"
                );
                Resolution::Reconciled(server)
            }
            Err(fetch_error) => {
                tracing::warn!(document_id, error = %fetch_error, "Failed to re-read conflicting document");
                Resolution::Failed(fetch_error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::ContentSave;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 재조회 횟수를 세는 저장소
    struct CountingStore {
        fetches: AtomicUsize,
        document: Option<Document>,
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn update_content(&self, _save: &ContentSave) -> Result<Document, SaveError> {
            unreachable!("resolver never writes")
        }

        async fn fetch_document(&self, document_id: &str) -> Result<Document, SaveError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.document
                .clone()
                .ok_or_else(|| SaveError::NotFound(document_id.to_string()))
        }
    }

    fn server_doc() -> Document {
        Document {
            id: "doc".into(),
            title: "Untitled".into(),
            content: "from another tab".into(),
            version: 5,
            word_count: 3,
            char_count: 16,
            line_count: 1,
            size_bytes: 16,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:05.000Z".into(),
        }
    }

    fn conflict() -> SaveError {
        SaveError::Conflict {
            document_id: "doc".into(),
            expected_version: 3,
        }
    }

    #[tokio::test]
    async fn conflict_fetches_server_copy() {
        let store = Arc::new(CountingStore {
            fetches: AtomicUsize::new(0),
            document: Some(server_doc()),
        });
        let resolver = ConflictResolver::new(store.clone());

        let resolution = resolver.resolve("doc", conflict()).await;

        assert_eq!(resolution, Resolution::Reconciled(server_doc()));
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_errors_skip_the_read() {
        let store = Arc::new(CountingStore {
            fetches: AtomicUsize::new(0),
            document: Some(server_doc()),
        });
        let resolver = ConflictResolver::new(store.clone());

        let error = SaveError::Transient("503".into());
        let resolution = resolver.resolve("doc", error.clone()).await;

        assert_eq!(resolution, Resolution::Failed(error));
        assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_read_is_reported() {
        let store = Arc::new(CountingStore {
            fetches: AtomicUsize::new(0),
            document: None,
        });
        let resolver = ConflictResolver::new(store);

        let resolution = resolver.resolve("doc", conflict()).await;
        assert_eq!(resolution, Resolution::Failed(SaveError::NotFound("doc".into())));
    }
}
