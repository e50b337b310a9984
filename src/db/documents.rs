//! # 문서 데이터베이스 쿼리 모듈
//!
//! `documents` 테이블에 대한 쿼리 함수들이 정의되어 있습니다.
//! 핵심은 `update_document_content()`로, 낙관적 잠금을 한 번의 SQL 문으로
//! 검사하고 증가시키는 조건부 갱신입니다.
//!
//! 모든 함수는 `async`이며 `SqlitePool`을 받아 데이터베이스와 상호작용합니다.
//! 에러 발생 시 `AppError`를 반환합니다.

use crate::error::AppError;
use crate::models::*;
use crate::services;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

/// 현재 시각을 DB에 저장하는 ISO 8601 문자열로 만듭니다.
/// 예: "2026-02-16T12:00:00.000Z"
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 모든 문서를 조회합니다 (최근 수정된 문서가 먼저).
pub async fn list_documents(pool: &SqlitePool) -> Result<Vec<Document>, AppError> {
    let docs = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, title, content, version, word_count, char_count, line_count,
               size_bytes, created_at, updated_at
        FROM documents
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(docs)
}

/// ID로 단일 문서를 조회합니다.
///
/// # 반환값
/// - `Ok(Some(Document))`: 문서를 찾은 경우
/// - `Ok(None)`: 해당 ID의 문서가 없는 경우
pub async fn get_document(pool: &SqlitePool, id: &str) -> Result<Option<Document>, AppError> {
    let doc = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, title, content, version, word_count, char_count, line_count,
               size_bytes, created_at, updated_at
        FROM documents
        WHERE id = ?
        "#,
    )
    .bind(id)
    // .fetch_optional(): 결과가 0행이면 None, 1행이면 Some(Document)
    .fetch_optional(pool)
    .await?;

    Ok(doc)
}

/// 새 문서를 생성합니다. 버전은 1에서 시작합니다.
pub async fn create_document(
    pool: &SqlitePool,
    req: &CreateDocumentRequest,
) -> Result<Document, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let title = req.title.as_deref().unwrap_or("Untitled");
    let content = req.content.as_deref().unwrap_or("");
    let stats = services::compute_stats(content);
    let now = now_timestamp();

    sqlx::query(
        r#"
        INSERT INTO documents (id, title, content, version, word_count, char_count,
                               line_count, size_bytes, created_at, updated_at)
        VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(title)
    .bind(content)
    .bind(stats.word_count)
    .bind(stats.char_count)
    .bind(stats.line_count)
    .bind(stats.size_bytes)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_document(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created document".to_string()))
}

/// 문서 본문을 조건부로 갱신합니다 (낙관적 잠금).
///
/// `WHERE id = ? AND version = ?` 조건과 `version = version + 1`을
/// 하나의 UPDATE 문으로 실행하므로, 읽기-후-쓰기 사이의 경쟁 구간이 없습니다.
/// `RETURNING`으로 갱신된 행을 같은 문장 안에서 돌려받습니다.
///
/// 0행이 갱신되면 문서가 존재하는지 다시 확인하여
/// `VersionMismatch`와 `NotFound`를 구분합니다.
///
/// # 매개변수
/// - `expected_version`: 클라이언트가 믿고 있는 현재 버전 (잠금 토큰)
/// - `stats`: `content`에서 계산한 통계
pub async fn update_document_content(
    pool: &SqlitePool,
    id: &str,
    content: &str,
    expected_version: i64,
    stats: &DocumentStats,
) -> Result<ContentUpdate, AppError> {
    let updated = sqlx::query_as::<_, Document>(
        r#"
        UPDATE documents
        SET content = ?, version = version + 1,
            word_count = ?, char_count = ?, line_count = ?, size_bytes = ?,
            updated_at = ?
        WHERE id = ? AND version = ?
        RETURNING id, title, content, version, word_count, char_count, line_count,
                  size_bytes, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(stats.word_count)
    .bind(stats.char_count)
    .bind(stats.line_count)
    .bind(stats.size_bytes)
    .bind(now_timestamp())
    .bind(id)
    .bind(expected_version)
    .fetch_optional(pool)
    .await?;

    if let Some(doc) = updated {
        return Ok(ContentUpdate::Updated(doc));
    }

    // 0행 갱신: 버전이 달라졌는지, 문서 자체가 없는지 확인합니다.
    let current_version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(match current_version {
        Some(current_version) => ContentUpdate::VersionMismatch { current_version },
        None => ContentUpdate::NotFound,
    })
}

/// 문서를 삭제합니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 ID의 문서가 없음
pub async fn delete_document(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        crate::db::connect_in_memory().await.expect("in-memory pool")
    }

    fn new_doc(content: &str) -> CreateDocumentRequest {
        CreateDocumentRequest {
            title: Some("Notes".to_string()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn creates_document_at_version_one() {
        let pool = pool().await;
        let doc = create_document(&pool, &new_doc("Hello world!")).await.unwrap();

        assert_eq!(doc.version, 1);
        assert_eq!(doc.title, "Notes");
        assert_eq!(doc.word_count, 2);
        assert_eq!(doc.char_count, 12);

        let listed = list_documents(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, doc.id);
    }

    #[tokio::test]
    async fn conditional_update_bumps_version() {
        let pool = pool().await;
        let doc = create_document(&pool, &new_doc("")).await.unwrap();
        let stats = services::compute_stats("line1\nline2\n");

        let result = update_document_content(&pool, &doc.id, "line1\nline2\n", 1, &stats)
            .await
            .unwrap();

        let ContentUpdate::Updated(updated) = result else {
            panic!("expected update, got {result:?}");
        };
        assert_eq!(updated.version, 2);
        assert_eq!(updated.stats(), stats);
        assert_eq!(updated.content, "line1\nline2\n");
    }

    #[tokio::test]
    async fn stale_version_is_a_mismatch() {
        let pool = pool().await;
        let doc = create_document(&pool, &new_doc("a")).await.unwrap();
        let stats = services::compute_stats("b");

        update_document_content(&pool, &doc.id, "b", 1, &stats).await.unwrap();
        let second = update_document_content(&pool, &doc.id, "c", 1, &stats)
            .await
            .unwrap();

        assert_eq!(second, ContentUpdate::VersionMismatch { current_version: 2 });
        let stored = get_document(&pool, &doc.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "b");
    }

    #[tokio::test]
    async fn missing_document_is_not_a_conflict() {
        let pool = pool().await;
        let stats = services::compute_stats("x");

        let result = update_document_content(&pool, "missing", "x", 1, &stats)
            .await
            .unwrap();

        assert_eq!(result, ContentUpdate::NotFound);
    }

    #[tokio::test]
    async fn deletes_document() {
        let pool = pool().await;
        let doc = create_document(&pool, &new_doc("bye")).await.unwrap();

        assert!(delete_document(&pool, &doc.id).await.unwrap());
        assert!(!delete_document(&pool, &doc.id).await.unwrap());
        assert!(get_document(&pool, &doc.id).await.unwrap().is_none());
    }
}
