//! # 문서(Document) 라우트 핸들러
//!
//! 에디터가 문서를 열고 자동 저장하는 데 필요한 HTTP 핸들러들입니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/documents`              → 문서 목록 조회
//! - `POST   /api/v1/documents`              → 새 문서 생성
//! - `GET    /api/v1/documents/{id}`         → 단일 문서 조회 (충돌 후 재조회에도 사용)
//! - `DELETE /api/v1/documents/{id}`         → 문서 삭제
//! - `PUT    /api/v1/documents/{id}/content` → 본문 조건부 저장 (낙관적 잠금)
//!
//! ## 저장 응답
//! - `200 OK` + 갱신된 Document (version = expected_version + 1)
//! - `409 Conflict`: 다른 작성자가 먼저 버전을 올림
//! - `404 Not Found`: 문서가 없음
//! - `400 Bad Request`: 본문 크기 초과 등 검증 실패

use crate::{db, error::AppError, models::*, services};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// 저장 요청 본문의 최대 바이트 수
    pub max_content_bytes: usize,
}

/// `GET /documents` — 전체 문서 목록을 조회합니다.
///
/// 응답: `{ "documents": [...] }`
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let documents = db::list_documents(&state.pool).await?;
    Ok(Json(json!({ "documents": documents })))
}

/// `GET /documents/{id}` — 단일 문서를 조회합니다.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(document))
}

/// `POST /documents` — 새 문서를 생성합니다 (버전 1).
pub async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    if let Some(content) = &req.content {
        validate_content(content, state.max_content_bytes)?;
    }

    let document = db::create_document(&state.pool, &req).await?;
    tracing::info!(id = %document.id, "Created document");
    Ok((StatusCode::CREATED, Json(document)))
}

/// `DELETE /documents/{id}` — 문서를 삭제합니다.
///
/// 성공 시 HTTP 204 No Content를 반환합니다.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !db::delete_document(&state.pool, &id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /documents/{id}/content` — 문서 본문을 조건부로 저장합니다.
///
/// `expected_version`이 현재 저장된 버전과 같을 때만 저장되고,
/// 버전은 정확히 1 증가합니다. 통계 값은 서버가 본문에서 다시 계산합니다.
pub async fn update_document_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<Document>, AppError> {
    validate_content(&req.content, state.max_content_bytes)?;
    if req.expected_version < 1 {
        return Err(AppError::BadRequest(format!(
            "expected_version must be positive, got {}",
            req.expected_version
        )));
    }

    let stats = services::compute_stats(&req.content);
    let result = db::update_document_content(
        &state.pool,
        &id,
        &req.content,
        req.expected_version,
        &stats,
    )
    .await?;

    match result {
        ContentUpdate::Updated(document) => {
            tracing::debug!(id = %id, version = document.version, "Saved document content");
            Ok(Json(document))
        }
        ContentUpdate::VersionMismatch { current_version } => Err(AppError::Conflict(format!(
            "document {} is at version {}, expected {}",
            id, current_version, req.expected_version
        ))),
        ContentUpdate::NotFound => Err(AppError::NotFound),
    }
}

/// 본문 크기를 검사합니다.
fn validate_content(content: &str, max_bytes: usize) -> Result<(), AppError> {
    let size = services::size_bytes(content);
    if size > max_bytes {
        return Err(AppError::BadRequest(format!(
            "content is {} bytes, limit is {}",
            size, max_bytes
        )));
    }
    Ok(())
}
