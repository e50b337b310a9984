//! # 문서 모델 정의
//!
//! 에디터에서 편집하는 문서(Document)와 저장 요청/응답 구조체들입니다.
//!
//! ## 버전(version) 필드
//! `version`은 낙관적 잠금(optimistic lock) 토큰입니다.
//! 서버에서 내용이 성공적으로 갱신될 때마다 정확히 1씩 증가하며,
//! 클라이언트는 자신이 알고 있는 버전을 `expected_version`으로 보내야만 저장할 수 있습니다.

use serde::{Deserialize, Serialize};

/// 문서 엔티티 — DB의 `documents` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    /// 문서 고유 식별자 (UUIDv7). 생성 후 바뀌지 않습니다.
    pub id: String,
    pub title: String,
    /// 문서 본문 전체. 저장할 때마다 통째로 교체됩니다 (diff/patch 없음).
    pub content: String,
    /// 낙관적 잠금 토큰. 성공한 갱신마다 +1
    pub version: i64,
    pub word_count: i64,
    pub char_count: i64,
    pub line_count: i64,
    pub size_bytes: i64,
    /// 생성 시각 (ISO 8601 형식: "2026-02-16T12:00:00.000Z")
    pub created_at: String,
    /// 마지막 성공 갱신 시각. 서버가 기록합니다.
    pub updated_at: String,
}

impl Document {
    /// 본문에서 파생된 통계 값만 모아서 반환합니다.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            word_count: self.word_count,
            char_count: self.char_count,
            line_count: self.line_count,
            size_bytes: self.size_bytes,
        }
    }
}

/// 본문에서 계산되는 통계. `services::compute_stats()`의 결과입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub word_count: i64,
    /// UTF-16 코드 유닛 수
    pub char_count: i64,
    pub line_count: i64,
    /// UTF-8 바이트 수
    pub size_bytes: i64,
}

/// 문서 생성 요청 — `POST /api/v1/documents`의 요청 본문
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    /// 없으면 "Untitled"
    pub title: Option<String>,
    /// 없으면 빈 문서
    pub content: Option<String>,
}

/// 본문 저장 요청 — `PUT /api/v1/documents/{id}/content`의 요청 본문
///
/// 통계 값은 보내지 않습니다. 서버가 `content`에서 다시 계산합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
    /// 클라이언트가 현재 서버에 저장되어 있다고 믿는 버전 (잠금 토큰)
    pub expected_version: i64,
}

/// 조건부 갱신(`UPDATE ... WHERE id = ? AND version = ?`)의 결과
///
/// 0행이 갱신된 경우를 "버전 불일치"와 "문서 없음"으로 구분합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentUpdate {
    /// 갱신 성공. 새 버전과 updated_at이 반영된 행
    Updated(Document),
    /// 다른 작성자가 이미 버전을 올렸음
    VersionMismatch { current_version: i64 },
    NotFound,
}
