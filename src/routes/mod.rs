//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 API 라우터 구성을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `documents`: 문서 조회/생성/삭제와 조건부 본문 저장 핸들러
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod documents;
pub mod health;

// 핸들러 함수들을 재공개하여 `routes::list_documents`처럼 바로 접근 가능하게 합니다.
pub use documents::*;
pub use health::*;

use axum::{
    extract::DefaultBodyLimit, // 요청 본문 크기 제한 (axum 기본값은 2 MiB)
    routing::{get, put},       // HTTP 메서드별 라우팅 함수들
    Router,                    // URL 경로와 핸들러를 연결하는 라우터
};

/// `/api/v1` 아래에 중첩될 API 라우터를 만듭니다.
///
/// axum 0.8부터 경로 파라미터는 `{id}` 문법을 사용합니다.
pub fn api_router(state: AppState) -> Router {
    // 본문 제한을 설정값에 맞춰 두어야 큰 문서도 핸들러의 검증(400)까지 도달합니다.
    let limit = body_limit(state.max_content_bytes);

    Router::new()
        .route("/documents", get(list_documents).post(create_document))
        .route("/documents/{id}", get(get_document).delete(delete_document))
        // 자동 저장 파이프라인이 호출하는 유일한 쓰기 엔드포인트
        .route("/documents/{id}/content", put(update_document_content))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(limit))
        // .with_state(): 이 라우터의 모든 핸들러에서 AppState를 사용할 수 있게 합니다.
        .with_state(state)
}

/// 본문 최대 크기에 JSON 이스케이프 여유분을 더한 HTTP 요청 크기 제한
///
/// 제어 문자는 `\u0000` 형태로 최대 6배까지 늘어납니다.
pub fn body_limit(max_content_bytes: usize) -> usize {
    max_content_bytes
        .saturating_mul(6)
        .saturating_add(BODY_OVERHEAD_BYTES)
}

/// `expected_version` 필드와 JSON 구조에 필요한 여유 공간
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;
