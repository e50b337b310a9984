//! # 헬스체크(Health Check) 핸들러
//!
//! 서버와 저장 엔드포인트가 응답 가능한지 확인하는 엔드포인트입니다.
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok" }`

use axum::Json; // JSON 응답 래퍼
use serde_json::{json, Value}; // JSON 생성 유틸리티

/// `GET /health` — 서버 상태를 확인합니다.
///
/// State나 Path 같은 Extractor 없이 고정된 JSON만 반환하는 가장 단순한 핸들러입니다.
/// 반환 타입이 `Json<Value>`이므로 Axum이 Content-Type 헤더와 200 OK를 채웁니다.
pub async fn health_check() -> Json<Value> {
    // 결과: {"status": "ok"}
    Json(json!({
        "status": "ok"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
    }
}
