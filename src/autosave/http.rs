//! # HTTP 저장소
//!
//! `PUT /api/v1/documents/{id}/content`와 `GET /api/v1/documents/{id}`를 호출하는
//! `ContentStore` 구현입니다. 상태 코드를 `SaveError`로 분류합니다.
//!
//! | 상태 코드         | SaveError    |
//! |-------------------|--------------|
//! | 200               | (성공)       |
//! | 409               | `Conflict`   |
//! | 404               | `NotFound`   |
//! | 400 / 413 / 422   | `Validation` |
//! | 그 외, 전송 오류  | `Transient`  |

use super::{ContentSave, ContentStore, SaveError};
use crate::models::{Document, UpdateContentRequest};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

/// 서버의 에러 응답 본문: `{ "error": { "code", "message" } }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: reqwest::Client,
    /// 예: "http://localhost:3000"
    base_url: String,
}

impl HttpContentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// 호출자가 만든 클라이언트를 사용합니다 (프록시, 인증 헤더 등).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn document_url(&self, document_id: &str) -> String {
        format!("{}/api/v1/documents/{}", self.base_url, document_id)
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn update_content(&self, save: &ContentSave) -> Result<Document, SaveError> {
        let body = UpdateContentRequest {
            content: save.content.clone(),
            expected_version: save.expected_version,
        };

        let response = self
            .client
            .put(format!("{}/content", self.document_url(&save.document_id)))
            .json(&body)
            .send()
            .await
            .map_err(|e| SaveError::Transient(e.to_string()))?;

        if response.status() == StatusCode::CONFLICT {
            return Err(SaveError::Conflict {
                document_id: save.document_id.clone(),
                expected_version: save.expected_version,
            });
        }

        parse_document(response, &save.document_id).await
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Document, SaveError> {
        let response = self
            .client
            .get(self.document_url(document_id))
            .send()
            .await
            .map_err(|e| SaveError::Transient(e.to_string()))?;

        parse_document(response, document_id).await
    }
}

async fn parse_document(response: Response, document_id: &str) -> Result<Document, SaveError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Document>()
            .await
            .map_err(|e| SaveError::Transient(format!("invalid response body: {e}")));
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error.message)
        .unwrap_or_else(|_| status.to_string());

    Err(classify_status(status, document_id, message))
}

fn classify_status(status: StatusCode, document_id: &str, message: String) -> SaveError {
    match status {
        StatusCode::NOT_FOUND => SaveError::NotFound(document_id.to_string()),
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNPROCESSABLE_ENTITY => SaveError::Validation(message),
        _ => SaveError::Transient(format!("{status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, "doc", String::new()),
            SaveError::NotFound("doc".into())
        );
        assert!(matches!(
            classify_status(StatusCode::PAYLOAD_TOO_LARGE, "doc", "big".into()),
            SaveError::Validation(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "doc", "down".into()),
            SaveError::Transient(_)
        ));
    }

    #[test]
    fn trims_trailing_slash() {
        let store = HttpContentStore::new("http://localhost:3000/");
        assert_eq!(
            store.document_url("abc"),
            "http://localhost:3000/api/v1/documents/abc"
        );
    }
}
