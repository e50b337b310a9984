//! # 자동 저장 에러
//!
//! 저장 요청이 실패했을 때 스케줄러가 받는 에러와 그 분류입니다.
//!
//! | 분류         | 원인                                  | 복구 방법                          |
//! |--------------|---------------------------------------|------------------------------------|
//! | `Conflict`   | 다른 작성자가 먼저 버전을 올림        | 서버 사본을 다시 읽어 덮어쓰기      |
//! | `Transient`  | 네트워크/서버 오류, 시간 초과, 문서 없음 | 다음 편집이나 강제 저장 때 재시도 |
//! | `Validation` | 본문 크기 초과 등                     | 내용이 바뀌기 전에는 재시도 안 함  |

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// 조건부 갱신이 0행에 적용됨 (id + version 불일치)
    #[error("document {document_id} is no longer at version {expected_version}")]
    Conflict {
        document_id: String,
        expected_version: i64,
    },

    #[error("document {0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// 전송/서버 오류. 내용은 로그와 UI 표시용 메시지입니다.
    #[error("save failed: {0}")]
    Transient(String),

    #[error("save timed out after {0:?}")]
    TimedOut(Duration),
}

/// 스케줄러가 실패를 처리하는 방식을 결정하는 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    Transient,
    Validation,
}

impl SaveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaveError::Conflict { .. } => ErrorKind::Conflict,
            SaveError::Validation(_) => ErrorKind::Validation,
            SaveError::NotFound(_) | SaveError::Transient(_) | SaveError::TimedOut(_) => {
                ErrorKind::Transient
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let conflict = SaveError::Conflict {
            document_id: "doc".into(),
            expected_version: 3,
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(conflict.is_conflict());

        assert_eq!(SaveError::NotFound("doc".into()).kind(), ErrorKind::Transient);
        assert_eq!(
            SaveError::TimedOut(Duration::from_secs(1)).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            SaveError::Validation("too big".into()).kind(),
            ErrorKind::Validation
        );
    }
}
