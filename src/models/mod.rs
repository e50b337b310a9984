//! # 데이터 모델 모듈
//!
//! 서버와 자동 저장 클라이언트가 함께 사용하는 데이터 구조체들을 정의합니다.
//! - `document`: 문서(Document), 통계, 저장 요청/결과 구조체
//!
//! `pub use document::*;`로 재공개하여 `crate::models::Document`처럼 짧게 접근합니다.

pub mod document;

pub use document::*;
