//! # 서비스 모듈
//!
//! DB나 HTTP에 의존하지 않는 도메인 로직입니다.
//! - `stats`: 문서 본문의 단어/글자/줄/바이트 통계 계산

pub mod stats;

pub use stats::*;
