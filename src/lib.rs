//! # Notara
//!
//! 노트 에디터의 자동 저장 파이프라인과, 그 파이프라인이 호출하는
//! 낙관적 잠금 저장 엔드포인트를 구현한 크레이트입니다.
//!
//! 모듈 구성:
//! - `autosave`: 클라이언트 측 저장 스케줄러, 버전 추적기, 충돌 해결기
//! - `config`: 환경변수 기반 설정
//! - `db`: SQLite 쿼리 (조건부 본문 갱신)
//! - `error`: 서버 에러 타입과 HTTP 응답 변환
//! - `models`: 문서와 요청/응답 구조체
//! - `routes`: axum 핸들러와 API 라우터
//! - `services`: 문서 통계 계산

pub mod autosave;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
