//! # 자동 저장(autosave) 파이프라인
//!
//! 에디터 클라이언트 쪽의 저장 코어입니다.
//!
//! ```text
//! 키 입력 → SaveScheduler::mark_dirty(content)
//!         → (디바운스 후) OptimisticVersionTracker::begin()
//!         → ContentStore::update_content()
//!         → 성공: commit / 충돌: ConflictResolver가 서버 사본 재조회 / 실패: rollback
//! ```
//!
//! 각 하위 모듈:
//! - `clock`: 주입 가능한 시계 (`TokioClock`)
//! - `error`: `SaveError`와 분류(`ErrorKind`)
//! - `store`: 저장소 트레이트와 SQLite 구현
//! - `http`: REST 엔드포인트를 호출하는 저장소 구현
//! - `version`: 낙관적 버전 추적기
//! - `conflict`: 충돌 해결기
//! - `scheduler`: 디바운스/스로틀 저장 스케줄러

pub mod clock;
pub mod conflict;
pub mod error;
pub mod http;
pub mod scheduler;
pub mod store;
pub mod version;

pub use clock::*;
pub use conflict::*;
pub use error::*;
pub use http::*;
pub use scheduler::*;
pub use store::*;
pub use version::*;
