//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 `SqliteContentStore`가 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `documents`: 문서 CRUD와 조건부 본문 갱신 쿼리

pub mod documents;

pub use documents::*;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// 연결 풀을 만들고 마이그레이션을 적용합니다.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// 테스트/임베디드용 인메모리 데이터베이스
///
/// `sqlite::memory:`는 연결마다 별도의 DB가 생기므로 연결을 하나로 제한합니다.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // sqlx::migrate!: 컴파일 타임에 ./migrations 폴더의 SQL 파일들을 포함시킵니다.
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
