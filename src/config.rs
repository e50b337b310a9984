//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버와 자동 저장 스케줄러의 설정값을 읽어옵니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 서버 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `MAX_CONTENT_BYTES`: 저장 요청 본문의 최대 크기
//!
//! 자동 저장 설정 항목:
//! - `AUTOSAVE_DEBOUNCE_MS`: 마지막 편집 후 저장까지 기다리는 시간
//! - `AUTOSAVE_THROTTLE_MS`: 저장 시도 사이의 최소 간격
//! - `AUTOSAVE_TIMEOUT_MS`: 저장 요청 하나의 최대 대기 시간

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 서버 전체 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/notara.db?mode=rwc")
    pub database_url: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 본문 최대 바이트 수 (기본값: 1 MiB). 넘으면 검증 실패(400)
    pub max_content_bytes: usize,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000),
            max_content_bytes: parse_or("MAX_CONTENT_BYTES", 1024 * 1024),
        })
    }
}

/// 클라이언트 자동 저장 스케줄러 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// 편집이 멈춘 뒤 저장을 시작하기까지의 대기 시간
    pub debounce: Duration,
    /// 저장 시도 사이의 최소 간격. 요청 중에 버퍼링된 내용을 다시 예약할 때 적용됩니다.
    pub throttle: Duration,
    /// 진행 중인 저장 요청의 제한 시간. 넘으면 일시적 실패로 처리합니다.
    pub save_timeout: Duration,
}

impl AutosaveConfig {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
    pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(2000);
    pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_millis(15_000);

    /// 환경변수에서 읽되, 없거나 잘못된 값은 기본값을 사용합니다.
    pub fn from_env() -> Self {
        Self {
            debounce: Duration::from_millis(parse_or(
                "AUTOSAVE_DEBOUNCE_MS",
                Self::DEFAULT_DEBOUNCE.as_millis() as u64,
            )),
            throttle: Duration::from_millis(parse_or(
                "AUTOSAVE_THROTTLE_MS",
                Self::DEFAULT_THROTTLE.as_millis() as u64,
            )),
            save_timeout: Duration::from_millis(parse_or(
                "AUTOSAVE_TIMEOUT_MS",
                Self::DEFAULT_SAVE_TIMEOUT.as_millis() as u64,
            )),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Self::DEFAULT_DEBOUNCE,
            throttle: Self::DEFAULT_THROTTLE,
            save_timeout: Self::DEFAULT_SAVE_TIMEOUT,
        }
    }
}

/// 환경변수를 파싱하고, 없거나 파싱에 실패하면 기본값을 반환합니다.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autosave_defaults() {
        let config = AutosaveConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(1000));
        assert_eq!(config.throttle, Duration::from_millis(2000));
        assert_eq!(config.save_timeout, Duration::from_secs(15));
    }

    #[test]
    fn autosave_reads_environment() {
        // AUTOSAVE_* 변수는 이 테스트에서만 건드립니다.
        env::set_var("AUTOSAVE_DEBOUNCE_MS", "250");
        env::set_var("AUTOSAVE_THROTTLE_MS", "not a number");
        env::remove_var("AUTOSAVE_TIMEOUT_MS");

        let config = AutosaveConfig::from_env();

        env::remove_var("AUTOSAVE_DEBOUNCE_MS");
        env::remove_var("AUTOSAVE_THROTTLE_MS");

        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.throttle, AutosaveConfig::DEFAULT_THROTTLE);
        assert_eq!(config.save_timeout, AutosaveConfig::DEFAULT_SAVE_TIMEOUT);
    }

    #[test]
    fn unparsable_value_falls_back() {
        assert_eq!(parse_or("NOTARA_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}
