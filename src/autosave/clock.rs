//! # 시계(Clock) 추상화
//!
//! 디바운스/스로틀 타이머와 저장 제한 시간은 모두 이 트레이트를 통해 시간을 읽고 기다립니다.
//! 기본 구현 `TokioClock`은 tokio 타이머를 사용하므로,
//! 테스트에서는 `#[tokio::test(start_paused = true)]`로 가상 시간을 결정적으로 진행할 수 있습니다.

use async_trait::async_trait;
use tokio::time::Instant;

/// 스케줄러에 주입되는 시계
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// 현재 시각
    fn now(&self) -> Instant;

    /// `deadline`까지 기다립니다.
    async fn sleep_until(&self, deadline: Instant);
}

/// tokio 타이머 기반 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}
