//! # 낙관적 버전 추적기
//!
//! 저장 요청을 보내기 전에 버전을 미리 1 올려서 UI에 바로 보여주고,
//! 서버가 거절하면 원래 값으로 되돌립니다.
//!
//! ## 흐름
//! 1. `begin()`: 확정 버전 N을 잠금 토큰(`expected`)으로, N+1을 추측 값으로 잡습니다.
//! 2. 성공 → `commit()`: 서버가 돌려준 version/updated_at을 그대로 채택
//! 3. 실패 → `rollback()`: 추측 값을 버리고 N으로 복귀

use crate::models::Document;

/// 저장 요청 하나에 대한 버전 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTicket {
    /// 서버에 잠금 토큰으로 보내는 증가 전 버전
    pub expected: i64,
    /// UI에 미리 보여주는 증가 후 버전
    pub speculative: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticVersionTracker {
    confirmed: i64,
    speculative: Option<i64>,
    updated_at: Option<String>,
}

impl OptimisticVersionTracker {
    pub fn new(version: i64) -> Self {
        Self {
            confirmed: version,
            speculative: None,
            updated_at: None,
        }
    }

    pub fn from_document(document: &Document) -> Self {
        Self {
            confirmed: document.version,
            speculative: None,
            updated_at: Some(document.updated_at.clone()),
        }
    }

    /// 서버가 확인해 준 마지막 버전
    pub fn confirmed(&self) -> i64 {
        self.confirmed
    }

    /// UI에 표시할 버전. 저장 중이면 추측 값
    pub fn displayed(&self) -> i64 {
        self.speculative.unwrap_or(self.confirmed)
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    pub fn is_speculating(&self) -> bool {
        self.speculative.is_some()
    }

    /// 추측 증가를 시작하고 요청에 쓸 버전 정보를 돌려줍니다.
    pub fn begin(&mut self) -> VersionTicket {
        let ticket = VersionTicket {
            expected: self.confirmed,
            speculative: self.confirmed + 1,
        };
        self.speculative = Some(ticket.speculative);
        ticket
    }

    /// 서버 응답의 version과 updated_at을 그대로 채택합니다.
    ///
    /// 추측 값(+1)이 아니라 서버 값을 쓰므로, 증가 폭이 1이 아니어도 어긋나지 않습니다.
    pub fn commit(&mut self, document: &Document) {
        self.confirmed = document.version;
        self.updated_at = Some(document.updated_at.clone());
        self.speculative = None;
    }

    /// 추측 값을 버립니다. 다음 요청은 다시 확정 버전을 토큰으로 씁니다.
    pub fn rollback(&mut self) {
        self.speculative = None;
    }

    /// 충돌 후 다시 읽어온 서버 사본을 새 기준으로 삼습니다.
    pub fn reconcile(&mut self, server: &Document) {
        self.rollback();
        self.commit(server);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(version: i64, updated_at: &str) -> Document {
        Document {
            id: "doc".into(),
            title: "Untitled".into(),
            content: String::new(),
            version,
            word_count: 0,
            char_count: 0,
            line_count: 1,
            size_bytes: 0,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: updated_at.into(),
        }
    }

    #[test]
    fn begin_sends_previous_version_as_token() {
        let mut tracker = OptimisticVersionTracker::new(4);
        let ticket = tracker.begin();

        assert_eq!(ticket, VersionTicket { expected: 4, speculative: 5 });
        assert_eq!(tracker.displayed(), 5);
        assert_eq!(tracker.confirmed(), 4);
    }

    #[test]
    fn rollback_restores_previous_value() {
        let mut tracker = OptimisticVersionTracker::new(4);
        tracker.begin();
        tracker.rollback();

        assert_eq!(tracker.displayed(), 4);
        assert!(!tracker.is_speculating());
        assert_eq!(tracker.begin().expected, 4);
    }

    #[test]
    fn commit_adopts_server_values() {
        let mut tracker = OptimisticVersionTracker::new(1);
        tracker.begin();
        // 서버가 +1이 아닌 값을 돌려줘도 그대로 따릅니다.
        tracker.commit(&doc(7, "2026-01-02T00:00:00.000Z"));

        assert_eq!(tracker.confirmed(), 7);
        assert_eq!(tracker.displayed(), 7);
        assert_eq!(tracker.updated_at(), Some("2026-01-02T00:00:00.000Z"));
    }

    #[test]
    fn n_successes_with_failures_between() {
        let mut tracker = OptimisticVersionTracker::new(10);
        for _ in 0..3 {
            tracker.begin();
            tracker.rollback();

            let ticket = tracker.begin();
            tracker.commit(&doc(ticket.expected + 1, "t"));
        }
        assert_eq!(tracker.confirmed(), 13);
    }
}
