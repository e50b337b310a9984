//! # 저장 스케줄러
//!
//! 편집 이벤트 흐름을 받아 "언제 저장 요청을 보낼지" 결정합니다.
//! 키 입력마다 저장하지 않으면서도, 사용자의 마지막 편집은 절대 버리지 않습니다.
//!
//! ## 상태 전이 (문서 세션 하나)
//! ```text
//! IDLE   --mark_dirty-------------------------> DIRTY
//! DIRTY  --디바운스 만료, 진행 중인 요청 없음---> SAVING
//! DIRTY  --디바운스 만료, 요청 진행 중--------> DIRTY (내용 버퍼링)
//! SAVING --성공-------------------------------> IDLE (대기 내용이 있으면 DIRTY)
//! SAVING --충돌-------------------------------> IDLE (서버 사본으로 교체, 대기 내용이 있으면 DIRTY) + Conflict 이벤트
//! SAVING --일반 실패--------------------------> DIRTY (내용 유지) + Failed 이벤트
//! ```
//!
//! 스로틀은 요청이 끝난 뒤 버퍼의 내용을 다시 예약할 때 적용됩니다.
//! 다음 저장은 디바운스와 "마지막 시도 + 스로틀" 중 늦은 쪽에 나갑니다.
//! 진행 중인 요청이 없을 때의 디바운스 만료는 스로틀과 무관하게 바로 저장합니다.
//!
//! ## 동시성
//! - 세션 하나에 저장 요청은 항상 최대 하나만 진행됩니다.
//!   진행 중에 들어온 편집은 `pending` 한 칸에 덮어써지고(마지막 쓰기 우선),
//!   요청이 끝나면 새 디바운스 주기가 자동으로 잡힙니다.
//! - 세션 상태는 `parking_lot::Mutex`로 보호하며, `.await` 구간에서는 잠그지 않습니다.
//! - 결과는 `mpsc` 채널의 `SaveEvent`와 `watch` 채널의 `SaveStatus`로 전달됩니다.
//!   에러가 패닉이나 반환값으로 UI까지 새어 나가지 않습니다.
//!
//! `mark_dirty()` 같은 동기 메서드도 내부에서 `tokio::spawn`을 쓰므로
//! tokio 런타임 안에서 호출해야 합니다.

use super::{
    Clock, ConflictResolver, ContentSave, ContentStore, ErrorKind, OptimisticVersionTracker,
    Resolution, SaveError, VersionTicket,
};
use crate::config::AutosaveConfig;
use crate::models::Document;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// 저장 결과 알림
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    /// 저장 성공. 서버가 돌려준 문서
    Saved(Document),
    /// 다른 작성자가 먼저 저장함. 확정된 내용은 `server`로 교체되었습니다.
    ///
    /// 요청 중에 들어온 편집이 있으면 세션은 dirty로 남고, 서버 버전을 토큰으로 다시 저장됩니다.
    Conflict {
        server: Document,
        /// 서버가 거절한 요청의 내용 (사용자 알림/복구용)
        rejected_content: String,
    },
    /// 일반 실패. 로컬 내용은 그대로이며 dirty 상태가 유지됩니다.
    Failed(SaveError),
}

/// UI가 표시하는 세션 상태 스냅샷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus {
    pub document_id: String,
    /// 마지막으로 확정된 내용과 달라진 편집이 있음
    pub is_dirty: bool,
    /// 저장 요청이 진행 중
    pub is_saving: bool,
    /// 다음 저장을 기다리는 내용이 있음
    pub has_pending: bool,
    /// 표시용 버전 (저장 중이면 추측 값)
    pub version: i64,
    pub last_saved_at: Option<String>,
    pub last_error: Option<SaveError>,
}

/// 문서 세션의 자동 저장 스케줄러
pub struct SaveScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn ContentStore>,
    resolver: ConflictResolver,
    clock: Arc<dyn Clock>,
    config: AutosaveConfig,
    session: Mutex<Session>,
    status: watch::Sender<SaveStatus>,
    events: mpsc::UnboundedSender<SaveEvent>,
}

/// 문서 하나를 열어둔 동안의 메모리 상태
struct Session {
    document_id: String,
    /// 문서를 바꿀 때마다 증가. 이전 문서의 늦은 응답을 걸러냅니다.
    generation: u64,
    tracker: OptimisticVersionTracker,
    /// 서버에 확정된(또는 충돌 후 교체된) 내용
    saved_content: String,
    is_dirty: bool,
    is_saving: bool,
    pending: Option<String>,
    last_attempt: Option<Instant>,
    last_error: Option<SaveError>,
    timer: Option<JoinHandle<()>>,
    /// 타이머를 새로 걸거나 취소할 때마다 증가. 만료된 타이머의 늦은 실행을 무시합니다.
    timer_seq: u64,
    /// `cancel_pending_save()`마다 증가. 취소 전에 보낸 요청이 실패해도 내용을 되살리지 않습니다.
    discard_seq: u64,
}

impl Session {
    fn open(document: &Document, generation: u64) -> Self {
        Self {
            document_id: document.id.clone(),
            generation,
            tracker: OptimisticVersionTracker::from_document(document),
            saved_content: document.content.clone(),
            is_dirty: false,
            is_saving: false,
            pending: None,
            last_attempt: None,
            last_error: None,
            timer: None,
            timer_seq: 0,
            discard_seq: 0,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.timer_seq += 1;
    }

    fn snapshot(&self) -> SaveStatus {
        SaveStatus {
            document_id: self.document_id.clone(),
            is_dirty: self.is_dirty,
            is_saving: self.is_saving,
            has_pending: self.pending.is_some(),
            version: self.tracker.displayed(),
            last_saved_at: self.tracker.updated_at().map(str::to_string),
            last_error: self.last_error.clone(),
        }
    }
}

/// 진행 중인 저장 요청 하나
struct SaveJob {
    generation: u64,
    discard_seq: u64,
    document_id: String,
    content: String,
    ticket: VersionTicket,
}

enum Outcome {
    Saved(Document),
    Reconciled { server: Document, error: SaveError },
    Failed(SaveError),
}

impl SaveScheduler {
    /// 문서를 열고 스케줄러를 만듭니다.
    ///
    /// 저장소와 시계는 호출자가 만들어 주입하며, 수명도 호출자가 관리합니다.
    /// 반환되는 수신자로 `SaveEvent`를 받습니다.
    pub fn new(
        store: Arc<dyn ContentStore>,
        clock: Arc<dyn Clock>,
        config: AutosaveConfig,
        document: &Document,
    ) -> (Self, mpsc::UnboundedReceiver<SaveEvent>) {
        let session = Session::open(document, 0);
        let (status, _) = watch::channel(session.snapshot());
        let (events, events_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Inner {
            resolver: ConflictResolver::new(Arc::clone(&store)),
            store,
            clock,
            config,
            session: Mutex::new(session),
            status,
            events,
        });

        (Self { inner }, events_rx)
    }

    /// 편집이 일어났음을 기록합니다.
    ///
    /// `is_dirty`는 즉시 true가 되고, 이전 디바운스 타이머는 취소된 뒤 새로 걸립니다.
    /// 디바운스 창 안에서 여러 번 호출되면 마지막 내용만 저장됩니다.
    pub fn mark_dirty(&self, content: impl Into<String>) {
        let mut session = self.inner.session.lock();
        session.is_dirty = true;
        session.pending = Some(content.into());
        self.inner.arm_timer(&mut session, self.inner.config.debounce);
        self.inner.publish(&session);
    }

    /// 대기 중인 내용을 스로틀과 디바운스를 무시하고 바로 저장합니다.
    ///
    /// 저장 요청이 진행 중이면 그것이 끝나기를 기다린 뒤 저장합니다.
    /// 저장할 내용이 없으면 `Ok(None)`을 반환합니다.
    /// 충돌이나 실패는 이벤트로도 전달되며, 같은 에러가 반환값으로도 돌아옵니다.
    pub async fn force_save(&self) -> Result<Option<Document>, SaveError> {
        let mut status_rx = self.inner.status.subscribe();

        loop {
            let job = {
                let mut session = self.inner.session.lock();
                session.cancel_timer();
                if session.is_saving {
                    None
                } else {
                    match session.pending.take() {
                        Some(content) => Some(self.inner.begin_save(&mut session, content)),
                        None => return Ok(None),
                    }
                }
            };

            match job {
                Some(job) => {
                    // 별도 태스크로 실행하므로, 호출자가 future를 버려도 요청은 끝까지 정산됩니다.
                    let inner = Arc::clone(&self.inner);
                    return tokio::spawn(async move { inner.run(job).await })
                        .await
                        .unwrap_or_else(|e| Err(SaveError::Transient(e.to_string())));
                }
                None => {
                    tracing::debug!("force_save waiting for in-flight save");
                    if status_rx.wait_for(|status| !status.is_saving).await.is_err() {
                        return Err(SaveError::Transient("scheduler closed".to_string()));
                    }
                }
            }
        }
    }

    /// 대기 중인 저장을 취소하고 로컬 변경을 버립니다.
    ///
    /// 디바운스 타이머는 즉시 취소되지만, 이미 보낸 요청은 취소할 수 없으며
    /// 그 결과는 도착하는 대로 반영됩니다.
    pub fn cancel_pending_save(&self) {
        let mut session = self.inner.session.lock();
        session.cancel_timer();
        session.pending = None;
        session.is_dirty = false;
        session.discard_seq += 1;
        tracing::debug!(document_id = %session.document_id, "Discarded pending save");
        self.inner.publish(&session);
    }

    /// 다른 문서로 전환합니다. 세션 상태는 모두 초기화됩니다.
    ///
    /// 이전 문서로 보낸 요청의 결과는 도착해도 새 세션에 반영되지 않습니다.
    pub fn open_document(&self, document: &Document) {
        let mut session = self.inner.session.lock();
        session.cancel_timer();
        let generation = session.generation + 1;
        *session = Session::open(document, generation);
        tracing::debug!(document_id = %document.id, version = document.version, "Opened document");
        self.inner.publish(&session);
    }

    pub fn status(&self) -> SaveStatus {
        self.inner.status.borrow().clone()
    }

    /// 상태 변경을 구독합니다.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status.subscribe()
    }

    pub fn document_id(&self) -> String {
        self.inner.session.lock().document_id.clone()
    }

    /// 서버에 확정된 마지막 내용
    pub fn saved_content(&self) -> String {
        self.inner.session.lock().saved_content.clone()
    }

    /// 타이머를 정리하고 세션을 닫습니다. 진행 중인 요청은 끝까지 정산됩니다.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        self.inner.session.lock().cancel_timer();
    }
}

impl Inner {
    fn publish(&self, session: &Session) {
        // 구독자가 없어도 값은 갱신되도록 send_replace를 씁니다.
        self.status.send_replace(session.snapshot());
    }

    fn emit(&self, event: SaveEvent) {
        // 수신자가 이미 닫혔으면 알릴 대상이 없습니다.
        let _ = self.events.send(event);
    }

    /// 타이머를 다시 겁니다. 기존 타이머는 취소됩니다.
    fn arm_timer(self: &Arc<Self>, session: &mut Session, delay: Duration) {
        session.cancel_timer();
        let seq = session.timer_seq;
        let generation = session.generation;
        let deadline = self.clock.now() + delay;
        let clock = Arc::clone(&self.clock);
        let weak: Weak<Inner> = Arc::downgrade(self);

        session.timer = Some(tokio::spawn(async move {
            clock.sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_timer(generation, seq);
            }
        }));
    }

    /// 디바운스 타이머 만료
    fn on_timer(self: &Arc<Self>, generation: u64, seq: u64) {
        let mut session = self.session.lock();
        if session.generation != generation || session.timer_seq != seq {
            return;
        }
        session.timer = None;

        if session.pending.is_none() {
            return;
        }
        if session.is_saving {
            // 진행 중인 요청이 끝나면 settle()이 스로틀을 반영해 다시 타이머를 겁니다.
            tracing::debug!(document_id = %session.document_id, "Save in flight, buffering edit");
            return;
        }

        if let Some(content) = session.pending.take() {
            let job = self.begin_save(&mut session, content);
            let inner = Arc::clone(self);
            tokio::spawn(async move {
                // 결과는 이벤트와 상태로 전달됩니다.
                let _ = inner.run(job).await;
            });
        }
    }

    /// 요청을 시작 상태로 만듭니다. 세션 잠금을 잡은 채 호출해야 합니다.
    fn begin_save(&self, session: &mut Session, content: String) -> SaveJob {
        session.is_saving = true;
        session.last_attempt = Some(self.clock.now());
        let ticket = session.tracker.begin();
        tracing::debug!(
            document_id = %session.document_id,
            expected_version = ticket.expected,
            "Starting save"
        );
        self.publish(session);

        SaveJob {
            generation: session.generation,
            discard_seq: session.discard_seq,
            document_id: session.document_id.clone(),
            content,
            ticket,
        }
    }

    async fn run(self: Arc<Self>, job: SaveJob) -> Result<Option<Document>, SaveError> {
        let outcome = self.execute(&job).await;
        self.settle(job, outcome)
    }

    /// 저장 요청을 보내고, 충돌이면 서버 사본을 다시 읽습니다.
    async fn execute(&self, job: &SaveJob) -> Outcome {
        let save = ContentSave::new(
            job.document_id.clone(),
            job.content.clone(),
            job.ticket.expected,
        );

        let error = match self.with_timeout(self.store.update_content(&save)).await {
            Ok(document) => return Outcome::Saved(document),
            Err(error) => error,
        };

        // 충돌이 아니면 해결기는 재조회 없이 바로 Failed를 돌려줍니다.
        let resolution = self
            .with_timeout(async {
                Ok::<_, SaveError>(self.resolver.resolve(&job.document_id, error.clone()).await)
            })
            .await
            .unwrap_or_else(Resolution::Failed);

        match resolution {
            Resolution::Reconciled(server) => Outcome::Reconciled { server, error },
            Resolution::Failed(error) => Outcome::Failed(error),
        }
    }

    /// 요청 하나를 저장 제한 시간과 경주시킵니다.
    async fn with_timeout<T>(
        &self,
        request: impl Future<Output = Result<T, SaveError>>,
    ) -> Result<T, SaveError> {
        let timeout = self.config.save_timeout;
        let deadline = self.clock.now() + timeout;
        tokio::select! {
            result = request => result,
            _ = self.clock.sleep_until(deadline) => Err(SaveError::TimedOut(timeout)),
        }
    }

    /// 버퍼의 내용을 다시 예약할 때의 대기 시간: 디바운스와 스로틀 잔여 시간 중 긴 쪽
    fn next_save_delay(&self, session: &Session) -> Duration {
        let throttle_left = session
            .last_attempt
            .map(|last| {
                let elapsed = self.clock.now().saturating_duration_since(last);
                self.config.throttle.saturating_sub(elapsed)
            })
            .unwrap_or_default();
        self.config.debounce.max(throttle_left)
    }

    /// 요청 결과를 세션에 반영하고 이벤트를 보냅니다.
    fn settle(self: &Arc<Self>, job: SaveJob, outcome: Outcome) -> Result<Option<Document>, SaveError> {
        let mut session = self.session.lock();

        if session.generation != job.generation {
            tracing::debug!(
                document_id = %job.document_id,
                "Discarding save result for a document that is no longer open"
            );
            return match outcome {
                Outcome::Saved(document) => Ok(Some(document)),
                Outcome::Reconciled { error, .. } | Outcome::Failed(error) => Err(error),
            };
        }

        session.is_saving = false;
        // 요청 중에 들어온 편집이 있으면 새 디바운스 주기를 잡습니다.
        // 실패한 내용을 되돌려 넣은 경우에는 자동 재시도하지 않습니다.
        let rearm = session.pending.is_some();

        let (event, result) = match outcome {
            Outcome::Saved(document) => {
                session.tracker.commit(&document);
                session.saved_content = job.content;
                session.is_dirty = session.pending.is_some();
                session.last_error = None;
                tracing::debug!(
                    document_id = %job.document_id,
                    version = document.version,
                    "Save committed"
                );
                (SaveEvent::Saved(document.clone()), Ok(Some(document)))
            }
            Outcome::Reconciled { server, error } => {
                session.tracker.rollback();
                session.tracker.reconcile(&server);
                session.saved_content = server.content.clone();
                // 요청 중에 들어온 편집은 버리지 않고 서버 버전을 기준으로 다시 저장합니다.
                session.is_dirty = session.pending.is_some();
                session.last_error = Some(error.clone());
                (
                    SaveEvent::Conflict {
                        server,
                        rejected_content: job.content,
                    },
                    Err(error),
                )
            }
            Outcome::Failed(error) => {
                session.tracker.rollback();
                if job.discard_seq == session.discard_seq {
                    session.is_dirty = true;
                    if error.kind() != ErrorKind::Validation && session.pending.is_none() {
                        session.pending = Some(job.content);
                    }
                } else {
                    // 요청 이후 사용자가 변경을 버렸습니다.
                    session.is_dirty = session.pending.is_some();
                }
                session.last_error = Some(error.clone());
                tracing::warn!(
                    document_id = %job.document_id,
                    error = %error,
                    "Save failed, keeping local changes"
                );
                (SaveEvent::Failed(error.clone()), Err(error))
            }
        };

        if rearm {
            let delay = self.next_save_delay(&session);
            self.arm_timer(&mut session, delay);
        }
        self.publish(&session);
        self.emit(event);
        result
    }
}
