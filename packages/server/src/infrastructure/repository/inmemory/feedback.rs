//! InMemory FeedbackRepository 実装
//!
//! The store is the single source of truth polled by callers. Terminal
//! writes are first-committer-wins: the check and the write happen in the
//! same critical section.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use feedback_collector_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    FeedbackOutcome, FeedbackRepository, FeedbackRequest, RepositoryError, RequestId, Timestamp,
};

/// インメモリ FeedbackRepository 実装
pub struct InMemoryFeedbackRepository {
    requests: Mutex<HashMap<RequestId, FeedbackRequest>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryFeedbackRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

impl Default for InMemoryFeedbackRepository {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn get(&self, request_id: &RequestId) -> Option<FeedbackRequest> {
        self.requests.lock().await.get(request_id).cloned()
    }

    async fn insert_waiting(
        &self,
        request_id: RequestId,
        timeout_seconds: u64,
    ) -> FeedbackRequest {
        let now = self.now();
        let mut requests = self.requests.lock().await;
        requests
            .entry(request_id.clone())
            .or_insert_with(|| FeedbackRequest::waiting(request_id, timeout_seconds, now))
            .clone()
    }

    async fn resolve(
        &self,
        request_id: RequestId,
        outcome: FeedbackOutcome,
    ) -> Result<FeedbackRequest, RepositoryError> {
        let now = self.now();
        let mut requests = self.requests.lock().await;
        match requests.get_mut(&request_id) {
            Some(request) => {
                request.resolve(outcome, now)?;
                Ok(request.clone())
            }
            None => {
                let request = FeedbackRequest::resolved(request_id.clone(), outcome, now);
                requests.insert(request_id, request.clone());
                Ok(request)
            }
        }
    }

    async fn remove(&self, request_id: &RequestId) -> Option<FeedbackRequest> {
        self.requests.lock().await.remove(request_id)
    }

    async fn purge_expired(&self, ttl: Duration) -> usize {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.now().value().saturating_sub(ttl_millis);
        let mut requests = self.requests.lock().await;
        let before = requests.len();
        requests.retain(|_, request| request.created_at.value() >= cutoff);
        before - requests.len()
    }

    async fn count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeedbackStatus, FeedbackSubmission, Language};
    use feedback_collector_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - waiting の登録、終端状態への遷移、削除、TTL による掃除
    //
    // 【なぜこのテストが必要か】
    // - ポーリングする呼び出し側はこのストアだけを見て結果を判断する
    // - 同じ id への二重送信で最初の結果が保たれることを保証する
    // ========================================

    fn repository_at(millis: i64) -> InMemoryFeedbackRepository {
        InMemoryFeedbackRepository::new(Arc::new(FixedClock::new(millis)))
    }

    fn request_id(value: &str) -> RequestId {
        RequestId::new(value.to_string()).unwrap()
    }

    fn submission(text: &str) -> FeedbackOutcome {
        FeedbackOutcome::Completed(FeedbackSubmission {
            text: Some(text.to_string()),
            images: vec![],
            auto_append: true,
            language: Language::CN,
            submitted_at: None,
        })
    }

    #[tokio::test]
    async fn test_get_unknown_request_is_absent() {
        // テスト項目: 未登録の id は None（呼び出し側は waiting とみなす）
        // given (前提条件):
        let repo = repository_at(1000);

        // when (操作):
        let result = repo.get(&request_id("missing")).await;

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_insert_waiting_then_resolve() {
        // テスト項目: waiting で登録したリクエストを completed にできる
        // given (前提条件):
        let repo = repository_at(1000);
        let id = request_id("r1");
        let waiting = repo.insert_waiting(id.clone(), 600).await;
        assert_eq!(waiting.status(), FeedbackStatus::Waiting);

        // when (操作):
        let resolved = repo.resolve(id.clone(), submission("hello")).await;

        // then (期待する結果):
        assert_eq!(resolved.unwrap().status(), FeedbackStatus::Completed);
        let stored = repo.get(&id).await.unwrap();
        assert_eq!(stored.status(), FeedbackStatus::Completed);
        assert_eq!(stored.timeout_seconds, Some(600));
    }

    #[tokio::test]
    async fn test_insert_waiting_does_not_clobber_terminal_entry() {
        // テスト項目: 既に終端状態の id に insert_waiting しても状態は変わらない
        // given (前提条件):
        let repo = repository_at(1000);
        let id = request_id("r1");
        repo.resolve(id.clone(), submission("done")).await.unwrap();

        // when (操作):
        let result = repo.insert_waiting(id.clone(), 600).await;

        // then (期待する結果):
        assert_eq!(result.status(), FeedbackStatus::Completed);
        assert_eq!(repo.get(&id).await.unwrap().status(), FeedbackStatus::Completed);
    }

    #[tokio::test]
    async fn test_resolve_unknown_request_creates_terminal_entry() {
        // テスト項目: 未登録の id への回答も受け付けられる
        // given (前提条件):
        let repo = repository_at(1000);

        // when (操作):
        let result = repo
            .resolve(
                request_id("late"),
                FeedbackOutcome::Cancelled {
                    reason: "user cancelled".to_string(),
                    cancelled_at: None,
                },
            )
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap().status(), FeedbackStatus::Cancelled);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_second_terminal_write_is_rejected() {
        // テスト項目: 同じ id への二回目の終端書き込みは拒否され、最初の結果が残る
        // given (前提条件):
        let repo = repository_at(1000);
        let id = request_id("r1");
        repo.insert_waiting(id.clone(), 600).await;
        repo.resolve(id.clone(), submission("first")).await.unwrap();

        // when (操作):
        let result = repo.resolve(id.clone(), submission("second")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::AlreadyTerminal {
                request_id: "r1".to_string(),
                status: FeedbackStatus::Completed,
            })
        );
        let stored = repo.get(&id).await.unwrap();
        assert_eq!(stored.outcome(), Some(&submission("first")));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_have_exactly_one_winner() {
        // テスト項目: 並行して送信された場合でも勝者はちょうど一つ
        // given (前提条件):
        let repo = Arc::new(repository_at(1000));
        let id = request_id("race");
        repo.insert_waiting(id.clone(), 600).await;

        // when (操作):
        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                repo.resolve(id, submission(&format!("answer-{}", i))).await
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }

        // then (期待する結果):
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_remove_returns_entry_once() {
        // テスト項目: remove はエントリを一度だけ返す
        // given (前提条件):
        let repo = repository_at(1000);
        let id = request_id("r1");
        repo.insert_waiting(id.clone(), 600).await;

        // when (操作):
        let first = repo.remove(&id).await;
        let second = repo.remove(&id).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_drops_only_old_entries() {
        // テスト項目: TTL より古いエントリだけが削除される
        // given (前提条件):
        let old = InMemoryFeedbackRepository::new(Arc::new(FixedClock::new(1_000)));
        old.insert_waiting(request_id("old"), 600).await;
        // 同じストアで時刻を進める代わりに、古いエントリを持つストアを新しい時計で再構成する
        let requests = std::mem::take(&mut *old.requests.lock().await);
        let repo = InMemoryFeedbackRepository {
            requests: Mutex::new(requests),
            clock: Arc::new(FixedClock::new(61_000)),
        };
        repo.insert_waiting(request_id("fresh"), 600).await;

        // when (操作):
        let purged = repo.purge_expired(Duration::from_secs(30)).await;

        // then (期待する結果):
        assert_eq!(purged, 1);
        assert!(repo.get(&request_id("old")).await.is_none());
        assert!(repo.get(&request_id("fresh")).await.is_some());
    }
}
