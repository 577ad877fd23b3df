//! 批量操作协调器集成测试
//!
//! 使用 mock 后端验证本地校验、确认流程、并发门控与失败映射。

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

use linkpanel::bulk::{
    ActionStatus, BulkAction, BulkActionCoordinator, BulkActionEnvelope, BulkActionRequest,
    BulkActionResponse, ConfirmationPrompt, CoordinatorState, FailedItem, NO_RESULT_REASON,
    TargetSpec,
};
use linkpanel::client::{BulkActionBackend, ClientError};
use linkpanel::errors::PanelError;
use linkpanel::filter::FilterState;
use linkpanel::selection::SelectionMode;

// =============================================================================
// Mocks
// =============================================================================

type Reply = Result<BulkActionResponse<String>, ClientError>;

struct MockBackend {
    calls: AtomicUsize,
    reply: Mutex<Reply>,
    last: Mutex<Option<(BulkActionEnvelope<String>, Uuid)>>,
}

impl MockBackend {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Mutex::new(reply),
            last: Mutex::new(None),
        })
    }

    fn succeeding_all() -> Arc<Self> {
        // 空响应 + explicit 目标 → 由 mock 在调用时回填全部成功
        Self::new(Ok(BulkActionResponse {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BulkActionBackend<String> for MockBackend {
    async fn submit_bulk(
        &self,
        envelope: &BulkActionEnvelope<String>,
        request_id: Uuid,
    ) -> Result<BulkActionResponse<String>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some((envelope.clone(), request_id));
        let mut reply = self.reply.lock().clone();
        if let (Ok(resp), TargetSpec::Explicit { ids }) = (&mut reply, &envelope.target)
            && resp.succeeded.is_empty()
            && resp.failed.is_empty()
        {
            resp.succeeded = ids.clone();
        }
        reply
    }
}

/// Blocks inside the call until released
struct GatedBackend {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl BulkActionBackend<String> for GatedBackend {
    async fn submit_bulk(
        &self,
        envelope: &BulkActionEnvelope<String>,
        _request_id: Uuid,
    ) -> Result<BulkActionResponse<String>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        let succeeded = match &envelope.target {
            TargetSpec::Explicit { ids } => ids.clone(),
            TargetSpec::Filtered { .. } => Vec::new(),
        };
        Ok(BulkActionResponse {
            succeeded,
            failed: Vec::new(),
        })
    }
}

struct ScriptedPrompt {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedPrompt {
    fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ConfirmationPrompt<String> for ScriptedPrompt {
    async fn confirm(&self, _request: &BulkActionRequest<String>) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn explicit(ids: &[&str]) -> SelectionMode<String> {
    SelectionMode::Explicit {
        included: ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn coordinator(
    backend: Arc<dyn BulkActionBackend<String>>,
    prompt: Arc<dyn ConfirmationPrompt<String>>,
) -> BulkActionCoordinator<String> {
    BulkActionCoordinator::new(backend, prompt, 5000)
}

// =============================================================================
// Local validation
// =============================================================================

#[tokio::test]
async fn test_block_without_reason_issues_no_request() {
    let backend = MockBackend::succeeding_all();
    let prompt = ScriptedPrompt::new(true);
    let c = coordinator(backend.clone(), prompt.clone());

    let request = BulkActionRequest::new(
        BulkAction::Block {
            reason: "  ".to_string(),
        },
        explicit(&["l1", "l2"]),
    );
    let err = c.submit(&request).await.unwrap_err();

    assert!(matches!(err, PanelError::MissingReason(_)));
    assert_eq!(backend.calls(), 0);
    assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
    assert_eq!(c.state(), CoordinatorState::Idle);
}

#[tokio::test]
async fn test_empty_selection_rejected() {
    let backend = MockBackend::succeeding_all();
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let request = BulkActionRequest::new(BulkAction::Activate, explicit(&[]));

    let err = c.submit(&request).await.unwrap_err();
    assert!(matches!(err, PanelError::EmptySelection(_)));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_batch_too_large_rejected() {
    let backend = MockBackend::succeeding_all();
    let c = BulkActionCoordinator::new(backend.clone(), ScriptedPrompt::new(true), 3);
    let request = BulkActionRequest::new(BulkAction::Approve, explicit(&["1", "2", "3", "4"]));

    let err = c.submit(&request).await.unwrap_err();
    assert!(matches!(err, PanelError::BatchTooLarge(_)));
    assert_eq!(backend.calls(), 0);

    // all-matching 目标不受显式上限约束
    let request = BulkActionRequest::new(
        BulkAction::Approve,
        SelectionMode::AllMatching {
            filter_snapshot: FilterState::default(),
            excluded: HashSet::new(),
        },
    );
    assert!(c.submit(&request).await.is_ok());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_notify_requires_message() {
    let backend = MockBackend::succeeding_all();
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let request = BulkActionRequest::new(
        BulkAction::Notify {
            message: String::new(),
        },
        explicit(&["u1"]),
    );
    assert!(matches!(
        c.submit(&request).await,
        Err(PanelError::Validation(_))
    ));
    assert_eq!(backend.calls(), 0);
}

// =============================================================================
// Confirmation
// =============================================================================

#[tokio::test]
async fn test_declined_confirmation_cancels() {
    let backend = MockBackend::succeeding_all();
    let prompt = ScriptedPrompt::new(false);
    let c = coordinator(backend.clone(), prompt.clone());
    let request = BulkActionRequest::new(
        BulkAction::Reject {
            reason: "duplicate".to_string(),
        },
        explicit(&["w1"]),
    );

    let err = c.submit(&request).await.unwrap_err();
    assert!(matches!(err, PanelError::Cancelled(_)));
    assert_eq!(prompt.asked.load(Ordering::SeqCst), 1);
    assert_eq!(backend.calls(), 0);
    assert_eq!(c.state(), CoordinatorState::Idle);
    assert!(!c.is_submitting());
}

#[tokio::test]
async fn test_non_destructive_skips_confirmation() {
    let backend = MockBackend::succeeding_all();
    let prompt = ScriptedPrompt::new(false);
    let c = coordinator(backend.clone(), prompt.clone());
    let request = BulkActionRequest::new(BulkAction::Activate, explicit(&["l1"]));

    let result = c.submit(&request).await.unwrap();
    assert_eq!(result.status(), ActionStatus::Succeeded);
    assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
    assert_eq!(backend.calls(), 1);
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_confirmed_block_succeeds() {
    let backend = MockBackend::succeeding_all();
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let request = BulkActionRequest::new(
        BulkAction::Block {
            reason: "phishing".to_string(),
        },
        explicit(&["l1", "l2"]),
    );

    let result = c.submit(&request).await.unwrap();
    assert_eq!(result.status(), ActionStatus::Succeeded);
    assert_eq!(result.succeeded.len(), 2);
    assert_eq!(c.state(), CoordinatorState::Succeeded);

    let record = c.last_record().unwrap();
    assert_eq!(record.request_id, request.request_id());
    assert_eq!(record.succeeded, 2);

    let (envelope, request_id) = backend.last.lock().clone().unwrap();
    assert_eq!(request_id, request.request_id());
    assert_eq!(envelope.payload.reason.as_deref(), Some("phishing"));

    c.acknowledge();
    assert_eq!(c.state(), CoordinatorState::Idle);
}

#[tokio::test]
async fn test_all_matching_sends_filter_not_ids() {
    let backend = MockBackend::new(Ok(BulkActionResponse {
        succeeded: vec!["a".to_string(), "b".to_string()],
        failed: Vec::new(),
    }));
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let filter = FilterState::default()
        .with_facet("status", "pending")
        .with_page(7);
    let request = BulkActionRequest::new(
        BulkAction::Approve,
        SelectionMode::AllMatching {
            filter_snapshot: filter,
            excluded: ["x".to_string()].into_iter().collect(),
        },
    );

    c.submit(&request).await.unwrap();
    let (envelope, _) = backend.last.lock().clone().unwrap();
    match envelope.target {
        TargetSpec::Filtered {
            filter,
            excluded_ids,
        } => {
            assert_eq!(filter.facets.get("status").map(String::as_str), Some("pending"));
            assert_eq!(excluded_ids, vec!["x".to_string()]);
        }
        other => panic!("expected filtered target, got {:?}", other),
    }
}

#[tokio::test]
async fn test_partial_failure_is_data() {
    let backend = MockBackend::new(Ok(BulkActionResponse {
        succeeded: vec!["a".to_string()],
        failed: vec![FailedItem {
            id: "b".to_string(),
            reason: "already suspended".to_string(),
        }],
    }));
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let request = BulkActionRequest::new(
        BulkAction::Suspend {
            reason: "abuse".to_string(),
        },
        explicit(&["a", "b", "c"]),
    );

    let result = c.submit(&request).await.unwrap();
    assert_eq!(result.status(), ActionStatus::PartiallyFailed);
    assert_eq!(c.state(), CoordinatorState::PartiallyFailed);
    assert_eq!(result.failure_for(&"b".to_string()), Some("already suspended"));
    // 后端未提及的 ID 视为失败
    assert_eq!(result.failure_for(&"c".to_string()), Some(NO_RESULT_REASON));
    assert!(result.request_error.is_none());
}

#[tokio::test]
async fn test_timeout_marks_every_id_failed() {
    let backend = MockBackend::new(Err(ClientError::Timeout));
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let request = BulkActionRequest::new(BulkAction::Activate, explicit(&["a", "b", "c"]));

    let result = c.submit(&request).await.unwrap();
    assert_eq!(result.status(), ActionStatus::Failed);
    assert_eq!(c.state(), CoordinatorState::Failed);
    assert!(result.succeeded.is_empty());
    assert_eq!(result.failed.len(), 3);
    assert!(result.request_error.as_deref().unwrap().contains("timed out"));
    for id in ["a", "b", "c"] {
        assert!(result.failure_for(&id.to_string()).is_some());
    }
}

#[tokio::test]
async fn test_resubmitting_same_request_reuses_request_id() {
    let backend = MockBackend::new(Err(ClientError::Status {
        status: 502,
        message: "bad gateway".to_string(),
    }));
    let c = coordinator(backend.clone(), ScriptedPrompt::new(true));
    let request = BulkActionRequest::new(BulkAction::Activate, explicit(&["a"]));

    c.submit(&request).await.unwrap();
    let (_, first) = backend.last.lock().clone().unwrap();
    c.submit(&request).await.unwrap();
    let (_, second) = backend.last.lock().clone().unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_rejected() {
    let backend = Arc::new(GatedBackend {
        calls: AtomicUsize::new(0),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let c = Arc::new(coordinator(backend.clone(), ScriptedPrompt::new(true)));
    let request = BulkActionRequest::new(BulkAction::Activate, explicit(&["a", "b"]));

    let task = {
        let c = c.clone();
        let request = request.clone();
        tokio::spawn(async move { c.submit(&request).await })
    };

    backend.entered.notified().await;
    assert!(c.is_submitting());
    assert_eq!(c.state(), CoordinatorState::Submitting);

    let err = c.submit(&request).await.unwrap_err();
    assert!(matches!(err, PanelError::AlreadySubmitting(_)));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

    backend.release.notify_one();
    let result = task.await.unwrap().unwrap();
    assert_eq!(result.status(), ActionStatus::Succeeded);
    assert!(!c.is_submitting());
}
