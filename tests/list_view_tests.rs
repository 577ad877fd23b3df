//! 列表视图集成测试
//!
//! In-memory fetcher and backend drive a `ListView` end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use linkpanel::bulk::{
    ActionStatus, BulkAction, BulkActionCoordinator, BulkActionEnvelope, BulkActionRequest,
    BulkActionResponse, BulkActionResult, ConfirmationPrompt, FailedItem, TargetSpec,
};
use linkpanel::client::{BulkActionBackend, ClientError, JsonRecord, ListRecord, Page, PageFetcher, RowEffect};
use linkpanel::errors::PanelError;
use linkpanel::filter::FilterState;
use linkpanel::selection::SelectionSet;
use linkpanel::view::{ListView, PanelEvents, ResourceKind};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Withdrawal {
    id: u32,
    status: String,
}

impl ListRecord for Withdrawal {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn apply_action(&mut self, action: &BulkAction) -> RowEffect {
        match action {
            BulkAction::Approve => self.status = "approved".to_string(),
            BulkAction::Reject { .. } => self.status = "rejected".to_string(),
            _ => return RowEffect::Keep,
        }
        // 已处理的提现离开 pending 列表
        RowEffect::Remove
    }
}

struct MemoryFetcher<R> {
    rows: Vec<R>,
    status_of: fn(&R) -> String,
    fail: AtomicBool,
    fetches: AtomicUsize,
}

#[async_trait]
impl<R: ListRecord> PageFetcher<R> for MemoryFetcher<R> {
    async fn fetch_page(&self, filter: &FilterState) -> Result<Page<R>, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        let matching: Vec<R> = self
            .rows
            .iter()
            .filter(|r| filter.facet("status").is_none_or(|s| (self.status_of)(r) == s))
            .cloned()
            .collect();
        let size = filter.page_size() as usize;
        let start = (filter.page() as usize - 1) * size;
        Ok(Page {
            total_matching_count: matching.len() as u64,
            items: matching.into_iter().skip(start).take(size).collect(),
            page: filter.page(),
            page_size: filter.page_size(),
        })
    }
}

/// Fails the configured IDs, succeeds the rest of an explicit target
struct ScriptBackend<Id> {
    fail: Vec<Id>,
    calls: AtomicUsize,
}

#[async_trait]
impl<Id> BulkActionBackend<Id> for ScriptBackend<Id>
where
    Id: linkpanel::selection::RecordId,
{
    async fn submit_bulk(
        &self,
        envelope: &BulkActionEnvelope<Id>,
        _request_id: Uuid,
    ) -> Result<BulkActionResponse<Id>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ids = match &envelope.target {
            TargetSpec::Explicit { ids } => ids.clone(),
            TargetSpec::Filtered { .. } => Vec::new(),
        };
        let (failed, succeeded): (Vec<Id>, Vec<Id>) =
            ids.into_iter().partition(|id| self.fail.contains(id));
        Ok(BulkActionResponse {
            succeeded,
            failed: failed
                .into_iter()
                .map(|id| FailedItem {
                    id,
                    reason: "locked by another admin".to_string(),
                })
                .collect(),
        })
    }
}

struct Yes;

#[async_trait]
impl<Id: linkpanel::selection::RecordId> ConfirmationPrompt<Id> for Yes {
    async fn confirm(&self, _request: &BulkActionRequest<Id>) -> bool {
        true
    }
}

#[derive(Default)]
struct CountingEvents {
    selection_changes: AtomicUsize,
    completed: Mutex<Vec<ActionStatus>>,
}

impl<Id: linkpanel::selection::RecordId> PanelEvents<Id> for CountingEvents {
    fn on_selection_changed(&self, _selection: &SelectionSet<Id>) {
        self.selection_changes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_action_completed(&self, result: &BulkActionResult<Id>) {
        self.completed.lock().push(result.status());
    }
}

fn withdrawals(n: u32) -> Vec<Withdrawal> {
    (1..=n)
        .map(|id| Withdrawal {
            id,
            status: if id % 5 == 0 { "approved" } else { "pending" }.to_string(),
        })
        .collect()
}

struct Harness {
    view: ListView<Withdrawal>,
    fetcher: Arc<MemoryFetcher<Withdrawal>>,
    backend: Arc<ScriptBackend<u32>>,
    events: Arc<CountingEvents>,
}

fn harness(fail: Vec<u32>) -> Harness {
    let fetcher = Arc::new(MemoryFetcher {
        rows: withdrawals(50),
        status_of: |w: &Withdrawal| w.status.clone(),
        fail: AtomicBool::new(false),
        fetches: AtomicUsize::new(0),
    });
    let backend = Arc::new(ScriptBackend {
        fail,
        calls: AtomicUsize::new(0),
    });
    let events = Arc::new(CountingEvents::default());
    let coordinator = Arc::new(BulkActionCoordinator::new(backend.clone(), Arc::new(Yes), 5000));
    let view = ListView::new(
        ResourceKind::Withdrawals,
        FilterState::new(10).with_facet("status", "pending"),
        fetcher.clone(),
        coordinator,
    )
    .with_events(events.clone());
    Harness {
        view,
        fetcher,
        backend,
        events,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_refresh_loads_page_and_total() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();

    assert_eq!(h.view.items().len(), 10);
    assert_eq!(h.view.total_matching(), Some(40));
    assert_eq!(h.view.selection().visible_ids().len(), 10);
    assert_eq!(h.view.selected_count(), Some(0));
}

#[tokio::test]
async fn test_select_all_matching_counts_across_pages() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();
    h.view.select_all_matching();
    h.view.toggle(1);
    h.view.toggle(2);

    assert_eq!(h.view.selected_count(), Some(38));

    h.view.go_to_page(2).await.unwrap();
    assert!(h.view.selection().mode().is_all_matching());
    assert_eq!(h.view.selected_count(), Some(38));
}

#[tokio::test]
async fn test_header_checkbox_selects_page_only() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();
    h.view.toggle_all_visible();

    assert!(!h.view.selection().mode().is_all_matching());
    assert_eq!(h.view.selected_count(), Some(10));
    assert!(h.view.selection().all_visible_selected());

    h.view.toggle_all_visible();
    assert_eq!(h.view.selected_count(), Some(0));
}

#[tokio::test]
async fn test_filter_change_resets_all_matching() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();
    h.view.select_all_matching();
    let before = h.events.selection_changes.load(Ordering::SeqCst);

    let next = h.view.filter().with_facet("status", "approved");
    assert!(h.view.set_filter(next));
    assert!(h.view.selection().mode().is_empty());
    assert!(h.events.selection_changes.load(Ordering::SeqCst) > before);

    // 仅翻页不影响选择
    h.view.select_all_matching();
    let paged = h.view.filter().with_page(2);
    assert!(!h.view.set_filter(paged));
    assert!(h.view.selection().mode().is_all_matching());
}

#[tokio::test]
async fn test_run_partial_failure_updates_rows_and_selection() {
    let mut h = harness(vec![3]);
    h.view.refresh().await.unwrap();
    for id in [1, 2, 3] {
        h.view.toggle(id);
    }

    let result = h.view.run(BulkAction::Approve).await.unwrap();
    assert_eq!(result.status(), ActionStatus::PartiallyFailed);
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 1);

    // 成功的行被移出 pending 视图，失败的行保留并带原因
    let ids: Vec<u32> = h.view.items().iter().map(|w| w.id).collect();
    assert!(!ids.contains(&1));
    assert!(!ids.contains(&2));
    assert!(ids.contains(&3));
    assert_eq!(h.view.total_matching(), Some(38));
    assert_eq!(h.view.row_error(&3), Some("locked by another admin"));
    assert_eq!(h.view.row_error(&4), None);

    assert_eq!(h.view.selected_count(), Some(1));
    assert!(h.view.selection().is_selected(&3));
    assert_eq!(
        h.events.completed.lock().as_slice(),
        &[ActionStatus::PartiallyFailed]
    );
}

#[tokio::test]
async fn test_retry_after_partial_failure() {
    let mut h = harness(vec![3]);
    h.view.refresh().await.unwrap();
    h.view.toggle(3);
    h.view.run(BulkAction::Approve).await.unwrap();
    assert!(h.view.selection().is_selected(&3));

    // 再次提交剩余选择即为重试
    let result = h.view.run(BulkAction::Approve).await.unwrap();
    assert_eq!(result.status(), ActionStatus::Failed);
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresh_clears_row_errors() {
    let mut h = harness(vec![4]);
    h.view.refresh().await.unwrap();
    h.view.toggle(4);
    h.view
        .run(BulkAction::Reject {
            reason: "invalid account".to_string(),
        })
        .await
        .unwrap();
    assert!(h.view.row_error(&4).is_some());

    h.view.refresh().await.unwrap();
    assert!(h.view.row_error(&4).is_none());
}

#[tokio::test]
async fn test_unsupported_action_never_submits() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();
    h.view.toggle(1);

    let err = h
        .view
        .run(BulkAction::Block {
            reason: "spam".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::UnsupportedAction(_)));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
    assert!(h.view.selection().is_selected(&1));
}

#[tokio::test]
async fn test_missing_reason_keeps_selection() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();
    h.view.toggle(1);

    let err = h
        .view
        .run(BulkAction::Reject {
            reason: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::MissingReason(_)));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.view.selected_count(), Some(1));
}

#[tokio::test]
async fn test_fetch_failure_keeps_previous_rows() {
    let mut h = harness(vec![]);
    h.view.refresh().await.unwrap();
    h.fetcher.fail.store(true, Ordering::SeqCst);

    let err = h.view.refresh().await.unwrap_err();
    assert!(matches!(err, PanelError::Client(_)));
    assert!(err.message().contains("connection refused"));
    assert_eq!(h.view.items().len(), 10);
    assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_json_records_keep_rows_and_flip_status() {
    let rows: Vec<JsonRecord> = serde_json::from_str(
        r#"[{"id":"l1","status":"active"},{"id":"l2","status":"active"},{"id":"l3","status":"disabled"}]"#,
    )
    .unwrap();
    let fetcher = Arc::new(MemoryFetcher {
        rows,
        status_of: |r: &JsonRecord| r.status().unwrap_or_default().to_string(),
        fail: AtomicBool::new(false),
        fetches: AtomicUsize::new(0),
    });
    let backend = Arc::new(ScriptBackend::<String> {
        fail: vec![],
        calls: AtomicUsize::new(0),
    });
    let coordinator = Arc::new(BulkActionCoordinator::new(backend, Arc::new(Yes), 5000));
    let mut view = ListView::new(ResourceKind::Links, FilterState::default(), fetcher, coordinator);

    view.refresh().await.unwrap();
    view.toggle("l1".to_string());
    view.toggle("l2".to_string());
    view.run(BulkAction::Block {
        reason: "malware".to_string(),
    })
    .await
    .unwrap();

    assert_eq!(view.items().len(), 3);
    let statuses: Vec<_> = view.items().iter().map(|r| r.status()).collect();
    assert_eq!(statuses, vec![Some("blocked"), Some("blocked"), Some("disabled")]);
    assert_eq!(view.selected_count(), Some(0));
}

/// Every submission times out before the backend answers
struct TimeoutBackend;

#[async_trait]
impl BulkActionBackend<u32> for TimeoutBackend {
    async fn submit_bulk(
        &self,
        _envelope: &BulkActionEnvelope<u32>,
        _request_id: Uuid,
    ) -> Result<BulkActionResponse<u32>, ClientError> {
        Err(ClientError::Timeout)
    }
}

#[tokio::test]
async fn test_timeout_on_all_matching_marks_visible_targets() {
    let fetcher = Arc::new(MemoryFetcher {
        rows: withdrawals(50),
        status_of: |w: &Withdrawal| w.status.clone(),
        fail: AtomicBool::new(false),
        fetches: AtomicUsize::new(0),
    });
    let coordinator = Arc::new(BulkActionCoordinator::new(
        Arc::new(TimeoutBackend),
        Arc::new(Yes),
        5000,
    ));
    let mut view = ListView::new(
        ResourceKind::Withdrawals,
        FilterState::new(10).with_facet("status", "pending"),
        fetcher,
        coordinator,
    );
    view.refresh().await.unwrap();
    view.select_all_matching();
    view.toggle(2);

    let result = view
        .run(BulkAction::Reject {
            reason: "duplicate".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(result.status(), ActionStatus::Failed);
    assert!(result.request_error.is_some());

    // 没有逐项明细：每个可见且被选中的行都显示同一原因
    let reason = view.row_error(&1).map(str::to_string);
    assert!(reason.is_some());
    for row in view.items() {
        if row.id == 2 {
            assert_eq!(view.row_error(&2), None);
        } else {
            assert_eq!(view.row_error(&row.id).map(str::to_string), reason);
        }
    }
    assert_eq!(view.items().len(), 10);
    assert!(view.selection().mode().is_all_matching());
}
