//! Bulk action outcomes

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::filter::TS_EXPORT_PATH;
use crate::selection::{RecordId, SelectionMode};

/// Reason recorded for explicit IDs the backend did not report on
pub const NO_RESULT_REASON: &str = "no result returned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem<Id> {
    pub id: Id,
    pub reason: String,
}

/// Response body of the bulk endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "Id: Deserialize<'de>"))]
pub struct BulkActionResponse<Id> {
    #[serde(default)]
    pub succeeded: Vec<Id>,
    #[serde(default)]
    pub failed: Vec<FailedItem<Id>>,
}

/// 批量操作结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub enum ActionStatus {
    Succeeded,
    PartiallyFailed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionResult<Id: RecordId> {
    pub succeeded: HashSet<Id>,
    /// Per-item failures in the order the backend reported them
    pub failed: Vec<FailedItem<Id>>,
    /// Set when the request failed as a whole with no per-item breakdown
    pub request_error: Option<String>,
}

impl<Id: RecordId> BulkActionResult<Id> {
    /// Whole-request failure for a filtered target (nothing to enumerate)
    pub fn request_failed(reason: impl Into<String>) -> Self {
        Self {
            succeeded: HashSet::new(),
            failed: Vec::new(),
            request_error: Some(reason.into()),
        }
    }

    /// Whole-request failure: every targeted explicit ID failed with the same reason
    pub fn all_failed(target: &SelectionMode<Id>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let failed = match target {
            SelectionMode::Explicit { included } => included
                .iter()
                .map(|id| FailedItem {
                    id: id.clone(),
                    reason: reason.clone(),
                })
                .collect(),
            SelectionMode::AllMatching { .. } => Vec::new(),
        };
        Self {
            succeeded: HashSet::new(),
            failed,
            request_error: Some(reason),
        }
    }

    /// Turn a backend response into a result for `target`.
    ///
    /// For explicit targets IDs outside the target are dropped and targeted
    /// IDs the backend did not mention are reported failed, so
    /// `succeeded ∪ failed == included` always holds. An ID reported both
    /// ways counts as failed.
    pub fn from_response(target: &SelectionMode<Id>, response: BulkActionResponse<Id>) -> Self {
        let mut failed: Vec<FailedItem<Id>> = Vec::with_capacity(response.failed.len());
        let mut failed_ids: HashSet<Id> = HashSet::new();
        for item in response.failed {
            if failed_ids.insert(item.id.clone()) {
                failed.push(item);
            }
        }
        let mut succeeded: HashSet<Id> = response
            .succeeded
            .into_iter()
            .filter(|id| !failed_ids.contains(id))
            .collect();

        if let SelectionMode::Explicit { included } = target {
            succeeded.retain(|id| included.contains(id));
            failed.retain(|item| included.contains(&item.id));
            for id in included {
                if !succeeded.contains(id) && !failed_ids.contains(id) {
                    failed.push(FailedItem {
                        id: id.clone(),
                        reason: NO_RESULT_REASON.to_string(),
                    });
                }
            }
        }

        Self {
            succeeded,
            failed,
            request_error: None,
        }
    }

    pub fn status(&self) -> ActionStatus {
        if self.request_error.is_some() || (self.succeeded.is_empty() && !self.failed.is_empty()) {
            ActionStatus::Failed
        } else if !self.failed.is_empty() {
            ActionStatus::PartiallyFailed
        } else {
            ActionStatus::Succeeded
        }
    }

    pub fn failure_for(&self, id: &Id) -> Option<&str> {
        self.failed
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.reason.as_str())
    }
}
