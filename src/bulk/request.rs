//! Bulk action request and its wire envelope

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::{ActionPayload, BulkAction, BulkActionKind};
use crate::filter::FilterQuery;
use crate::selection::{RecordId, SelectionMode};

/// An action bound to a resolved selection snapshot.
///
/// Immutable once built; resubmitting the same value reuses its
/// `request_id`, which the backend treats as an idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionRequest<Id: RecordId> {
    action: BulkAction,
    target: SelectionMode<Id>,
    request_id: Uuid,
}

impl<Id: RecordId> BulkActionRequest<Id> {
    pub fn new(action: BulkAction, target: SelectionMode<Id>) -> Self {
        Self {
            action,
            target,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn action(&self) -> &BulkAction {
        &self.action
    }

    pub fn target(&self) -> &SelectionMode<Id> {
        &self.target
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Number of IDs carried literally; `None` for filtered targets
    pub fn explicit_len(&self) -> Option<usize> {
        match &self.target {
            SelectionMode::Explicit { included } => Some(included.len()),
            SelectionMode::AllMatching { .. } => None,
        }
    }

    /// A follow-up request for just the given IDs with the same action
    pub fn retry_for(&self, ids: impl IntoIterator<Item = Id>) -> Self {
        Self::new(
            self.action.clone(),
            SelectionMode::Explicit {
                included: ids.into_iter().collect(),
            },
        )
    }

    /// Serialize for the bulk endpoint.
    ///
    /// Filtered targets carry the predicate and exclusions only; the
    /// backend enumerates the matching set itself.
    pub fn to_envelope(&self) -> BulkActionEnvelope<Id> {
        let target = match &self.target {
            SelectionMode::Explicit { included } => TargetSpec::Explicit {
                ids: included.iter().cloned().collect(),
            },
            SelectionMode::AllMatching {
                filter_snapshot,
                excluded,
            } => TargetSpec::Filtered {
                filter: filter_snapshot.to_query(),
                excluded_ids: excluded.iter().cloned().collect(),
            },
        };
        BulkActionEnvelope {
            kind: self.action.kind(),
            payload: self.action.payload(),
            target,
        }
    }
}

/// `{ mode: "explicit", ids } | { mode: "filtered", filter, excludedIds }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TargetSpec<Id> {
    Explicit {
        ids: Vec<Id>,
    },
    Filtered {
        filter: FilterQuery,
        #[serde(rename = "excludedIds")]
        excluded_ids: Vec<Id>,
    },
}

/// Body of `POST {resource}/bulk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionEnvelope<Id> {
    pub kind: BulkActionKind,
    #[serde(default)]
    pub payload: ActionPayload,
    pub target: TargetSpec<Id>,
}
