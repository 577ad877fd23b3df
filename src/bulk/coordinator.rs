//! Bulk action submission
//!
//! Protocol:
//!
//! ```text
//! Idle ─▶ (AwaitingConfirmation) ─▶ Submitting ─▶ Succeeded | PartiallyFailed | Failed ─▶ Idle
//! ```
//!
//! Destructive kinds stop at `AwaitingConfirmation` until the injected
//! `ConfirmationPrompt` answers; declining is the only cancellation point.
//! Once the request is sent it runs to completion. Backend and transport
//! failures come back as data in `BulkActionResult`, never as `Err`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::action::BulkActionKind;
use super::request::BulkActionRequest;
use super::result::{ActionStatus, BulkActionResult};
use crate::client::BulkActionBackend;
use crate::errors::{PanelError, Result};
use crate::selection::{RecordId, SelectionMode};

/// The user-facing confirmation step for destructive actions
#[async_trait]
pub trait ConfirmationPrompt<Id: RecordId>: Send + Sync {
    /// Return `true` only after the user explicitly confirmed
    async fn confirm(&self, request: &BulkActionRequest<Id>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    AwaitingConfirmation,
    Submitting,
    Succeeded,
    PartiallyFailed,
    Failed,
}

impl CoordinatorState {
    fn is_busy(self) -> bool {
        matches!(self, Self::AwaitingConfirmation | Self::Submitting)
    }
}

impl From<ActionStatus> for CoordinatorState {
    fn from(status: ActionStatus) -> Self {
        match status {
            ActionStatus::Succeeded => Self::Succeeded,
            ActionStatus::PartiallyFailed => Self::PartiallyFailed,
            ActionStatus::Failed => Self::Failed,
        }
    }
}

/// Summary of the last finished submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub request_id: Uuid,
    pub kind: BulkActionKind,
    pub status: ActionStatus,
    pub succeeded: usize,
    pub failed: usize,
    pub finished_at: DateTime<Utc>,
}

pub struct BulkActionCoordinator<Id: RecordId> {
    backend: Arc<dyn BulkActionBackend<Id>>,
    prompt: Arc<dyn ConfirmationPrompt<Id>>,
    max_explicit_ids: usize,
    state: Mutex<CoordinatorState>,
    last: Mutex<Option<ActionRecord>>,
}

/// Puts the coordinator back to `Idle` if a submission future is dropped
/// before it finished.
struct BusyGuard<'a> {
    state: &'a Mutex<CoordinatorState>,
    armed: bool,
}

impl BusyGuard<'_> {
    fn finish(mut self, next: CoordinatorState) {
        *self.state.lock() = next;
        self.armed = false;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock() = CoordinatorState::Idle;
        }
    }
}

impl<Id: RecordId> BulkActionCoordinator<Id> {
    pub fn new(
        backend: Arc<dyn BulkActionBackend<Id>>,
        prompt: Arc<dyn ConfirmationPrompt<Id>>,
        max_explicit_ids: usize,
    ) -> Self {
        Self {
            backend,
            prompt,
            max_explicit_ids: max_explicit_ids.max(1),
            state: Mutex::new(CoordinatorState::Idle),
            last: Mutex::new(None),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.lock()
    }

    /// The single re-submission gate for the UI
    pub fn is_submitting(&self) -> bool {
        self.state().is_busy()
    }

    pub fn last_record(&self) -> Option<ActionRecord> {
        self.last.lock().clone()
    }

    /// Dismiss a finished outcome
    pub fn acknowledge(&self) {
        let mut state = self.state.lock();
        if !state.is_busy() {
            *state = CoordinatorState::Idle;
        }
    }

    /// Validate without touching state or the network
    pub fn validate(&self, request: &BulkActionRequest<Id>) -> Result<()> {
        request.action().validate()?;
        match request.target() {
            SelectionMode::Explicit { included } if included.is_empty() => {
                Err(PanelError::empty_selection("Nothing is selected"))
            }
            SelectionMode::Explicit { included } if included.len() > self.max_explicit_ids => {
                Err(PanelError::batch_too_large(format!(
                    "Batch size {} exceeds maximum {}",
                    included.len(),
                    self.max_explicit_ids
                )))
            }
            _ => Ok(()),
        }
    }

    fn claim(&self, first: CoordinatorState) -> Result<BusyGuard<'_>> {
        let mut state = self.state.lock();
        if state.is_busy() {
            return Err(PanelError::already_submitting(
                "A bulk action is already in progress",
            ));
        }
        *state = first;
        Ok(BusyGuard {
            state: &self.state,
            armed: true,
        })
    }

    pub async fn submit(&self, request: &BulkActionRequest<Id>) -> Result<BulkActionResult<Id>> {
        self.validate(request)?;

        let kind = request.action().kind();
        let destructive = kind.is_destructive();
        let guard = self.claim(if destructive {
            CoordinatorState::AwaitingConfirmation
        } else {
            CoordinatorState::Submitting
        })?;

        if destructive {
            debug!("Bulk {} awaiting confirmation", kind);
            if !self.prompt.confirm(request).await {
                info!("Bulk {} cancelled at confirmation", kind);
                guard.finish(CoordinatorState::Idle);
                return Err(PanelError::cancelled(format!("{} was not confirmed", kind)));
            }
            *self.state.lock() = CoordinatorState::Submitting;
        }

        match request.explicit_len() {
            Some(n) => info!(
                "Bulk {} request {} submitted - {} explicit ids",
                kind,
                request.request_id(),
                n
            ),
            None => info!(
                "Bulk {} request {} submitted - all matching filter",
                kind,
                request.request_id()
            ),
        }

        let envelope = request.to_envelope();
        let result = match self
            .backend
            .submit_bulk(&envelope, request.request_id())
            .await
        {
            Ok(response) => BulkActionResult::from_response(request.target(), response),
            Err(e) => {
                warn!(
                    "Bulk {} request {} failed without per-item results: {}",
                    kind,
                    request.request_id(),
                    e
                );
                BulkActionResult::all_failed(request.target(), e.to_string())
            }
        };

        let status = result.status();
        info!(
            "Bulk {} completed - {} succeeded, {} failed ({:?})",
            kind,
            result.succeeded.len(),
            result.failed.len(),
            status
        );

        *self.last.lock() = Some(ActionRecord {
            request_id: request.request_id(),
            kind,
            status,
            succeeded: result.succeeded.len(),
            failed: result.failed.len(),
            finished_at: Utc::now(),
        });
        guard.finish(status.into());

        Ok(result)
    }
}
