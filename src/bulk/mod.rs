//! Bulk actions over a selection
//!
//! - `action`: action kinds and payloads, local validation
//! - `request`: request snapshot and wire envelope
//! - `result`: per-item outcomes and status
//! - `coordinator`: confirmation, single-flight submission, failure mapping

mod action;
mod coordinator;
mod request;
mod result;

pub use action::{ActionPayload, BulkAction, BulkActionKind};
pub use coordinator::{ActionRecord, BulkActionCoordinator, ConfirmationPrompt, CoordinatorState};
pub use request::{BulkActionEnvelope, BulkActionRequest, TargetSpec};
pub use result::{ActionStatus, BulkActionResponse, BulkActionResult, FailedItem, NO_RESULT_REASON};
