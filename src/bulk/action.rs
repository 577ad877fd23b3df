//! Bulk action kinds and their payloads

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use ts_rs::TS;

use crate::errors::{PanelError, Result};
use crate::filter::TS_EXPORT_PATH;

/// 批量操作类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumIter, AsRefStr, Display,
)]
#[ts(export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BulkActionKind {
    Activate,
    Block,
    Suspend,
    Notify,
    Approve,
    Reject,
}

impl BulkActionKind {
    /// Kinds that need a confirmation step and a reason
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Block | Self::Reject | Self::Suspend)
    }
}

impl std::str::FromStr for BulkActionKind {
    type Err = PanelError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "activate" => Ok(Self::Activate),
            "block" => Ok(Self::Block),
            "suspend" => Ok(Self::Suspend),
            "notify" => Ok(Self::Notify),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(PanelError::unsupported_action(format!(
                "Unknown action: '{}'. Valid: activate, block, suspend, notify, approve, reject",
                s
            ))),
        }
    }
}

/// A bulk action with its kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Block { reason: String },
    Suspend { reason: String },
    Notify { message: String },
    Approve,
    Reject { reason: String },
}

/// Wire form of the payload; only the fields the kind uses are present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export_to = TS_EXPORT_PATH)]
pub struct ActionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BulkAction {
    pub fn kind(&self) -> BulkActionKind {
        match self {
            Self::Activate => BulkActionKind::Activate,
            Self::Block { .. } => BulkActionKind::Block,
            Self::Suspend { .. } => BulkActionKind::Suspend,
            Self::Notify { .. } => BulkActionKind::Notify,
            Self::Approve => BulkActionKind::Approve,
            Self::Reject { .. } => BulkActionKind::Reject,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.kind().is_destructive()
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Block { reason } | Self::Suspend { reason } | Self::Reject { reason } => {
                Some(reason)
            }
            _ => None,
        }
    }

    /// Build from a kind and optional user input, as a CLI or form would
    pub fn from_parts(
        kind: BulkActionKind,
        reason: Option<String>,
        message: Option<String>,
    ) -> Self {
        let reason = reason.unwrap_or_default();
        match kind {
            BulkActionKind::Activate => Self::Activate,
            BulkActionKind::Block => Self::Block { reason },
            BulkActionKind::Suspend => Self::Suspend { reason },
            BulkActionKind::Notify => Self::Notify {
                message: message.unwrap_or_default(),
            },
            BulkActionKind::Approve => Self::Approve,
            BulkActionKind::Reject => Self::Reject { reason },
        }
    }

    /// Local validation, run before any network call
    pub fn validate(&self) -> Result<()> {
        if self.is_destructive() && self.reason().is_none_or(|r| r.trim().is_empty()) {
            return Err(PanelError::missing_reason(format!(
                "A reason is required to {}",
                self.kind()
            )));
        }
        if let Self::Notify { message } = self
            && message.trim().is_empty()
        {
            return Err(PanelError::validation("Notification message must not be empty"));
        }
        Ok(())
    }

    pub fn payload(&self) -> ActionPayload {
        match self {
            Self::Block { reason } | Self::Suspend { reason } | Self::Reject { reason } => {
                ActionPayload {
                    reason: Some(reason.trim().to_string()),
                    message: None,
                }
            }
            Self::Notify { message } => ActionPayload {
                reason: None,
                message: Some(message.clone()),
            },
            Self::Activate | Self::Approve => ActionPayload::default(),
        }
    }
}
