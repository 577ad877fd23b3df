//! The three admin lists and the actions each one offers

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::bulk::BulkActionKind;
use crate::errors::{PanelError, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceKind {
    Links,
    Users,
    Withdrawals,
}

impl ResourceKind {
    pub fn parse(s: &str) -> Result<Self> {
        s.trim().parse().map_err(|_| {
            let valid: Vec<String> = Self::iter().map(|r| r.to_string()).collect();
            PanelError::validation(format!(
                "Unknown list: '{}'. Valid: {}",
                s,
                valid.join(", ")
            ))
        })
    }

    /// Path segment under the API base
    pub fn path(self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::Users => "users",
            Self::Withdrawals => "withdrawals",
        }
    }

    pub fn allowed_actions(self) -> &'static [BulkActionKind] {
        match self {
            Self::Links => &[BulkActionKind::Activate, BulkActionKind::Block],
            Self::Users => &[
                BulkActionKind::Activate,
                BulkActionKind::Suspend,
                BulkActionKind::Notify,
            ],
            Self::Withdrawals => &[BulkActionKind::Approve, BulkActionKind::Reject],
        }
    }

    pub fn allows(self, kind: BulkActionKind) -> bool {
        self.allowed_actions().contains(&kind)
    }

    /// Facets the list view offers as filters
    pub fn facet_names(self) -> &'static [&'static str] {
        match self {
            Self::Links => &["status", "domain"],
            Self::Users => &["status", "role"],
            Self::Withdrawals => &["status", "currency"],
        }
    }

    pub fn check_action(self, kind: BulkActionKind) -> Result<()> {
        if self.allows(kind) {
            return Ok(());
        }
        let valid: Vec<String> = self
            .allowed_actions()
            .iter()
            .map(|k| k.to_string())
            .collect();
        Err(PanelError::unsupported_action(format!(
            "{} does not support '{}'. Valid: {}",
            self,
            kind,
            valid.join(", ")
        )))
    }
}
