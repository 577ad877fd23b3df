//! Paged fetch response and the record contract

use serde::{Deserialize, Deserializer, Serialize};

use crate::bulk::BulkAction;
use crate::selection::RecordId;

/// What happens to a row after an action succeeded on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEffect {
    /// Row stays, with its new state applied
    Keep,
    /// Row no longer belongs in the list (e.g. it left a status facet)
    Remove,
}

/// The only thing the core needs from a record: its ID, and how a
/// successful action changes it.
pub trait ListRecord: Clone + Send + Sync + 'static {
    type Id: RecordId;

    fn id(&self) -> Self::Id;

    fn apply_action(&mut self, action: &BulkAction) -> RowEffect {
        let _ = action;
        RowEffect::Keep
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total_matching_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<R: ListRecord> Page<R> {
    pub fn ids(&self) -> Vec<R::Id> {
        self.items.iter().map(ListRecord::id).collect()
    }
}

/// Shape-agnostic record: an `id` plus whatever else the backend sent.
///
/// Actions flip the `status` field, which is how the panel lists render state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl JsonRecord {
    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(|v| v.as_str())
    }
}

impl ListRecord for JsonRecord {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn apply_action(&mut self, action: &BulkAction) -> RowEffect {
        let status = match action {
            BulkAction::Activate => "active",
            BulkAction::Block { .. } => "blocked",
            BulkAction::Suspend { .. } => "suspended",
            BulkAction::Approve => "approved",
            BulkAction::Reject { .. } => "rejected",
            BulkAction::Notify { .. } => return RowEffect::Keep,
        };
        self.fields
            .insert("status".to_string(), serde_json::Value::from(status));
        RowEffect::Keep
    }
}

/// 数字或字符串 ID 统一为字符串
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "id must be a string or number, got {}",
            other
        ))),
    }
}
