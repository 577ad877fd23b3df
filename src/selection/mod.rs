//! Bulk selection state
//!
//! A `SelectionSet` answers "which records will the next bulk action touch",
//! including when the answer is "everything matching the filter", which may
//! span pages the client has never fetched.
//!
//! Two representations:
//! - `Explicit`: a concrete set of IDs
//! - `AllMatching`: a filter snapshot plus the IDs the user deselected
//!
//! The filter snapshot only stays meaningful while the list shows the same
//! predicate; `guard` enforces that before any mutation.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::bulk::BulkActionResult;
use crate::errors::{PanelError, Result};
use crate::filter::FilterState;

/// Opaque record identifier
pub trait RecordId: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> RecordId for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode<Id: RecordId> {
    Explicit {
        included: HashSet<Id>,
    },
    AllMatching {
        filter_snapshot: FilterState,
        excluded: HashSet<Id>,
    },
}

impl<Id: RecordId> Default for SelectionMode<Id> {
    fn default() -> Self {
        SelectionMode::Explicit {
            included: HashSet::new(),
        }
    }
}

impl<Id: RecordId> SelectionMode<Id> {
    pub fn is_all_matching(&self) -> bool {
        matches!(self, SelectionMode::AllMatching { .. })
    }

    /// True when nothing can be targeted (explicit with no IDs)
    pub fn is_empty(&self) -> bool {
        matches!(self, SelectionMode::Explicit { included } if included.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet<Id: RecordId> {
    mode: SelectionMode<Id>,
    visible: Vec<Id>,
}

impl<Id: RecordId> Default for SelectionSet<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: RecordId> SelectionSet<Id> {
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::default(),
            visible: Vec::new(),
        }
    }

    pub fn mode(&self) -> &SelectionMode<Id> {
        &self.mode
    }

    /// IDs on the page currently shown
    pub fn visible_ids(&self) -> &[Id] {
        &self.visible
    }

    /// Cache the IDs of the page just fetched
    pub fn set_visible(&mut self, ids: Vec<Id>) {
        self.visible = ids;
    }

    /// Snapshot of the mode, used as the immutable target of a bulk request
    pub fn target(&self) -> SelectionMode<Id> {
        self.mode.clone()
    }

    pub fn toggle_one(&mut self, id: Id) {
        let set = match &mut self.mode {
            SelectionMode::Explicit { included } => included,
            SelectionMode::AllMatching { excluded, .. } => excluded,
        };
        if !set.remove(&id) {
            set.insert(id);
        }
    }

    /// "Select all on this page", acting as "deselect all" when every
    /// visible row is already selected. Never changes the mode.
    pub fn select_all_visible(&mut self, visible_ids: &[Id]) {
        self.visible = visible_ids.to_vec();
        let all_selected = visible_ids.iter().all(|id| self.is_selected(id));

        match &mut self.mode {
            SelectionMode::Explicit { included } => {
                if all_selected {
                    for id in visible_ids {
                        included.remove(id);
                    }
                } else {
                    included.extend(visible_ids.iter().cloned());
                }
            }
            SelectionMode::AllMatching { excluded, .. } => {
                if all_selected {
                    excluded.extend(visible_ids.iter().cloned());
                } else {
                    for id in visible_ids {
                        excluded.remove(id);
                    }
                }
            }
        }
    }

    /// Select every record matching `filter`, including unfetched pages.
    ///
    /// The caller fetches the total count for display; the set never does.
    pub fn select_all_matching(&mut self, filter: &FilterState) {
        debug!("Selection switched to all matching filter");
        self.mode = SelectionMode::AllMatching {
            filter_snapshot: filter.clone(),
            excluded: HashSet::new(),
        };
    }

    pub fn clear(&mut self) {
        self.mode = SelectionMode::default();
    }

    /// Membership test.
    ///
    /// Under `AllMatching` this is true for any ID not excluded, so only ask
    /// about IDs known to match the filter.
    pub fn is_selected(&self, id: &Id) -> bool {
        match &self.mode {
            SelectionMode::Explicit { included } => included.contains(id),
            SelectionMode::AllMatching { excluded, .. } => !excluded.contains(id),
        }
    }

    /// Number of selected records.
    ///
    /// `None` under `AllMatching` when the caller has no total to offer.
    pub fn count(&self, total_matching: Option<u64>) -> Option<u64> {
        match &self.mode {
            SelectionMode::Explicit { included } => Some(included.len() as u64),
            SelectionMode::AllMatching { excluded, .. } => {
                total_matching.map(|total| total.saturating_sub(excluded.len() as u64))
            }
        }
    }

    /// Whether every visible row is selected (header checkbox state)
    pub fn all_visible_selected(&self) -> bool {
        !self.visible.is_empty() && self.visible.iter().all(|id| self.is_selected(id))
    }

    /// Check the set against the filter the list is showing now.
    ///
    /// An `AllMatching` set whose snapshot selects a different predicate is
    /// reset to `Explicit({})` and reported as `StaleSelection`; the reset
    /// is final, nothing is carried over.
    pub fn guard(&mut self, active: &FilterState) -> Result<()> {
        if let SelectionMode::AllMatching {
            filter_snapshot, ..
        } = &self.mode
            && !filter_snapshot.equals_for_selection(active)
        {
            warn!("All-matching selection no longer matches the active filter, resetting");
            self.clear();
            return Err(PanelError::stale_selection(
                "Selection was made under a different filter and has been reset",
            ));
        }
        Ok(())
    }

    /// Apply the outcome of a bulk action.
    ///
    /// Only succeeded IDs leave the selection, so failed ones can be retried
    /// by resubmitting what is left.
    pub fn reconcile(&mut self, result: &BulkActionResult<Id>) {
        if let SelectionMode::Explicit { included } = &mut self.mode {
            included.retain(|id| !result.succeeded.contains(id));
            return;
        }

        if result.succeeded.is_empty() {
            // 没有成功项：保留原选择以便重试
            return;
        }
        self.mode = SelectionMode::Explicit {
            included: result.failed.iter().map(|f| f.id.clone()).collect(),
        };
    }
}
