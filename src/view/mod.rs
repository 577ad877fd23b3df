//! List view controller
//!
//! A `ListView` owns the state one admin list needs: the active filter, the
//! selection, the current page and per-row failure messages. Concrete lists
//! only supply a `PageFetcher`, a record type and, optionally, event hooks.

mod resources;

pub use resources::ResourceKind;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bulk::{BulkAction, BulkActionCoordinator, BulkActionRequest, BulkActionResult};
use crate::client::{ListRecord, PageFetcher, RowEffect};
use crate::errors::{PanelError, Result};
use crate::filter::FilterState;
use crate::selection::{RecordId, SelectionSet};

/// Hooks a renderer subscribes to
pub trait PanelEvents<Id: RecordId>: Send + Sync {
    fn on_selection_changed(&self, selection: &SelectionSet<Id>) {
        let _ = selection;
    }

    fn on_action_completed(&self, result: &BulkActionResult<Id>) {
        let _ = result;
    }
}

/// Events sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl<Id: RecordId> PanelEvents<Id> for NoopEvents {}

pub struct ListView<R: ListRecord> {
    resource: ResourceKind,
    filter: FilterState,
    selection: SelectionSet<R::Id>,
    items: Vec<R>,
    total_matching: Option<u64>,
    row_errors: HashMap<R::Id, String>,
    fetcher: Arc<dyn PageFetcher<R>>,
    coordinator: Arc<BulkActionCoordinator<R::Id>>,
    events: Arc<dyn PanelEvents<R::Id>>,
}

impl<R: ListRecord> ListView<R> {
    pub fn new(
        resource: ResourceKind,
        filter: FilterState,
        fetcher: Arc<dyn PageFetcher<R>>,
        coordinator: Arc<BulkActionCoordinator<R::Id>>,
    ) -> Self {
        Self {
            resource,
            filter,
            selection: SelectionSet::new(),
            items: Vec::new(),
            total_matching: None,
            row_errors: HashMap::new(),
            fetcher,
            coordinator,
            events: Arc::new(NoopEvents),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn PanelEvents<R::Id>>) -> Self {
        self.events = events;
        self
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionSet<R::Id> {
        &self.selection
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Total under the current filter, known after the first fetch
    pub fn total_matching(&self) -> Option<u64> {
        self.total_matching
    }

    pub fn coordinator(&self) -> &Arc<BulkActionCoordinator<R::Id>> {
        &self.coordinator
    }

    pub fn selected_count(&self) -> Option<u64> {
        self.selection.count(self.total_matching)
    }

    pub fn row_error(&self, id: &R::Id) -> Option<&str> {
        self.row_errors.get(id).map(String::as_str)
    }

    /// Run the stale-filter guard; returns true if the selection was reset
    fn guard(&mut self) -> bool {
        match self.selection.guard(&self.filter) {
            Ok(()) => false,
            Err(e) => {
                warn!("{} list: {}", self.resource, e.message());
                self.events.on_selection_changed(&self.selection);
                true
            }
        }
    }

    /// Switch to a new filter; the page is not refetched.
    ///
    /// Returns true when an all-matching selection was dropped because the
    /// new filter selects a different set.
    pub fn set_filter(&mut self, filter: FilterState) -> bool {
        let predicate_changed = !self.filter.equals_for_selection(&filter);
        self.filter = filter;
        if predicate_changed {
            self.total_matching = None;
        }
        self.guard()
    }

    pub async fn go_to_page(&mut self, page: u32) -> Result<()> {
        let next = self.filter.with_page(page);
        self.set_filter(next);
        self.refresh().await
    }

    /// Fetch the current page. On failure the previous rows stay in place.
    pub async fn refresh(&mut self) -> Result<()> {
        self.guard();
        let page = self.fetcher.fetch_page(&self.filter).await.map_err(|e| {
            warn!("{} list: fetch failed: {}", self.resource, e);
            PanelError::from(e)
        })?;

        debug!(
            "{} list: page {} with {} rows, {} matching",
            self.resource,
            page.page,
            page.items.len(),
            page.total_matching_count
        );
        self.selection.set_visible(page.ids());
        self.items = page.items;
        self.total_matching = Some(page.total_matching_count);
        self.row_errors.clear();
        Ok(())
    }

    pub fn toggle(&mut self, id: R::Id) {
        self.guard();
        self.selection.toggle_one(id);
        self.events.on_selection_changed(&self.selection);
    }

    /// Header checkbox: selects or deselects the rows on this page only
    pub fn toggle_all_visible(&mut self) {
        self.guard();
        let visible: Vec<R::Id> = self.items.iter().map(ListRecord::id).collect();
        self.selection.select_all_visible(&visible);
        self.events.on_selection_changed(&self.selection);
    }

    /// "Select all N matching": every record under the current filter
    pub fn select_all_matching(&mut self) {
        self.guard();
        self.selection.select_all_matching(&self.filter);
        self.events.on_selection_changed(&self.selection);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.events.on_selection_changed(&self.selection);
    }

    /// Submit `action` against the current selection and fold the outcome
    /// back into the rows and the selection.
    pub async fn run(&mut self, action: BulkAction) -> Result<BulkActionResult<R::Id>> {
        self.resource.check_action(action.kind())?;
        if let Err(e) = self.selection.guard(&self.filter) {
            self.events.on_selection_changed(&self.selection);
            return Err(e);
        }

        let request = BulkActionRequest::new(action, self.selection.target());
        let result = self.coordinator.submit(&request).await?;
        self.apply_result(request.action(), &result);

        self.events.on_action_completed(&result);
        self.events.on_selection_changed(&self.selection);
        Ok(result)
    }

    fn apply_result(&mut self, action: &BulkAction, result: &BulkActionResult<R::Id>) {
        self.row_errors.clear();

        let mut removed: HashSet<R::Id> = HashSet::new();
        for item in self.items.iter_mut() {
            let id = item.id();
            if result.succeeded.contains(&id) && item.apply_action(action) == RowEffect::Remove {
                removed.insert(id);
            }
        }
        if !removed.is_empty() {
            self.items.retain(|item| !removed.contains(&item.id()));
            self.total_matching = self
                .total_matching
                .map(|total| total.saturating_sub(removed.len() as u64));
            info!(
                "{} list: {} rows left the current view",
                self.resource,
                removed.len()
            );
        }

        for failed in &result.failed {
            self.row_errors
                .insert(failed.id.clone(), failed.reason.clone());
        }
        // 整体失败时没有逐项明细，可见的目标行共用同一原因
        if let Some(reason) = &result.request_error {
            for item in &self.items {
                let id = item.id();
                if self.selection.is_selected(&id) {
                    self.row_errors.entry(id).or_insert_with(|| reason.clone());
                }
            }
        }

        self.selection.reconcile(result);
        self.selection
            .set_visible(self.items.iter().map(ListRecord::id).collect());
    }
}
