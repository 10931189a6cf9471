//! Certificate list controller.
//!
//! Owns the accumulated collection, view criteria and selection for one
//! owner, and exposes them through a narrow set of reads and commands.
//! Mutations live in `orchestrator.rs`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use certdesk_core::{
    Certificate, CertificateId, CertificateKind, CertificateStatus, Filter, OwnerId, Page,
    SortKey, ViewCriteria,
};
use certdesk_store::{CertificateExporter, CertificateStore, StoreError};

use crate::accumulator::Accumulator;
use crate::busy::{Activities, Activity};
use crate::config::ListConfig;
use crate::error::ListError;
use crate::notification::{Notification, NotificationKind};
use crate::selection::Selection;
use crate::view::derive_view;

/// An export being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    pub count: usize,
    /// Whether the output is large enough to arrive as one archive.
    pub bundled: bool,
}

/// Per-status tallies over everything loaded so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub draft: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn get(&self, status: CertificateStatus) -> usize {
        match status {
            CertificateStatus::Draft => self.draft,
            CertificateStatus::InProgress => self.in_progress,
            CertificateStatus::Completed => self.completed,
            CertificateStatus::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.draft + self.in_progress + self.completed + self.unknown
    }
}

/// Everything the controller owns.
pub(crate) struct ListState {
    pub(crate) owner: OwnerId,
    pub(crate) collection: Accumulator,
    pub(crate) criteria: ViewCriteria,
    pub(crate) selection: Selection,
    pub(crate) activities: Activities,
    /// Bumped by every page-1 fetch; results from older epochs are dropped.
    pub(crate) epoch: u64,
    pub(crate) pending_delete: Option<CertificateId>,
    pub(crate) confirming_bulk_delete: bool,
    /// Certificate whose action menu is open.
    pub(crate) action_target: Option<CertificateId>,
    pub(crate) export_progress: Option<ExportProgress>,
    pub(crate) last_error: Option<String>,
}

impl ListState {
    fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            collection: Accumulator::default(),
            criteria: ViewCriteria::default(),
            selection: Selection::default(),
            activities: Activities::default(),
            epoch: 0,
            pending_delete: None,
            confirming_bulk_delete: false,
            action_target: None,
            export_progress: None,
            last_error: None,
        }
    }
}

/// Clears a busy flag when dropped, on every exit path.
pub(crate) struct BusyGuard<'a> {
    state: &'a RwLock<ListState>,
    activity: Activity,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.activities.end(self.activity) && self.activity == Activity::Exporting {
            state.export_progress = None;
        }
    }
}

/// Paginated certificate list with optimistic mutations.
///
/// State sits behind a synchronous lock that is never held across an
/// `.await`, so reads are cheap snapshots and remain available while a
/// mutation is waiting on the store.
pub struct ListController {
    pub(crate) store: Arc<dyn CertificateStore>,
    pub(crate) exporter: Arc<dyn CertificateExporter>,
    pub(crate) config: ListConfig,
    state: RwLock<ListState>,
}

impl ListController {
    /// Create a controller for `owner`. Nothing is fetched until `refresh`.
    pub fn new(
        store: Arc<dyn CertificateStore>,
        exporter: Arc<dyn CertificateExporter>,
        owner: OwnerId,
        config: ListConfig,
    ) -> Self {
        Self {
            store,
            exporter,
            config,
            state: RwLock::new(ListState::new(owner)),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ListState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ListState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `activity` busy under an already-held lock.
    ///
    /// The returned guard takes the lock again when dropped, so the caller
    /// must release `state` first.
    pub(crate) fn begin(&self, state: &mut ListState, activity: Activity) -> BusyGuard<'_> {
        state.activities.begin(activity);
        BusyGuard {
            state: &self.state,
            activity,
        }
    }

    pub(crate) fn busy(&self, activity: Activity) -> BusyGuard<'_> {
        let mut state = self.write();
        state.activities.begin(activity);
        drop(state);
        BusyGuard {
            state: &self.state,
            activity,
        }
    }

    // Reads

    /// The derived view: search, filters and sort applied to the collection.
    pub fn view(&self) -> Vec<Certificate> {
        let state = self.read();
        derive_view(state.collection.items(), &state.criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The accumulated collection, unfiltered and in fetch order.
    pub fn collection(&self) -> Vec<Certificate> {
        self.read().collection.items().to_vec()
    }

    pub fn total_count(&self) -> usize {
        self.read().collection.total_count()
    }

    pub fn has_more(&self) -> bool {
        self.read().collection.has_more()
    }

    /// Last page loaded; 0 before the first fetch.
    pub fn page(&self) -> u32 {
        self.read().collection.page()
    }

    pub fn owner(&self) -> OwnerId {
        self.read().owner.clone()
    }

    pub fn criteria(&self) -> ViewCriteria {
        self.read().criteria.clone()
    }

    pub fn selection(&self) -> Vec<CertificateId> {
        self.read().selection.ids()
    }

    pub fn is_selected(&self, id: &CertificateId) -> bool {
        self.read().selection.contains(id)
    }

    pub fn is_bulk_mode(&self) -> bool {
        self.read().selection.is_bulk_mode()
    }

    pub fn is_busy(&self, activity: Activity) -> bool {
        self.read().activities.is_busy(activity)
    }

    /// Certificate awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<CertificateId> {
        self.read().pending_delete.clone()
    }

    pub fn is_confirming_bulk_delete(&self) -> bool {
        self.read().confirming_bulk_delete
    }

    pub fn action_target(&self) -> Option<CertificateId> {
        self.read().action_target.clone()
    }

    pub fn export_progress(&self) -> Option<ExportProgress> {
        self.read().export_progress
    }

    /// Message of the most recent failed load, cleared by the next good one.
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let state = self.read();
        let mut counts = StatusCounts::default();
        for certificate in state.collection.items() {
            match certificate.status {
                CertificateStatus::Draft => counts.draft += 1,
                CertificateStatus::InProgress => counts.in_progress += 1,
                CertificateStatus::Completed => counts.completed += 1,
                CertificateStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    // View criteria. None of these touch the store.

    pub fn set_search(&self, search: impl Into<String>) {
        self.write().criteria.search = search.into();
    }

    pub fn set_status_filter(&self, filter: Filter<CertificateStatus>) {
        self.write().criteria.status = filter;
    }

    pub fn set_type_filter(&self, filter: Filter<CertificateKind>) {
        self.write().criteria.kind = filter;
    }

    pub fn set_sort(&self, sort: SortKey) {
        self.write().criteria.sort = sort;
    }

    // Bulk mode and selection

    pub fn enter_bulk_mode(&self) {
        let mut state = self.write();
        state.selection.enter();
        state.confirming_bulk_delete = false;
    }

    pub fn exit_bulk_mode(&self) {
        let mut state = self.write();
        state.selection.exit();
        state.confirming_bulk_delete = false;
    }

    /// Flip selection of `id`. Returns whether it is now selected.
    pub fn toggle_select(&self, id: impl Into<CertificateId>) -> bool {
        self.write().selection.toggle(id.into())
    }

    /// Add everything in the current view to the selection.
    pub fn select_all_visible(&self) {
        let mut state = self.write();
        let visible: Vec<CertificateId> = derive_view(state.collection.items(), &state.criteria)
            .into_iter()
            .map(|c| c.id.clone())
            .collect();
        state.selection.extend(visible);
    }

    pub fn clear_selection(&self) {
        self.write().selection.clear();
    }

    // Per-item action menu

    pub fn open_actions(&self, id: impl Into<CertificateId>) {
        self.write().action_target = Some(id.into());
    }

    pub fn close_actions(&self) {
        self.write().action_target = None;
    }

    // Fetching

    /// Switch to another owner and load their first page.
    pub async fn set_owner(&self, owner: OwnerId) -> Result<(), ListError> {
        {
            let mut state = self.write();
            info!(from = %state.owner, to = %owner, "Switching owner");
            state.owner = owner;
            state.collection.reset();
            state.selection.exit();
            state.pending_delete = None;
            state.confirming_bulk_delete = false;
            state.action_target = None;
        }
        self.refresh().await
    }

    /// Fetch page 1, replacing the accumulated collection.
    pub async fn refresh(&self) -> Result<(), ListError> {
        let (owner, epoch) = {
            let mut state = self.write();
            state.epoch += 1;
            (state.owner.clone(), state.epoch)
        };
        let _busy = self.busy(Activity::Loading);

        debug!(owner = %owner, epoch, "Fetching first page");
        let result = self
            .store
            .fetch_page(&owner, 1, self.config.page_size)
            .await;
        self.apply_fetch(epoch, 1, result).map(|_| ())
    }

    /// Fetch the page after the last one loaded and append it.
    ///
    /// Returns `Ok(false)` without fetching when there is nothing more or a
    /// load is already running.
    pub async fn load_next_page(&self) -> Result<bool, ListError> {
        let (owner, epoch, next, _busy) = {
            let mut state = self.write();
            if !state.collection.has_more() || state.activities.is_busy(Activity::Loading) {
                return Ok(false);
            }
            let next = state.collection.page() + 1;
            let owner = state.owner.clone();
            let epoch = state.epoch;
            let busy = self.begin(&mut state, Activity::Loading);
            (owner, epoch, next, busy)
        };

        debug!(owner = %owner, page = next, "Fetching next page");
        let result = self
            .store
            .fetch_page(&owner, next, self.config.page_size)
            .await;
        self.apply_fetch(epoch, next, result)
    }

    fn apply_fetch(
        &self,
        epoch: u64,
        page: u32,
        result: Result<Page, StoreError>,
    ) -> Result<bool, ListError> {
        let mut state = self.write();
        if state.epoch != epoch {
            debug!(
                page,
                epoch,
                current_epoch = state.epoch,
                "Discarding page from a superseded fetch"
            );
            return Ok(false);
        }

        match result {
            Ok(fetched) => {
                state.collection.apply(fetched);
                state.last_error = None;
                Ok(true)
            }
            Err(source) => {
                warn!(page, error = %source, "Failed to load certificates");
                state.last_error = Some(source.to_string());
                Err(ListError::Fetch { page, source })
            }
        }
    }

    /// Page-1 re-fetch after a mutation. Failures are recorded, not returned.
    pub(crate) async fn resync(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Resync after mutation failed");
        }
    }

    pub(crate) fn announce(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => {
                info!(notification = %notification.message, "Mutation succeeded")
            }
            NotificationKind::Partial => warn!(
                notification = %notification.message,
                counts = ?notification.counts,
                "Mutation partially failed"
            ),
            NotificationKind::Failure => {
                warn!(notification = %notification.message, "Mutation failed")
            }
        }
    }
}
