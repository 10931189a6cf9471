//! In-memory certificate store.
//!
//! Holds the server-side truth for tests and offline demos, with switches
//! for scripting failures and for holding deletes in flight.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::{watch, Notify};
use tracing::trace;

use certdesk_core::{
    Certificate, CertificateId, CertificateKind, CertificateStatus, CustomerId, OwnerId, Page,
};

use crate::error::StoreError;
use crate::store::{CertificateExporter, CertificateStore, ExportSummary};

struct Row {
    owner: OwnerId,
    certificate: Certificate,
    deleted: bool,
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<Row>,
    failing_deletes: HashSet<CertificateId>,
    failing_links: HashSet<CertificateId>,
    failing_exports: HashSet<CertificateId>,
    status_failure: Option<String>,
    fetch_failure: Option<String>,
    delete_failure: Option<String>,
    export_failure: Option<String>,
    fetched_pages: Vec<u32>,
}

/// Certificate store that keeps everything in memory.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    delete_gate: watch::Sender<bool>,
    delete_entered: Notify,
    fetch_gate: watch::Sender<bool>,
    fetch_held: Notify,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

const DEMO_CLIENTS: &[&str] = &[
    "Hartley Lettings",
    "J. Okafor",
    "Riverside Surgery",
    "M. Patel",
    "Northgate Primary School",
];

const DEMO_STREETS: &[&str] = &["Mill Lane", "Station Road", "Church Street", "Park Avenue"];

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (delete_gate, _) = watch::channel(false);
        let (fetch_gate, _) = watch::channel(false);
        Self {
            state: Mutex::new(MemoryState::default()),
            delete_gate,
            delete_entered: Notify::new(),
            fetch_gate,
            fetch_held: Notify::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a store holding `count` generated certificates for `owner`.
    ///
    /// Certificates are numbered from 1, and the lower the number the more
    /// recently it was modified.
    pub fn seeded(owner: &OwnerId, count: usize) -> Self {
        let store = Self::new();
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().unwrap_or_else(Utc::now);

        for i in 0..count {
            let kind = CertificateKind::all()[i % 3];
            let prefix = match kind {
                CertificateKind::Eicr => "EICR",
                CertificateKind::Eic => "EIC",
                CertificateKind::MinorWorks => "MW",
            };
            let certificate = Certificate::new(format!("{}-2024-{:04}", prefix, i + 1), kind)
                .with_status(CertificateStatus::all()[i % 3])
                .with_client_name(DEMO_CLIENTS[i % DEMO_CLIENTS.len()])
                .with_address(format!(
                    "{} {}",
                    i + 1,
                    DEMO_STREETS[i % DEMO_STREETS.len()]
                ))
                .with_updated_at(base - Duration::hours(i as i64));
            store.insert(owner, certificate);
        }

        store
    }

    /// Add a certificate, as another writer would.
    pub fn insert(&self, owner: &OwnerId, certificate: Certificate) {
        self.lock().rows.push(Row {
            owner: owner.clone(),
            certificate,
            deleted: false,
        });
    }

    /// Current server-side record, unless deleted.
    pub fn get(&self, id: &CertificateId) -> Option<Certificate> {
        self.lock()
            .rows
            .iter()
            .find(|row| !row.deleted && &row.certificate.id == id)
            .map(|row| row.certificate.clone())
    }

    /// Ids of the owner's live certificates, in fetch order.
    pub fn live_ids(&self, owner: &OwnerId) -> Vec<CertificateId> {
        live_rows(&self.lock(), owner)
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    /// Make deletes of `id` fail.
    pub fn fail_delete(&self, id: impl Into<CertificateId>) {
        self.lock().failing_deletes.insert(id.into());
    }

    /// Make link updates of `id` fail.
    pub fn fail_link(&self, id: impl Into<CertificateId>) {
        self.lock().failing_links.insert(id.into());
    }

    /// Make exports of `id` count as failed.
    pub fn fail_export(&self, id: impl Into<CertificateId>) {
        self.lock().failing_exports.insert(id.into());
    }

    /// Make every status update fail with `message`, or clear with `None`.
    pub fn set_status_failure(&self, message: Option<&str>) {
        self.lock().status_failure = message.map(str::to_owned);
    }

    /// Make every fetch fail with a network error, or clear with `None`.
    pub fn set_fetch_failure(&self, message: Option<&str>) {
        self.lock().fetch_failure = message.map(str::to_owned);
    }

    /// Make every delete fail with a network error, or clear with `None`.
    pub fn set_delete_failure(&self, message: Option<&str>) {
        self.lock().delete_failure = message.map(str::to_owned);
    }

    /// Make whole export calls fail, or clear with `None`.
    pub fn set_export_failure(&self, message: Option<&str>) {
        self.lock().export_failure = message.map(str::to_owned);
    }

    /// Hold every delete until `resume_deletes` is called.
    pub fn pause_deletes(&self) {
        self.delete_gate.send_replace(true);
    }

    pub fn resume_deletes(&self) {
        self.delete_gate.send_replace(false);
    }

    /// Resolves once a delete call has started.
    pub async fn delete_started(&self) {
        self.delete_entered.notified().await;
    }

    /// Hold every fetch until `resume_fetches` is called.
    pub fn pause_fetches(&self) {
        self.fetch_gate.send_replace(true);
    }

    pub fn resume_fetches(&self) {
        self.fetch_gate.send_replace(false);
    }

    /// Resolves once a fetch is being held by `pause_fetches`.
    pub async fn fetch_held(&self) {
        self.fetch_held.notified().await;
    }

    /// Most deletes that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Page numbers requested so far, in order.
    pub fn fetched_pages(&self) -> Vec<u32> {
        self.lock().fetched_pages.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

}

async fn wait_for_gate(gate: &watch::Sender<bool>) {
    let mut gate = gate.subscribe();
    // The sender outlives the receiver, so this only returns once open.
    let _ = gate.wait_for(|paused| !*paused).await;
}

fn live_rows(state: &MemoryState, owner: &OwnerId) -> Vec<Certificate> {
    let mut live: Vec<Certificate> = state
        .rows
        .iter()
        .filter(|row| !row.deleted && &row.owner == owner)
        .map(|row| row.certificate.clone())
        .collect();
    live.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    live
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn fetch_page(
        &self,
        owner: &OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<Page, StoreError> {
        let paused = *self.fetch_gate.borrow();
        if paused {
            self.fetch_held.notify_one();
            wait_for_gate(&self.fetch_gate).await;
        }

        let mut state = self.lock();
        state.fetched_pages.push(page);
        if let Some(message) = &state.fetch_failure {
            return Err(StoreError::Network(message.clone()));
        }

        let live = live_rows(&state, owner);
        let total_count = live.len();
        let page_size = page_size.max(1) as usize;
        let start = (page.max(1) as usize - 1) * page_size;
        let items: Vec<Certificate> = live.into_iter().skip(start).take(page_size).collect();
        let has_more = start + items.len() < total_count;

        trace!(owner = %owner, page, returned = items.len(), total_count, "Memory fetch");
        Ok(Page {
            items,
            total_count,
            has_more,
            page,
        })
    }

    async fn soft_delete(&self, id: &CertificateId, owner: &OwnerId) -> Result<(), StoreError> {
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        self.delete_entered.notify_one();

        tokio::task::yield_now().await;
        wait_for_gate(&self.delete_gate).await;

        let result = {
            let mut state = self.lock();
            if let Some(message) = &state.delete_failure {
                Err(StoreError::Network(message.clone()))
            } else if state.failing_deletes.contains(id) {
                Err(StoreError::Rejected(Some(format!(
                    "Certificate {} could not be deleted",
                    id
                ))))
            } else {
                for row in state
                    .rows
                    .iter_mut()
                    .filter(|row| &row.certificate.id == id && &row.owner == owner)
                {
                    row.deleted = true;
                }
                Ok(())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn update_status(
        &self,
        ids: &[CertificateId],
        owner: &OwnerId,
        status: CertificateStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(message) = &state.status_failure {
            return Err(StoreError::Server {
                status: 500,
                message: message.clone(),
            });
        }

        let now = Utc::now();
        for row in state
            .rows
            .iter_mut()
            .filter(|row| &row.owner == owner && ids.contains(&row.certificate.id))
        {
            row.certificate.status = status;
            row.certificate.updated_at = now;
        }
        Ok(())
    }

    async fn update_link(
        &self,
        id: &CertificateId,
        customer: Option<&CustomerId>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.failing_links.contains(id) {
            return Err(StoreError::Rejected(Some("Customer not found".to_string())));
        }

        match state
            .rows
            .iter_mut()
            .find(|row| !row.deleted && &row.certificate.id == id)
        {
            Some(row) => {
                row.certificate.customer_id = customer.cloned();
                Ok(())
            }
            None => Err(StoreError::Rejected(Some(format!(
                "Certificate {} not found",
                id
            )))),
        }
    }
}

#[async_trait]
impl CertificateExporter for MemoryStore {
    async fn export_batch(
        &self,
        ids: &[CertificateId],
        owner: &OwnerId,
    ) -> Result<ExportSummary, StoreError> {
        let state = self.lock();
        if let Some(message) = &state.export_failure {
            return Err(StoreError::Server {
                status: 500,
                message: message.clone(),
            });
        }

        let live: HashSet<CertificateId> =
            live_rows(&state, owner).into_iter().map(|c| c.id).collect();
        let successful = ids
            .iter()
            .filter(|id| live.contains(*id) && !state.failing_exports.contains(*id))
            .count();

        Ok(ExportSummary {
            successful,
            failed: ids.len() - successful,
        })
    }
}
