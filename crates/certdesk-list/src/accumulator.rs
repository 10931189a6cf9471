//! Pagination accumulator.
//!
//! Concatenates fetched pages into one ordered collection. Fetching page 1
//! starts a new epoch and replaces whatever was accumulated before.

use certdesk_core::{Certificate, CertificateId, Page};
use tracing::debug;

/// Merge a fetched page into the previous collection.
///
/// Page 1 replaces `previous`; any later page is appended in order.
/// Ids are assumed unique across pages.
pub fn accumulate(
    mut previous: Vec<Certificate>,
    page: u32,
    fetched: Vec<Certificate>,
) -> Vec<Certificate> {
    if page <= 1 {
        return fetched;
    }
    previous.extend(fetched);
    previous
}

/// Accumulated collection plus the pagination facts of the latest page.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    items: Vec<Certificate>,
    total_count: usize,
    has_more: bool,
    page: u32,
}

impl Accumulator {
    /// Fold a fetched page in. Totals are taken verbatim from it.
    pub fn apply(&mut self, page: Page) {
        let items = std::mem::take(&mut self.items);
        self.items = accumulate(items, page.page, page.items);
        self.total_count = page.total_count;
        self.has_more = page.has_more;
        self.page = page.page.max(1);

        debug!(
            page = self.page,
            accumulated = self.items.len(),
            total_count = self.total_count,
            has_more = self.has_more,
            "Accumulated page"
        );
    }

    /// Drop everything, e.g. when the owner changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn items(&self) -> &[Certificate] {
        &self.items
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Last page folded in; 0 before the first fetch.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn get(&self, id: &CertificateId) -> Option<&Certificate> {
        self.items.iter().find(|c| &c.id == id)
    }

    pub fn get_mut(&mut self, id: &CertificateId) -> Option<&mut Certificate> {
        self.items.iter_mut().find(|c| &c.id == id)
    }

    /// Remove the given ids locally, returning how many were present.
    ///
    /// Totals are left alone; the next page-1 fetch realigns them.
    pub fn remove(&mut self, ids: &[CertificateId]) -> usize {
        let before = self.items.len();
        self.items.retain(|c| !ids.contains(&c.id));
        before - self.items.len()
    }
}
