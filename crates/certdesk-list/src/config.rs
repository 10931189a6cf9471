//! List controller configuration.

/// List controller configuration.
#[derive(Debug, Clone)]
pub struct ListConfig {
    /// Certificates requested per page.
    pub page_size: u32,

    /// Exports of at least this many certificates are bundled into one archive.
    pub bulk_export_threshold: usize,
}

impl ListConfig {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_bulk_export_threshold(mut self, threshold: usize) -> Self {
        self.bulk_export_threshold = threshold;
        self
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            bulk_export_threshold: 5,
        }
    }
}
