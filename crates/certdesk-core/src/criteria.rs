//! View criteria: search text, filters and sort order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::{CertificateKind, CertificateStatus};

/// Exact-match filter that can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    /// Whether `value` passes this filter.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }
}

impl<T> From<Option<T>> for Filter<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Filter::All, Filter::Only)
    }
}

/// Sort order for the derived view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently modified first.
    #[default]
    UpdatedDesc,
    UpdatedAsc,
    IdAsc,
    IdDesc,
    NameAsc,
    NameDesc,
    /// Draft, then in progress, then completed.
    Status,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpdatedDesc => "updated_desc",
            Self::UpdatedAsc => "updated_asc",
            Self::IdAsc => "id_asc",
            Self::IdDesc => "id_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "updated_desc" | "newest" => Ok(Self::UpdatedDesc),
            "updated_asc" | "oldest" => Ok(Self::UpdatedAsc),
            "id_asc" | "id" => Ok(Self::IdAsc),
            "id_desc" => Ok(Self::IdDesc),
            "name_asc" | "name" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            "status" => Ok(Self::Status),
            _ => Err(CoreError::InvalidInput(format!("unknown sort key '{s}'"))),
        }
    }
}

/// Local search, filter and sort parameters.
///
/// These never affect what is fetched from the store, only how the
/// accumulated collection is presented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCriteria {
    pub search: String,
    pub status: Filter<CertificateStatus>,
    pub kind: Filter<CertificateKind>,
    pub sort: SortKey,
}

impl ViewCriteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_status(mut self, status: Filter<CertificateStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: Filter<CertificateKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}
