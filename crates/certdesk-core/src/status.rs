//! Certificate kind and lifecycle status enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    /// Started but not yet filled in.
    #[default]
    Draft,
    /// Inspection under way.
    InProgress,
    /// Signed off.
    Completed,
    /// Any status value this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl CertificateStatus {
    /// Every status a user can filter or bulk-assign.
    pub fn all() -> &'static [CertificateStatus] {
        &[Self::Draft, Self::InProgress, Self::Completed]
    }

    /// Fixed ordering used by the status sort.
    pub fn rank(&self) -> u32 {
        match self {
            Self::Draft => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Unknown => 999,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Unknown => "Unknown",
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CertificateStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "draft" => Ok(Self::Draft),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" | "complete" => Ok(Self::Completed),
            _ => Err(CoreError::InvalidInput(format!("unknown status '{s}'"))),
        }
    }
}

/// Kind of certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    /// Electrical Installation Condition Report.
    Eicr,
    /// Electrical Installation Certificate.
    Eic,
    /// Minor Electrical Installation Works certificate.
    MinorWorks,
}

impl CertificateKind {
    pub fn all() -> &'static [CertificateKind] {
        &[Self::Eicr, Self::Eic, Self::MinorWorks]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Eicr => "EICR",
            Self::Eic => "EIC",
            Self::MinorWorks => "Minor Works",
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CertificateKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "eicr" => Ok(Self::Eicr),
            "eic" => Ok(Self::Eic),
            "minor_works" | "minorworks" | "minor" => Ok(Self::MinorWorks),
            _ => Err(CoreError::InvalidInput(format!("unknown certificate kind '{s}'"))),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_rank_order() {
        assert!(CertificateStatus::Draft.rank() < CertificateStatus::InProgress.rank());
        assert!(CertificateStatus::InProgress.rank() < CertificateStatus::Completed.rank());
        assert_eq!(CertificateStatus::Unknown.rank(), 999);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "In-Progress".parse::<CertificateStatus>().unwrap(),
            CertificateStatus::InProgress
        );
        assert_eq!(
            "completed".parse::<CertificateStatus>().unwrap(),
            CertificateStatus::Completed
        );
        assert!("archived".parse::<CertificateStatus>().is_err());
    }

    #[test]
    fn test_unrecognised_wire_status_is_unknown() {
        let status: CertificateStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, CertificateStatus::Unknown);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(
            "minor-works".parse::<CertificateKind>().unwrap(),
            CertificateKind::MinorWorks
        );
        assert_eq!("EICR".parse::<CertificateKind>().unwrap(), CertificateKind::Eicr);
    }
}
