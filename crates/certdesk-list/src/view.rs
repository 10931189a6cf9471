//! Derived view pipeline: search, status filter, kind filter, sort.
//!
//! The view is recomputed from the accumulated collection on every read
//! and is never stored.

use std::cmp::Reverse;

use certdesk_core::{Certificate, SortKey, ViewCriteria};

/// Derive the ordered view of `items` under `criteria`.
pub fn derive_view<'a>(items: &'a [Certificate], criteria: &ViewCriteria) -> Vec<&'a Certificate> {
    // A blank query matches everything; any other query is matched as typed.
    let query = if criteria.search.trim().is_empty() {
        None
    } else {
        Some(criteria.search.to_lowercase())
    };

    let mut view: Vec<&Certificate> = items
        .iter()
        .filter(|c| query.as_deref().map_or(true, |q| matches_search(c, q)))
        .filter(|c| criteria.status.matches(&c.status))
        .filter(|c| criteria.kind.matches(&c.kind))
        .collect();

    sort_view(&mut view, criteria.sort);
    view
}

/// `query` must already be lowercased.
fn matches_search(certificate: &Certificate, query: &str) -> bool {
    let fields = [
        Some(certificate.id.as_str()),
        certificate.client_name.as_deref(),
        certificate.installation_address.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(query))
}

/// Stable sort: equal keys keep their incoming order.
pub fn sort_view(view: &mut [&Certificate], key: SortKey) {
    match key {
        SortKey::UpdatedDesc => view.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortKey::UpdatedAsc => view.sort_by_key(|c| c.updated_at),
        SortKey::IdAsc => view.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str())),
        SortKey::IdDesc => view.sort_by(|a, b| b.id.as_str().cmp(a.id.as_str())),
        SortKey::NameAsc => view.sort_by_cached_key(|c| folded_name(c)),
        SortKey::NameDesc => view.sort_by_cached_key(|c| Reverse(folded_name(c))),
        SortKey::Status => view.sort_by_key(|c| c.status.rank()),
    }
}

fn folded_name(certificate: &Certificate) -> String {
    certificate.display_name().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use certdesk_core::{CertificateKind, CertificateStatus, Filter};
    use chrono::{Duration, TimeZone, Utc};

    fn fixture() -> Vec<Certificate> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        vec![
            Certificate::new("EICR-0003", CertificateKind::Eicr)
                .with_status(CertificateStatus::Completed)
                .with_client_name("beta Lettings")
                .with_address("4 Mill Lane, Leeds")
                .with_updated_at(base),
            Certificate::new("EIC-0001", CertificateKind::Eic)
                .with_status(CertificateStatus::Draft)
                .with_client_name("Alpha Homes")
                .with_updated_at(base + Duration::hours(2)),
            Certificate::new("MW-0002", CertificateKind::MinorWorks)
                .with_status(CertificateStatus::InProgress)
                .with_address("12 Station Road, York")
                .with_updated_at(base + Duration::hours(1)),
            Certificate::new("EICR-0004", CertificateKind::Eicr)
                .with_status(CertificateStatus::Draft)
                .with_client_name("Beta Lettings")
                .with_updated_at(base),
        ]
    }

    fn ids<'a>(view: &[&'a Certificate]) -> Vec<&'a str> {
        view.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_default_criteria_sorts_newest_first() {
        let items = fixture();
        let view = derive_view(&items, &ViewCriteria::default());
        assert_eq!(ids(&view), vec!["EIC-0001", "MW-0002", "EICR-0003", "EICR-0004"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let items = fixture();

        let by_name = derive_view(&items, &ViewCriteria::default().with_search("ALPHA"));
        assert_eq!(ids(&by_name), vec!["EIC-0001"]);

        let by_address = derive_view(&items, &ViewCriteria::default().with_search("station"));
        assert_eq!(ids(&by_address), vec!["MW-0002"]);

        let by_id = derive_view(&items, &ViewCriteria::default().with_search("eicr-"));
        assert_eq!(ids(&by_id), vec!["EICR-0003", "EICR-0004"]);
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let items = fixture();

        // "mill " needs the space after it, so "4 Mill Lane" matches.
        let spaced = derive_view(&items, &ViewCriteria::default().with_search("mill "));
        assert_eq!(ids(&spaced), vec!["EICR-0003"]);

        let mut extra = fixture();
        extra.push(
            Certificate::new("EIC-0005", CertificateKind::Eic).with_address("Millbrook Farm"),
        );
        let spaced = derive_view(&extra, &ViewCriteria::default().with_search("mill "));
        assert_eq!(ids(&spaced), vec!["EICR-0003"]);

        let blank = derive_view(&items, &ViewCriteria::default().with_search("   "));
        assert_eq!(blank.len(), items.len());
    }

    #[test]
    fn test_empty_search_equals_pipeline_without_search() {
        let items = fixture();
        let criteria = ViewCriteria::default()
            .with_status(Filter::Only(CertificateStatus::Draft))
            .with_sort(SortKey::IdAsc);

        let with_empty = derive_view(&items, &criteria.clone().with_search(""));

        let mut without: Vec<&Certificate> = items
            .iter()
            .filter(|c| criteria.status.matches(&c.status))
            .filter(|c| criteria.kind.matches(&c.kind))
            .collect();
        sort_view(&mut without, criteria.sort);

        assert_eq!(with_empty, without);
    }

    #[test]
    fn test_status_and_kind_filters_combine() {
        let items = fixture();
        let criteria = ViewCriteria::default()
            .with_status(Filter::Only(CertificateStatus::Draft))
            .with_kind(Filter::Only(CertificateKind::Eicr));

        assert_eq!(ids(&derive_view(&items, &criteria)), vec!["EICR-0004"]);
    }

    #[test]
    fn test_name_sort_folds_case_and_puts_missing_first() {
        let items = fixture();
        let view = derive_view(&items, &ViewCriteria::default().with_sort(SortKey::NameAsc));
        // MW-0002 has no client name and sorts as ""; the two Beta entries tie.
        assert_eq!(ids(&view), vec!["MW-0002", "EIC-0001", "EICR-0003", "EICR-0004"]);
    }

    #[test]
    fn test_status_sort_uses_rank() {
        let mut items = fixture();
        items.push(
            Certificate::new("OLD-1", CertificateKind::Eic).with_status(CertificateStatus::Unknown),
        );
        let view = derive_view(&items, &ViewCriteria::default().with_sort(SortKey::Status));
        let statuses: Vec<CertificateStatus> = view.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                CertificateStatus::Draft,
                CertificateStatus::Draft,
                CertificateStatus::InProgress,
                CertificateStatus::Completed,
                CertificateStatus::Unknown,
            ]
        );
    }

    #[test]
    fn test_every_sort_key_is_stable() {
        // Identical keys for every sort: order must come through untouched.
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let items: Vec<Certificate> = (0..6)
            .map(|i| {
                let mut c = Certificate::new("SAME", CertificateKind::Eic)
                    .with_client_name("Same Name")
                    .with_updated_at(stamp);
                c.payload = serde_json::json!({ "n": i });
                c
            })
            .collect();

        for key in [
            SortKey::UpdatedDesc,
            SortKey::UpdatedAsc,
            SortKey::IdAsc,
            SortKey::IdDesc,
            SortKey::NameAsc,
            SortKey::NameDesc,
            SortKey::Status,
        ] {
            let view = derive_view(&items, &ViewCriteria::default().with_sort(key));
            let order: Vec<i64> = view.iter().map(|c| c.payload["n"].as_i64().unwrap()).collect();
            assert_eq!(order, vec![0, 1, 2, 3, 4, 5], "unstable for {key}");
        }
    }

    #[test]
    fn test_derive_view_is_idempotent() {
        let items = fixture();
        let criteria = ViewCriteria::default()
            .with_search("lettings")
            .with_sort(SortKey::NameDesc);

        assert_eq!(derive_view(&items, &criteria), derive_view(&items, &criteria));
    }
}
