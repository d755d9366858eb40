//! Change frequency analysis.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::diff::model::ChangeType;
use crate::enrich::resolved_entry_name;
use crate::identity::{deepest_container_entry, ItemIdentity};
use crate::model::ChangeRecord;
use crate::path::{from_segments, segments};

/// Half-open window `[since, until)` over record creation time; an absent
/// bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn all() -> Self {
        Self::default()
    }

    /// The `span` leading up to `now`.
    pub fn last(span: Duration, now: DateTime<Utc>) -> Self {
        Self {
            since: Some(now - span),
            until: None,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since.map_or(true, |s| at >= s) && self.until.map_or(true, |u| at < u)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathFrequency {
    pub path: String,
    pub count: usize,
    /// Share of all records in the window, 0–100
    pub percentage: f64,
}

/// Change activity aggregated per list-container entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointVolatility {
    pub entry_path: String,
    pub endpoint_name: Option<String>,
    pub total: usize,
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyReport {
    pub window: TimeWindow,
    pub total_changes: usize,
    pub hot_paths: Vec<PathFrequency>,
    pub volatile_endpoints: Vec<EndpointVolatility>,
}

/// Rank paths and container entries by change count within `window`.
///
/// Ties are broken by path ascending. `top_n` truncates both rankings.
pub fn analyze_frequency(
    records: &[ChangeRecord],
    window: TimeWindow,
    top_n: Option<usize>,
    identity: &dyn ItemIdentity,
) -> FrequencyReport {
    let in_window: Vec<&ChangeRecord> = records
        .iter()
        .filter(|r| window.contains(r.created_at))
        .collect();
    let total = in_window.len();

    let mut per_path: HashMap<&str, usize> = HashMap::new();
    let mut per_entry: HashMap<String, EndpointVolatility> = HashMap::new();

    for record in &in_window {
        *per_path.entry(record.path.as_str()).or_insert(0) += 1;

        let segs = segments(&record.path);
        let Some(entry) = deepest_container_entry(&segs, identity) else {
            continue;
        };
        let entry_path = from_segments(&segs[..=entry]);
        let slot = per_entry
            .entry(entry_path.clone())
            .or_insert_with(|| EndpointVolatility {
                entry_path,
                endpoint_name: None,
                total: 0,
                added: 0,
                deleted: 0,
                modified: 0,
            });
        slot.total += 1;
        match record.change_type {
            ChangeType::Added => slot.added += 1,
            ChangeType::Deleted => slot.deleted += 1,
            ChangeType::Modified => slot.modified += 1,
        }
        if slot.endpoint_name.is_none() {
            slot.endpoint_name = resolved_entry_name(record, &segs, identity).map(|(_, n)| n);
        }
    }

    let mut hot_paths: Vec<PathFrequency> = per_path
        .into_iter()
        .map(|(path, count)| PathFrequency {
            path: path.to_string(),
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();
    hot_paths.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));

    let mut volatile_endpoints: Vec<EndpointVolatility> = per_entry.into_values().collect();
    volatile_endpoints.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.entry_path.cmp(&b.entry_path))
    });

    if let Some(n) = top_n {
        hot_paths.truncate(n);
        volatile_endpoints.truncate(n);
    }

    FrequencyReport {
        window,
        total_changes: total,
        hot_paths,
        volatile_endpoints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::Change;
    use crate::identity::CollectionItemIdentity;
    use chrono::TimeZone;

    fn at(day: u32, change_type: ChangeType, path: &str) -> ChangeRecord {
        ChangeRecord::from_change(
            "col",
            Some("a"),
            "b",
            Change {
                change_type,
                path: path.to_string(),
                modification: None,
            },
            Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_hot_paths_ranked_with_percentages() {
        let records = vec![
            at(1, ChangeType::Modified, "info.name"),
            at(2, ChangeType::Modified, "info.name"),
            at(3, ChangeType::Modified, "item[0].request.method"),
            at(4, ChangeType::Added, "item[0].request.header[0]"),
        ];
        let report = analyze_frequency(&records, TimeWindow::all(), None, &CollectionItemIdentity::default());
        assert_eq!(report.total_changes, 4);
        assert_eq!(report.hot_paths[0].path, "info.name");
        assert_eq!(report.hot_paths[0].percentage, 50.0);
        assert_eq!(report.hot_paths[1].path, "item[0].request.header[0]");

        assert_eq!(report.volatile_endpoints.len(), 1);
        let ep = &report.volatile_endpoints[0];
        assert_eq!(ep.entry_path, "item[0]");
        assert_eq!((ep.total, ep.added, ep.modified), (2, 1, 1));
    }

    #[test]
    fn test_window_filters_records() {
        let records = vec![
            at(1, ChangeType::Modified, "a"),
            at(10, ChangeType::Modified, "b"),
            at(20, ChangeType::Modified, "c"),
        ];
        let window = TimeWindow {
            since: Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()),
            until: Some(Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()),
        };
        let report = analyze_frequency(&records, window, None, &CollectionItemIdentity::default());
        assert_eq!(report.total_changes, 1);
        assert_eq!(report.hot_paths[0].path, "b");
    }

    #[test]
    fn test_top_n_and_nested_entries() {
        let records = vec![
            at(1, ChangeType::Deleted, "item[1].item[0]"),
            at(1, ChangeType::Modified, "item[1].item[0].name"),
            at(1, ChangeType::Modified, "item[2].name"),
        ];
        let report = analyze_frequency(&records, TimeWindow::all(), Some(1), &CollectionItemIdentity::default());
        assert_eq!(report.hot_paths.len(), 1);
        assert_eq!(report.volatile_endpoints.len(), 1);
        assert_eq!(report.volatile_endpoints[0].entry_path, "item[1].item[0]");
        assert_eq!(report.volatile_endpoints[0].deleted, 1);
    }

    #[test]
    fn test_empty_window() {
        let report = analyze_frequency(&[], TimeWindow::all(), None, &CollectionItemIdentity::default());
        assert_eq!(report.total_changes, 0);
        assert!(report.hot_paths.is_empty());
    }

    #[test]
    fn test_last_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let w = TimeWindow::last(Duration::days(2), now);
        assert!(w.contains(now));
        assert!(!w.contains(now - Duration::days(3)));
    }
}
