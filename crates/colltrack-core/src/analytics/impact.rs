//! Impact classification.
//!
//! Each record is matched against an ordered rule list; the first rule that
//! applies decides its category. The aggregate risk score weights categories
//! (breaking 40, security 30, data 20, cosmetic 1), averages over the record
//! count, doubles, and caps at 100.

use serde::{Deserialize, Serialize};

use crate::diff::model::ChangeType;
use crate::identity::{is_container_entry, ItemIdentity};
use crate::model::ChangeRecord;
use crate::path::{last_key, segments, PathSegment};

/// Fields that locate or identify a request wherever they appear.
const LOCATION_FIELDS: &[&str] = &["url", "method"];

/// Parts of a structured URL; only locating under a `url` segment.
const URL_PART_FIELDS: &[&str] = &["raw", "host", "path", "port", "protocol"];

/// Fields whose changes are presentational only.
const NAMING_FIELDS: &[&str] = &["name", "description", "title"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactCategory {
    Breaking,
    Security,
    Data,
    Cosmetic,
}

impl ImpactCategory {
    pub fn weight(&self) -> u32 {
        match self {
            ImpactCategory::Breaking => 40,
            ImpactCategory::Security => 30,
            ImpactCategory::Data => 20,
            ImpactCategory::Cosmetic => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Critical
        } else if score >= 60.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Medium
        } else if score >= 20.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Critical => {
                "Block rollout: breaking changes detected. Coordinate with every consumer before release."
            }
            RiskLevel::High => "Review required: notify consumers and schedule a versioned rollout.",
            RiskLevel::Medium => "Review data and security changes before the next release.",
            RiskLevel::Low => "Low risk: include in release notes.",
            RiskLevel::Minimal => "No action needed.",
        }
    }
}

/// Classification of a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactAssessment {
    pub path: String,
    pub change_type: ChangeType,
    pub category: ImpactCategory,
    pub reason: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub breaking: usize,
    pub security: usize,
    pub data: usize,
    pub cosmetic: usize,
}

impl CategoryCounts {
    fn bump(&mut self, category: ImpactCategory) {
        match category {
            ImpactCategory::Breaking => self.breaking += 1,
            ImpactCategory::Security => self.security += 1,
            ImpactCategory::Data => self.data += 1,
            ImpactCategory::Cosmetic => self.cosmetic += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.breaking + self.security + self.data + self.cosmetic
    }

    fn weighted(&self) -> u64 {
        [
            (self.breaking, ImpactCategory::Breaking),
            (self.security, ImpactCategory::Security),
            (self.data, ImpactCategory::Data),
            (self.cosmetic, ImpactCategory::Cosmetic),
        ]
        .iter()
        .map(|(n, c)| *n as u64 * u64::from(c.weight()))
        .sum()
    }
}

/// Aggregate impact of a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub total_changes: usize,
    pub counts: CategoryCounts,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub assessments: Vec<ImpactAssessment>,
}

/// `min(100, weighted / total * 2)`; 0 for an empty set.
pub fn risk_score(counts: &CategoryCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    (counts.weighted() as f64 / total as f64 * 2.0).min(100.0)
}

fn has_key(segs: &[PathSegment], key: &str) -> bool {
    segs.iter().any(|s| s.as_key() == Some(key))
}

fn is_location_field(segs: &[PathSegment], last: Option<&str>) -> bool {
    match last {
        Some(k) if LOCATION_FIELDS.contains(&k) => true,
        Some(k) if URL_PART_FIELDS.contains(&k) => has_key(segs, "url"),
        _ => false,
    }
}

fn assessment(
    record: &ChangeRecord,
    category: ImpactCategory,
    reason: &str,
    suggestions: &[&str],
) -> ImpactAssessment {
    ImpactAssessment {
        path: record.path.clone(),
        change_type: record.change_type,
        category,
        reason: reason.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}

/// Classify one record. The first matching rule wins.
pub fn classify(record: &ChangeRecord, identity: &dyn ItemIdentity) -> ImpactAssessment {
    let segs = segments(&record.path);
    let lower = record.path.to_ascii_lowercase();
    let last = last_key(&segs);
    let under_response = has_key(&segs, "response");

    match record.change_type {
        ChangeType::Deleted if is_container_entry(&segs, identity) => {
            return assessment(
                record,
                ImpactCategory::Breaking,
                "Endpoint or folder removed from the collection",
                &[
                    "Notify consumers that the endpoint was removed",
                    "Provide a replacement or a deprecation period",
                ],
            )
        }
        ChangeType::Deleted if under_response => {
            return assessment(
                record,
                ImpactCategory::Breaking,
                "Response shape lost a field or example",
                &[
                    "Check clients that read the removed response field",
                    "Version the response if the field is still in use",
                ],
            )
        }
        ChangeType::Modified if is_location_field(&segs, last) => {
            return assessment(
                record,
                ImpactCategory::Breaking,
                "Request location or method changed",
                &[
                    "Update client base URLs and routes",
                    "Keep the old route available during migration",
                ],
            )
        }
        _ => {}
    }

    if lower.contains("auth") || lower.contains("header") {
        return assessment(
            record,
            ImpactCategory::Security,
            "Authentication or header configuration changed",
            &["Review credentials and header requirements with the service owner"],
        );
    }
    if lower.contains("body") || (record.change_type == ChangeType::Added && under_response) {
        return assessment(
            record,
            ImpactCategory::Data,
            "Request or response payload changed",
            &["Update fixtures and client models for the new payload"],
        );
    }
    if last.is_some_and(|k| NAMING_FIELDS.contains(&k)) {
        return assessment(record, ImpactCategory::Cosmetic, "Naming or documentation changed", &[]);
    }
    assessment(record, ImpactCategory::Cosmetic, "Minor change", &[])
}

pub fn analyze_impact(records: &[ChangeRecord], identity: &dyn ItemIdentity) -> ImpactReport {
    let assessments: Vec<ImpactAssessment> = records.iter().map(|r| classify(r, identity)).collect();
    let mut counts = CategoryCounts::default();
    for a in &assessments {
        counts.bump(a.category);
    }
    let risk_score = risk_score(&counts);
    let risk_level = RiskLevel::from_score(risk_score);
    ImpactReport {
        total_changes: records.len(),
        counts,
        risk_score,
        risk_level,
        recommendation: risk_level.recommendation().to_string(),
        assessments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::Change;
    use crate::identity::CollectionItemIdentity;
    use chrono::Utc;

    fn record(change_type: ChangeType, path: &str) -> ChangeRecord {
        ChangeRecord::from_change(
            "col",
            Some("a"),
            "b",
            Change {
                change_type,
                path: path.to_string(),
                modification: None,
            },
            Utc::now(),
        )
    }

    fn category(change_type: ChangeType, path: &str) -> ImpactCategory {
        classify(&record(change_type, path), &CollectionItemIdentity::default()).category
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(category(ChangeType::Deleted, "item[3]"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Deleted, "item[0].response[0].body"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Modified, "item[0].request.url.raw"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Modified, "item[0].request.method"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Added, "item[0].request.header[1]"), ImpactCategory::Security);
        assert_eq!(category(ChangeType::Modified, "auth.bearer[0].value"), ImpactCategory::Security);
        assert_eq!(category(ChangeType::Modified, "item[0].request.body.raw"), ImpactCategory::Data);
        assert_eq!(category(ChangeType::Added, "item[0].request.body.mode"), ImpactCategory::Data);
        assert_eq!(category(ChangeType::Added, "item[0].response[2]"), ImpactCategory::Data);
        assert_eq!(category(ChangeType::Modified, "item[0].name"), ImpactCategory::Cosmetic);
        assert_eq!(category(ChangeType::Modified, "info.schema"), ImpactCategory::Cosmetic);
    }

    #[test]
    fn test_url_parts_locate_only_under_url() {
        assert_eq!(category(ChangeType::Modified, "item[0].request.url.host[0]"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Modified, "item[0].request.url.path"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Modified, "item[0].request.url.port"), ImpactCategory::Breaking);
        assert_eq!(category(ChangeType::Modified, "item[0].request.body.raw"), ImpactCategory::Data);
        assert_eq!(category(ChangeType::Modified, "item[0].response[0].body.path"), ImpactCategory::Data);
        assert_eq!(category(ChangeType::Modified, "variable[0].path"), ImpactCategory::Cosmetic);
        assert_eq!(category(ChangeType::Modified, "item[1].url"), ImpactCategory::Breaking);
    }

    #[test]
    fn test_breaking_has_suggestions() {
        let a = classify(&record(ChangeType::Deleted, "item[0]"), &CollectionItemIdentity::default());
        assert!(!a.suggestions.is_empty());
    }

    #[test]
    fn test_one_breaking_scores_eighty() {
        let report = analyze_impact(&[record(ChangeType::Deleted, "item[0]")], &CollectionItemIdentity::default());
        assert_eq!(report.risk_score, 80.0);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert_eq!(report.counts.breaking, 1);
    }

    #[test]
    fn test_score_is_capped_and_zero_when_empty() {
        assert_eq!(risk_score(&CategoryCounts::default()), 0.0);
        let counts = CategoryCounts { breaking: 3, ..Default::default() };
        assert_eq!(risk_score(&counts), 80.0);
        let mixed = CategoryCounts { breaking: 1, cosmetic: 1, ..Default::default() };
        assert_eq!(risk_score(&mixed), 41.0);
        assert_eq!(RiskLevel::from_score(41.0), RiskLevel::Medium);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskLevel::from_score(60.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(20.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19.9), RiskLevel::Minimal);
    }
}
