//! Pure aggregations over change records.
//!
//! - [`impact`]: per-record impact category and an aggregate risk score
//! - [`frequency`]: hot paths and volatile endpoints within a time window
//! - [`comparison`]: per snapshot-pair summary grouped by resource type

pub mod comparison;
pub mod frequency;
pub mod impact;

pub use comparison::{summarize, ChangeTypeCounts, ComparisonSummary};
pub use frequency::{analyze_frequency, EndpointVolatility, FrequencyReport, PathFrequency, TimeWindow};
pub use impact::{analyze_impact, classify, CategoryCounts, ImpactAssessment, ImpactCategory, ImpactReport, RiskLevel};
