//! Human-readable summary renderer for snapshot comparisons.

use crate::analytics::comparison::ComparisonSummary;
use crate::analytics::impact::{ImpactCategory, ImpactReport, RiskLevel};

/// Render a Markdown summary of a [`ComparisonSummary`], optionally followed
/// by its [`ImpactReport`].
///
/// The summary is intended for review workflows. It is informational only.
pub fn render_human_summary(summary: &ComparisonSummary, impact: Option<&ImpactReport>) -> String {
    let mut out = String::new();

    // Header
    out.push_str("## Collection Changes\n\n");
    out.push_str(&format!(
        "**Collection**: `{}`  \n**Snapshots**: `{}` → `{}`\n\n",
        summary.collection_id,
        summary.old_snapshot_id.as_deref().map_or("(none)", short),
        short(&summary.new_snapshot_id),
    ));

    let c = &summary.counts;
    if c.total == 0 {
        out.push_str("_No changes detected._\n");
        return out;
    }

    // Counts
    out.push_str("| Added | Deleted | Modified | Total |\n|---|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        c.added, c.deleted, c.modified, c.total
    ));

    // Paths by resource type
    out.push_str("### Changes by Resource\n\n");
    for (resource, paths) in &summary.by_resource_type {
        out.push_str(&format!("- **{}** ({})\n", resource, paths.len()));
        for p in paths {
            out.push_str(&format!("  - `{}`\n", display_path(p)));
        }
    }
    out.push('\n');

    if let Some(report) = impact {
        render_impact(&mut out, report);
    }

    out
}

fn render_impact(out: &mut String, report: &ImpactReport) {
    let level = match report.risk_level {
        RiskLevel::Critical => "Critical",
        RiskLevel::High => "High",
        RiskLevel::Medium => "Medium",
        RiskLevel::Low => "Low",
        RiskLevel::Minimal => "Minimal",
    };
    out.push_str("### Impact\n\n");
    out.push_str(&format!(
        "**Risk**: {:.1} ({level})  \n**Recommendation**: {}\n\n",
        report.risk_score, report.recommendation
    ));
    out.push_str(&format!(
        "- Breaking: {}\n- Security: {}\n- Data: {}\n- Cosmetic: {}\n\n",
        report.counts.breaking, report.counts.security, report.counts.data, report.counts.cosmetic
    ));

    let breaking: Vec<_> = report
        .assessments
        .iter()
        .filter(|a| a.category == ImpactCategory::Breaking)
        .collect();
    if !breaking.is_empty() {
        out.push_str("### ⚠ Breaking Changes\n\n");
        for a in breaking {
            out.push_str(&format!(
                "- `{}` ({}): {}\n",
                display_path(&a.path),
                a.change_type,
                a.reason
            ));
            for s in &a.suggestions {
                out.push_str(&format!("  - {}\n", s));
            }
        }
        out.push('\n');
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        crate::enrich::ROOT_LABEL
    } else {
        path
    }
}

/// Return the first 12 characters of an id for display purposes.
fn short(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
