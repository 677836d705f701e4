//! Model verdict normalization
//!
//! The model's JSON already parsed in the invocation loop; this stage maps
//! it into a [`VerificationOutcome`] defensively. Field shapes vary between
//! runs of a non-deterministic model, so every absent or wrong-shaped field
//! becomes empty rather than an error.

use seen_core::models::{VerificationOutcome, VerificationStatus};
use serde_json::Value;

/// Map a parsed model verdict plus pre-computed alerts into the outcome
/// persisted on the upload.
pub fn normalize_verdict(verdict: &Value, alerts: &[String]) -> VerificationOutcome {
    let status = match string_field(verdict, "status").as_deref() {
        Some("verified") => VerificationStatus::Verified,
        Some("potential_issues") => VerificationStatus::PotentialIssues,
        _ => VerificationStatus::Unverified,
    };
    let verified = status == VerificationStatus::Verified;

    let analysis = string_field(verdict, "analysis").unwrap_or_default();
    let summary = string_field(verdict, "result")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| Some(analysis.clone()).filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| "No summary provided by the model.".to_string());

    let mut sections = vec![summary.clone()];
    push_section(
        &mut sections,
        "Trusted source findings",
        list_field(verdict, "trusted_source_findings"),
    );
    push_section(
        &mut sections,
        "Web search findings",
        list_field(verdict, "web_search_findings"),
    );
    push_section(
        &mut sections,
        "Sources",
        list_field(verdict, "sources")
            .into_iter()
            .filter(|s| !is_url(s))
            .collect(),
    );
    push_section(
        &mut sections,
        "Media analysis findings",
        list_field(verdict, "media_analysis_findings"),
    );
    push_section(
        &mut sections,
        "Claims identified",
        list_field(verdict, "claims_identified"),
    );
    push_section(
        &mut sections,
        "Recommended actions",
        list_field(verdict, "recommended_actions"),
    );
    if !analysis.trim().is_empty() && analysis.trim() != summary.trim() {
        sections.push(format!("Full analysis:\n{}", analysis));
    }

    // Pre-computed alerts come first, model-reported issues after, order
    // preserved within each.
    let mut issues: Vec<String> = alerts.to_vec();
    issues.extend(list_field(verdict, "issues"));

    VerificationOutcome {
        status,
        verified,
        narrative: sections.join("\n\n"),
        issues,
        supporting_factors: list_field(verdict, "supporting_factors"),
    }
}

fn push_section(sections: &mut Vec<String>, header: &str, items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    let mut section = format!("{}:", header);
    for item in items {
        section.push_str("\n- ");
        section.push_str(&item);
    }
    sections.push(section);
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(|s| s.to_string())
}

/// Tolerant list extraction: an array keeps its string elements, a bare
/// string becomes a one-element list, anything else is empty.
fn list_field(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|s| s.to_string())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn is_url(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.starts_with("http://") || trimmed.starts_with("https://")
}
