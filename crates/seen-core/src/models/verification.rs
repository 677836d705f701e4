use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::upload::VerificationStatus;

/// Normalized result of one verification run, flattened into the Upload's
/// text fields when persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationOutcome {
    pub status: VerificationStatus,
    pub verified: bool,
    /// Composited human-readable narrative (summary plus finding sections).
    pub narrative: String,
    /// Pre-verification alerts followed by model-reported issues.
    pub issues: Vec<String>,
    pub supporting_factors: Vec<String>,
}

impl VerificationOutcome {
    /// Terminal record for a run whose invocation loop exhausted its retries.
    /// Distinguishable from "pending" (no result text at all).
    pub fn failed(message: &str) -> Self {
        Self {
            status: VerificationStatus::Unverified,
            verified: false,
            narrative: format!("Verification failed: {}", message),
            issues: Vec::new(),
            supporting_factors: Vec::new(),
        }
    }

    /// Text persisted on the upload record: the narrative, with detected
    /// issues appended so nothing is lost in the flattening.
    pub fn result_text(&self) -> String {
        if self.issues.is_empty() {
            return self.narrative.clone();
        }
        let mut text = self.narrative.clone();
        text.push_str("\n\nIssues detected:");
        for issue in &self.issues {
            text.push_str("\n- ");
            text.push_str(issue);
        }
        text
    }
}

/// Per-record summary returned by the batch verification sweep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchItemOutcome {
    pub upload_id: Uuid,
    pub verified: bool,
    pub status: VerificationStatus,
    /// Present when this record's verification failed terminally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_embeds_error() {
        let outcome = VerificationOutcome::failed("model returned no JSON");
        assert_eq!(outcome.status, VerificationStatus::Unverified);
        assert!(!outcome.verified);
        assert!(outcome.narrative.starts_with("Verification failed:"));
        assert!(outcome.narrative.contains("model returned no JSON"));
    }

    #[test]
    fn test_result_text_appends_issues() {
        let outcome = VerificationOutcome {
            status: VerificationStatus::PotentialIssues,
            verified: false,
            narrative: "Claims partially supported.".to_string(),
            issues: vec!["daytime mismatch".to_string()],
            supporting_factors: Vec::new(),
        };
        let text = outcome.result_text();
        assert!(text.starts_with("Claims partially supported."));
        assert!(text.contains("Issues detected:"));
        assert!(text.contains("- daytime mismatch"));
    }

    #[test]
    fn test_result_text_without_issues_is_narrative() {
        let outcome = VerificationOutcome {
            status: VerificationStatus::Verified,
            verified: true,
            narrative: "All claims check out.".to_string(),
            issues: Vec::new(),
            supporting_factors: Vec::new(),
        };
        assert_eq!(outcome.result_text(), "All claims check out.");
    }
}
