//! Verification prompt assembly
//!
//! Pure functions: the lexical precheck scans the description for
//! day/night vocabulary that contradicts the sunrise/sunset signal, and the
//! builder folds description, context snapshot, and precheck alerts into a
//! single instruction prompt with a fixed JSON response contract.

use seen_core::models::{ContextSnapshot, MediaKind, SunTimes};

const DAYTIME_TERMS: &[&str] = &[
    "sunny", "daytime", "daylight", "afternoon", "morning", "midday", "noon",
];

const NIGHTTIME_TERMS: &[&str] = &[
    "night", "nighttime", "midnight", "evening", "moonlit", "starry", "dark",
];

/// Lexical mismatch scan: heuristic alerts, not authoritative findings.
/// The model is asked to confirm or refute each one.
pub fn precheck_description(description: Option<&str>, sun: Option<&SunTimes>) -> Vec<String> {
    let (Some(description), Some(sun)) = (description, sun) else {
        return Vec::new();
    };

    let lowered = description.to_lowercase();
    let mentions = |terms: &[&str]| {
        terms
            .iter()
            .find(|term| lowered.contains(*term))
            .map(|term| term.to_string())
    };

    let mut alerts = Vec::new();

    if !sun.is_daytime {
        if let Some(term) = mentions(DAYTIME_TERMS) {
            alerts.push(format!(
                "Description mentions daytime (\"{}\") but sunrise/sunset data places the capture at night",
                term
            ));
        }
    } else if let Some(term) = mentions(NIGHTTIME_TERMS) {
        alerts.push(format!(
            "Description mentions nighttime (\"{}\") but sunrise/sunset data places the capture in daylight",
            term
        ));
    }

    alerts
}

/// Build the single verification prompt for one attempt.
pub fn build_verification_prompt(
    description: Option<&str>,
    context: &ContextSnapshot,
    alerts: &[String],
    media_kind: MediaKind,
) -> String {
    let media_noun = match media_kind {
        MediaKind::Image => "photo",
        MediaKind::Video => "video",
    };

    let mut parts = vec![format!(
        "You are verifying a user-submitted {} against trusted contextual data.",
        media_noun
    )];

    parts.push("\nTrusted context data:".to_string());
    if let Some(place) = &context.place_name {
        parts.push(format!("- Location: {}", place));
    }
    if let Some(weather) = &context.weather {
        parts.push(format!(
            "- Current weather at the location: {} ({:.1} C; conditions: {})",
            weather.description,
            weather.temperature_c,
            weather.conditions.join(", ")
        ));
    }
    if let Some(sun) = &context.sun {
        parts.push(format!(
            "- Sunrise {} UTC, sunset {} UTC; the capture time falls in {}",
            sun.sunrise.format("%H:%M"),
            sun.sunset.format("%H:%M"),
            if sun.is_daytime {
                "daylight hours"
            } else {
                "nighttime hours"
            }
        ));
    }
    if context.is_empty() {
        parts.push("- No contextual data is available for this upload".to_string());
    }

    match description {
        Some(description) => {
            parts.push(format!("\nUser description to verify: \"{}\"", description));
        }
        None => {
            parts.push(
                "\nThe user provided no description. There is no textual claim to check; \
                 verify the capture purely from the media content and the context data above."
                    .to_string(),
            );
        }
    }

    parts.push(
        "\nVerify in two levels:\n\
         Level 1: Check each claim in the description against the trusted context data above. \
         For historical facts, news events, or past weather the data cannot cover, you may use \
         your web search tool.\n\
         Level 2: Use visual analysis of the attached media only to corroborate or contradict \
         the Level 1 findings. Visual impressions are never the primary authority."
            .to_string(),
    );

    if !alerts.is_empty() {
        parts.push(
            "\nPre-verification alerts (heuristic, not authoritative; confirm or refute each):"
                .to_string(),
        );
        for alert in alerts {
            parts.push(format!("- {}", alert));
        }
    }

    parts.push(
        "\nRespond with a single JSON object and nothing else, using these fields:\n\
         - status: \"verified\", \"potential_issues\", or \"unverified\"\n\
         - result: one-paragraph summary of the verification outcome\n\
         - trusted_source_findings: array of findings from the context data\n\
         - web_search_findings: array of findings from web search\n\
         - sources: array of sources consulted\n\
         - media_analysis_findings: array of findings from visual analysis\n\
         - claims_identified: array of claims extracted from the description\n\
         - recommended_actions: array of suggested follow-ups\n\
         - issues: array of detected problems\n\
         - supporting_factors: array of signals supporting the description\n\
         - analysis: full reasoning, if longer than the summary"
            .to_string(),
    );

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use seen_core::models::WeatherReport;

    fn night_sun() -> SunTimes {
        SunTimes {
            sunrise: Utc.with_ymd_and_hms(2025, 6, 21, 5, 47, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2025, 6, 21, 20, 35, 0).unwrap(),
            is_daytime: false,
        }
    }

    fn day_sun() -> SunTimes {
        SunTimes {
            is_daytime: true,
            ..night_sun()
        }
    }

    #[test]
    fn test_precheck_flags_daytime_claim_at_night() {
        let alerts = precheck_description(Some("Sunny afternoon at the pier"), Some(&night_sun()));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("daytime"));
        assert!(alerts[0].contains("sunny"));
    }

    #[test]
    fn test_precheck_flags_nighttime_claim_in_daylight() {
        let alerts = precheck_description(Some("starry sky over the bay"), Some(&day_sun()));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("nighttime"));
    }

    #[test]
    fn test_precheck_quiet_when_consistent() {
        assert!(precheck_description(Some("sunny afternoon"), Some(&day_sun())).is_empty());
        assert!(precheck_description(Some("quiet moment"), Some(&night_sun())).is_empty());
    }

    #[test]
    fn test_precheck_needs_description_and_sun_signal() {
        assert!(precheck_description(None, Some(&night_sun())).is_empty());
        assert!(precheck_description(Some("sunny afternoon"), None).is_empty());
    }

    #[test]
    fn test_prompt_embeds_context_and_alerts() {
        let context = ContextSnapshot {
            sun: Some(night_sun()),
            weather: Some(WeatherReport {
                description: "clear sky".to_string(),
                temperature_c: 18.2,
                conditions: vec!["Clear".to_string()],
            }),
            place_name: Some("Pier 39, San Francisco".to_string()),
        };
        let alerts = vec!["Description mentions daytime but capture is at night".to_string()];

        let prompt = build_verification_prompt(
            Some("sunny afternoon"),
            &context,
            &alerts,
            MediaKind::Image,
        );

        assert!(prompt.contains("Pier 39"));
        assert!(prompt.contains("clear sky"));
        assert!(prompt.contains("nighttime hours"));
        assert!(prompt.contains("sunny afternoon"));
        assert!(prompt.contains("Pre-verification alerts"));
        assert!(prompt.contains("Level 1"));
        assert!(prompt.contains("Level 2"));
        assert!(prompt.contains("JSON object"));
    }

    #[test]
    fn test_prompt_handles_missing_description() {
        let prompt = build_verification_prompt(
            None,
            &ContextSnapshot::default(),
            &[],
            MediaKind::Video,
        );

        assert!(prompt.contains("no description"));
        assert!(prompt.contains("video"));
        assert!(prompt.contains("No contextual data"));
        assert!(!prompt.contains("Pre-verification alerts"));
    }
}
