//! Sunrise/sunset lookup and the daytime classification
//!
//! The astronomy provider returns UTC instants for a coordinate and date.
//! Daytime classification compares time-of-day values (minutes since
//! midnight) so it stays correct when the daylight window crosses midnight
//! in the comparison frame.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use reqwest::Client;
use seen_core::models::SunTimes;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct SunApiResponse {
    results: SunApiResults,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SunApiResults {
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
}

/// Client for a sunrise-sunset.org style JSON API.
#[derive(Clone)]
pub struct SunClient {
    http_client: Client,
    base_url: String,
}

impl SunClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for sun lookup")?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Fetch sunrise/sunset for the coordinate and date, and classify the
    /// capture instant as day or night.
    pub async fn sun_times(
        &self,
        latitude: f64,
        longitude: f64,
        captured_at: DateTime<Utc>,
    ) -> Result<SunTimes> {
        let date: NaiveDate = captured_at.date_naive();
        let url = format!(
            "{}/json?lat={}&lng={}&date={}&formatted=0",
            self.base_url, latitude, longitude, date
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to query sunrise/sunset API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Sunrise/sunset API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: SunApiResponse = response
            .json()
            .await
            .context("Failed to parse sunrise/sunset response")?;

        if parsed.status != "OK" {
            return Err(anyhow::anyhow!(
                "Sunrise/sunset API returned status {}",
                parsed.status
            ));
        }

        Ok(SunTimes {
            sunrise: parsed.results.sunrise,
            sunset: parsed.results.sunset,
            is_daytime: is_daytime(
                captured_at.time(),
                parsed.results.sunrise.time(),
                parsed.results.sunset.time(),
            ),
        })
    }
}

fn minutes_since_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Classify a capture time-of-day against the sunrise/sunset window.
///
/// When the sunset time-of-day is numerically smaller than sunrise, the
/// daylight window spans midnight and membership becomes a disjunction.
pub fn is_daytime(capture: NaiveTime, sunrise: NaiveTime, sunset: NaiveTime) -> bool {
    let c = minutes_since_midnight(capture);
    let rise = minutes_since_midnight(sunrise);
    let set = minutes_since_midnight(sunset);

    if set > rise {
        c >= rise && c <= set
    } else {
        c >= rise || c <= set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_is_daytime_normal_window() {
        let sunrise = t(6, 0);
        let sunset = t(20, 0);

        assert!(is_daytime(t(12, 0), sunrise, sunset));
        assert!(is_daytime(t(6, 0), sunrise, sunset));
        assert!(is_daytime(t(20, 0), sunrise, sunset));
        assert!(!is_daytime(t(5, 59), sunrise, sunset));
        assert!(!is_daytime(t(20, 1), sunrise, sunset));
        assert!(!is_daytime(t(23, 30), sunrise, sunset));
    }

    #[test]
    fn test_is_daytime_window_spanning_midnight() {
        // Sunset time-of-day numerically smaller than sunrise: the daylight
        // window runs 22:00 -> 05:00 across the midnight boundary.
        let sunrise = t(22, 0);
        let sunset = t(5, 0);

        assert!(is_daytime(t(23, 0), sunrise, sunset));
        assert!(is_daytime(t(0, 30), sunrise, sunset));
        assert!(is_daytime(t(5, 0), sunrise, sunset));
        assert!(is_daytime(t(22, 0), sunrise, sunset));
        assert!(!is_daytime(t(12, 0), sunrise, sunset));
        assert!(!is_daytime(t(21, 59), sunrise, sunset));
        assert!(!is_daytime(t(5, 1), sunrise, sunset));
    }

    #[tokio::test]
    async fn test_sun_times_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "results": {
                        "sunrise": "2025-06-21T05:47:00+00:00",
                        "sunset": "2025-06-21T20:35:00+00:00"
                    },
                    "status": "OK"
                }"#,
            )
            .create_async()
            .await;

        let client = SunClient::new(server.url()).unwrap();
        let captured_at: DateTime<Utc> = "2025-06-21T12:00:00Z".parse().unwrap();
        let sun = client.sun_times(37.8, -122.4, captured_at).await.unwrap();

        mock.assert_async().await;
        assert!(sun.is_daytime);
        assert_eq!(sun.sunrise.time(), t(5, 47));
        assert_eq!(sun.sunset.time(), t(20, 35));
    }

    #[tokio::test]
    async fn test_sun_times_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": {"sunrise": "2025-06-21T05:47:00+00:00", "sunset": "2025-06-21T20:35:00+00:00"}, "status": "INVALID_REQUEST"}"#)
            .create_async()
            .await;

        let client = SunClient::new(server.url()).unwrap();
        let captured_at: DateTime<Utc> = "2025-06-21T12:00:00Z".parse().unwrap();
        let result = client.sun_times(37.8, -122.4, captured_at).await;

        assert!(result.is_err());
    }
}
