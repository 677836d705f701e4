//! Context gathering for content verification
//!
//! Fetches the contextual signals an upload is checked against:
//! sunrise/sunset, current weather, and a reverse-geocoded place name.
//! The three lookups are independent and issued concurrently. Gathering is
//! not on the critical failure path: any individual failure degrades to an
//! absent signal and verification proceeds with partial context.

mod geocode;
mod sun;
mod weather;

pub use geocode::GeocodeClient;
pub use sun::{is_daytime, SunClient};
pub use weather::WeatherClient;

use anyhow::Result;
use chrono::{DateTime, Utc};
use seen_core::models::ContextSnapshot;

/// Aggregates the three context providers. The weather client is optional;
/// without an API key that signal is simply never requested.
pub struct ContextGatherer {
    sun: SunClient,
    weather: Option<WeatherClient>,
    geocode: GeocodeClient,
}

impl ContextGatherer {
    pub fn new(sun: SunClient, weather: Option<WeatherClient>, geocode: GeocodeClient) -> Self {
        Self {
            sun,
            weather,
            geocode,
        }
    }

    /// Build a gatherer from provider base URLs and an optional weather key.
    pub fn from_urls(
        sun_base_url: &str,
        weather_base_url: &str,
        weather_api_key: Option<&str>,
        geocode_base_url: &str,
    ) -> Result<Self> {
        let weather = weather_api_key
            .map(|key| WeatherClient::new(weather_base_url, key))
            .transpose()?;

        Ok(Self {
            sun: SunClient::new(sun_base_url)?,
            weather,
            geocode: GeocodeClient::new(geocode_base_url)?,
        })
    }

    /// Gather all available signals for a coordinate and capture instant.
    ///
    /// Sun and weather lookups are skipped when the capture instant is
    /// unknown. Never errors: each failed lookup logs a warning and yields
    /// `None` for that signal.
    pub async fn gather(
        &self,
        latitude: f64,
        longitude: f64,
        captured_at: Option<DateTime<Utc>>,
    ) -> ContextSnapshot {
        let sun_lookup = async {
            match captured_at {
                Some(at) => match self.sun.sun_times(latitude, longitude, at).await {
                    Ok(sun) => Some(sun),
                    Err(e) => {
                        tracing::warn!(error = %e, "Sunrise/sunset lookup failed, continuing without it");
                        None
                    }
                },
                None => None,
            }
        };

        let weather_lookup = async {
            match (&self.weather, captured_at) {
                (Some(client), Some(_)) => match client.current_conditions(latitude, longitude).await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::warn!(error = %e, "Weather lookup failed, continuing without it");
                        None
                    }
                },
                _ => None,
            }
        };

        let geocode_lookup = async {
            match self.geocode.place_name(latitude, longitude).await {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!(error = %e, "Reverse geocode failed, continuing without it");
                    None
                }
            }
        };

        let (sun, weather, place_name) = tokio::join!(sun_lookup, weather_lookup, geocode_lookup);

        ContextSnapshot {
            sun,
            weather,
            place_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gather_degrades_to_empty_when_providers_unreachable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .with_body("upstream exploded")
            .expect_at_least(1)
            .create_async()
            .await;

        let gatherer = ContextGatherer::from_urls(
            &server.url(),
            &server.url(),
            Some("test-key"),
            &server.url(),
        )
        .unwrap();

        let snapshot = gatherer
            .gather(37.8, -122.4, Some(Utc::now()))
            .await;

        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_gather_skips_sun_and_weather_without_capture_time() {
        let mut server = mockito::Server::new_async().await;
        let geocode_mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex("^/reverse".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"display_name": "Pier 39, San Francisco"}"#)
            .create_async()
            .await;

        let gatherer = ContextGatherer::from_urls(
            &server.url(),
            &server.url(),
            Some("test-key"),
            &server.url(),
        )
        .unwrap();

        let snapshot = gatherer.gather(37.8, -122.4, None).await;

        geocode_mock.assert_async().await;
        assert!(snapshot.sun.is_none());
        assert!(snapshot.weather.is_none());
        assert_eq!(
            snapshot.place_name.as_deref(),
            Some("Pier 39, San Francisco")
        );
    }
}
