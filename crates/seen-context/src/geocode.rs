//! Reverse geocoding: coordinate to human-readable place name

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 10;
// Nominatim's usage policy requires an identifying User-Agent.
const USER_AGENT: &str = concat!("seen/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    display_name: Option<String>,
}

/// Client for a Nominatim-style reverse geocode API.
#[derive(Clone)]
pub struct GeocodeClient {
    http_client: Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client for reverse geocoding")?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub async fn place_name(&self, latitude: f64, longitude: f64) -> Result<String> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=jsonv2",
            self.base_url, latitude, longitude
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to query reverse geocode API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Reverse geocode request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: ReverseGeocodeResponse = response
            .json()
            .await
            .context("Failed to parse reverse geocode response")?;

        parsed
            .display_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Reverse geocode returned no place name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_place_name_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"display_name": "Ferry Building, San Francisco, California"}"#)
            .create_async()
            .await;

        let client = GeocodeClient::new(server.url()).unwrap();
        let name = client.place_name(37.79, -122.39).await.unwrap();

        mock.assert_async().await;
        assert_eq!(name, "Ferry Building, San Francisco, California");
    }

    #[tokio::test]
    async fn test_place_name_rejects_empty_result() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Unable to geocode"}"#)
            .create_async()
            .await;

        let client = GeocodeClient::new(server.url()).unwrap();
        assert!(client.place_name(0.0, 0.0).await.is_err());
    }
}
