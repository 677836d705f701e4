//! Current-conditions weather lookup
//!
//! Current conditions only; the provider's historical endpoints are not
//! used. The prompt compensates by allowing the model's web-search tool for
//! past weather claims.

use anyhow::{Context, Result};
use reqwest::Client;
use seen_core::models::WeatherReport;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct WeatherApiResponse {
    weather: Vec<WeatherCondition>,
    main: WeatherMain,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
}

/// Client for an OpenWeatherMap-style current-conditions API.
#[derive(Clone)]
pub struct WeatherClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for weather lookup")?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport> {
        let url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&units=metric&appid={}",
            self.base_url, latitude, longitude, self.api_key
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to query weather API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Weather API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: WeatherApiResponse = response
            .json()
            .await
            .context("Failed to parse weather response")?;

        let description = parsed
            .weather
            .first()
            .map(|c| c.description.clone())
            .unwrap_or_default();
        let conditions = parsed.weather.into_iter().map(|c| c.main).collect();

        Ok(WeatherReport {
            description,
            temperature_c: parsed.main.temp,
            conditions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_conditions_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "weather": [
                        {"main": "Clear", "description": "clear sky"},
                        {"main": "Haze", "description": "light haze"}
                    ],
                    "main": {"temp": 24.3}
                }"#,
            )
            .create_async()
            .await;

        let client = WeatherClient::new(server.url(), "test-key").unwrap();
        let report = client.current_conditions(37.8, -122.4).await.unwrap();

        mock.assert_async().await;
        assert_eq!(report.description, "clear sky");
        assert_eq!(report.temperature_c, 24.3);
        assert_eq!(report.conditions, vec!["Clear", "Haze"]);
    }

    #[tokio::test]
    async fn test_current_conditions_propagates_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"cod": 401, "message": "Invalid API key"}"#)
            .create_async()
            .await;

        let client = WeatherClient::new(server.url(), "bad-key").unwrap();
        let result = client.current_conditions(37.8, -122.4).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("401"));
    }
}
