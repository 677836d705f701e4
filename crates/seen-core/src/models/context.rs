use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sunrise/sunset instants for a coordinate and date, with the derived
/// daytime flag for the capture instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub is_daytime: bool,
}

/// Current weather conditions at a coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub description: String,
    pub temperature_c: f64,
    pub conditions: Vec<String>,
}

/// Ephemeral bundle of contextual signals used as ground truth during one
/// verification attempt. Computed fresh per attempt; never persisted.
///
/// Each signal degrades independently to `None` when its provider is
/// unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub sun: Option<SunTimes>,
    pub weather: Option<WeatherReport>,
    pub place_name: Option<String>,
}

impl ContextSnapshot {
    pub fn is_empty(&self) -> bool {
        self.sun.is_none() && self.weather.is_none() && self.place_name.is_none()
    }
}
