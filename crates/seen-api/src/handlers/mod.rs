//! HTTP handlers

pub mod uploads;
pub mod verify;

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
