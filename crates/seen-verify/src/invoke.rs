//! Model invocation with bounded retry and JSON recovery
//!
//! Per attempt: `Invoking` either yields a recoverable JSON object
//! (terminal success) or a parse/call failure; failures back off
//! exponentially and retry until the attempt budget is spent, at which
//! point the last error is surfaced. Exhaustion is a hard failure so
//! "unverified" stays distinguishable from "verification attempted and
//! failed".

use seen_core::AppError;
use seen_genai::{GenerateRequest, GenerativeModel, MediaPart};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::repair::extract_json_object;

/// Backoff in seconds after the n-th failed attempt (1s, 2s, 4s, ...).
#[inline]
fn backoff_seconds(failed_attempt: u32) -> u64 {
    2_u64.pow(failed_attempt.saturating_sub(1))
}

/// Drives the model call with a fixed attempt budget.
pub struct Invoker {
    model: Arc<dyn GenerativeModel>,
    max_attempts: u32,
}

impl Invoker {
    pub fn new(model: Arc<dyn GenerativeModel>, max_attempts: u32) -> Self {
        Self {
            model,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Invoke the model and recover a JSON verdict, retrying on call or
    /// parse failure. Images travel inline, staged videos by reference,
    /// text-only prompts with no media part.
    pub async fn invoke(&self, prompt: &str, media: MediaPart) -> Result<Value, AppError> {
        let request = GenerateRequest {
            prompt: prompt.to_string(),
            media,
            enable_web_search: true,
        };

        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 1..=self.max_attempts {
            match self.model.generate(&request).await {
                Ok(text) => match extract_json_object(&text) {
                    Ok(verdict) => {
                        tracing::debug!(attempt, "Model verdict parsed");
                        return Ok(verdict);
                    }
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Model response not parseable as JSON");
                        last_err = Some(e);
                    }
                },
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Model invocation failed");
                    last_err = Some(anyhow::Error::new(e));
                }
            }

            if attempt < self.max_attempts {
                let delay = backoff_seconds(attempt);
                tracing::debug!(attempt, delay_secs = delay, "Backing off before retry");
                sleep(Duration::from_secs(delay)).await;
            }
        }

        Err(AppError::VerificationFailed {
            attempts: self.max_attempts,
            source: last_err
                .unwrap_or_else(|| anyhow::anyhow!("model invocation produced no error detail")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedModel;
    use std::sync::atomic::Ordering;
    use tokio::time::Instant;

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_seconds(1), 1);
        assert_eq!(backoff_seconds(2), 2);
        assert_eq!(backoff_seconds(3), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_parse_failures_then_success() {
        let model = ScriptedModel::new(vec![
            Ok("no json here at all".to_string()),
            Ok("still rambling".to_string()),
            Ok(r#"{"status": "verified"}"#.to_string()),
        ]);
        let calls = model.calls.clone();
        let invoker = Invoker::new(Arc::new(model), 3);

        let started = Instant::now();
        let verdict = invoker.invoke("check this", MediaPart::None).await.unwrap();

        assert_eq!(verdict["status"], "verified");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_last_error() {
        let model = ScriptedModel::new(vec![
            Err("upstream 500".to_string()),
            Err("upstream 500".to_string()),
            Ok("not json".to_string()),
        ]);
        let calls = model.calls.clone();
        let invoker = Invoker::new(Arc::new(model), 3);

        let err = invoker.invoke("check this", MediaPart::None).await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            AppError::VerificationFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                // The final attempt's parse failure is the surfaced error
                assert!(source.to_string().contains("no JSON object"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_skips_backoff() {
        let model = ScriptedModel::new(vec![Ok(r#"{"status": "verified"}"#.to_string())]);
        let calls = model.calls.clone();
        let invoker = Invoker::new(Arc::new(model), 3);

        let started = Instant::now();
        invoker.invoke("check this", MediaPart::None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
