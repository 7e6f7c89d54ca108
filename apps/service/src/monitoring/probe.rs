use std::time::Duration;

use anyhow::Result;

use super::types::{Check, ProbeOutcome};

/// Issues a single outbound request per check and classifies the result.
///
/// One shared client with no default timeout; each probe is bounded by the
/// check's own timeout, capped at the configured maximum. When the timeout
/// fires, dropping the in-flight request cancels the underlying connection.
pub struct ProbeExecutor {
    client: reqwest::Client,
    max_timeout: Duration,
}

impl ProbeExecutor {
    pub fn new(max_timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, max_timeout: Duration::from_secs(max_timeout_seconds) })
    }

    /// Probe the check's target once. Never retries: the next scheduled
    /// cycle is the retry mechanism.
    pub async fn probe(&self, check: &Check) -> ProbeOutcome {
        let timeout = Duration::from_secs(check.timeout_seconds).min(self.max_timeout);

        let request = self
            .client
            .request(check.method.as_reqwest(), check.target())
            .timeout(timeout);

        match request.send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                ProbeOutcome::responded(
                    check.id.clone(),
                    code,
                    check.success_codes.contains(&code),
                )
            }
            Err(e) if e.is_timeout() => {
                ProbeOutcome::failed(check.id.clone(), "timeout".to_string())
            }
            Err(e) => ProbeOutcome::failed(check.id.clone(), e.to_string()),
        }
    }
}
