use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known state of a check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    #[default]
    Unknown,
    Up,
    Down,
}

impl std::fmt::Display for CheckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckState::Unknown => write!(f, "unknown"),
            CheckState::Up => write!(f, "up"),
            CheckState::Down => write!(f, "down"),
        }
    }
}

/// Scheme used to reach a check's target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// HTTP method a check probes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// One monitored endpoint plus its last known state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    /// 20-char id, generated at creation, immutable
    pub id: String,

    /// Owning user's phone number (10 digits), immutable
    pub phone: String,

    pub protocol: Protocol,

    /// Host/path portion of the target; the scheme comes from `protocol`
    pub url: String,

    pub method: HttpMethod,

    /// Status codes considered "up"
    pub success_codes: BTreeSet<u16>,

    /// Per-probe request timeout, 1 to 5 seconds
    pub timeout_seconds: u64,

    /// `Unknown` until the first probe completes
    #[serde(default)]
    pub state: CheckState,

    /// Timestamp of the most recent probe attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
}

impl Check {
    /// Full target URL the probe will request
    pub fn target(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }
}

/// Result of one probe attempt, folded into the check's state by the
/// evaluator. Never persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub check_id: String,

    /// HTTP status code, absent when no response arrived
    pub response_code: Option<u16>,

    /// Failure cause ("timeout" or the transport error), absent on response
    pub error: Option<String>,

    /// Up iff a response arrived with a code in the check's success set
    pub observed_state: CheckState,
}

impl ProbeOutcome {
    /// Outcome for a probe that got a response within the timeout
    pub fn responded(check_id: String, code: u16, is_success: bool) -> Self {
        Self {
            check_id,
            response_code: Some(code),
            error: None,
            observed_state: if is_success { CheckState::Up } else { CheckState::Down },
        }
    }

    /// Outcome for a probe that timed out or hit a transport error
    pub fn failed(check_id: String, error: String) -> Self {
        Self { check_id, response_code: None, error: Some(error), observed_state: CheckState::Down }
    }
}
