//! Sanity-checking of stored check records before they are scheduled.
//!
//! Records come out of the store as raw JSON and may have been written by
//! an older version or tampered with, so every field is normalized and
//! type-checked here. A record failing any required-field rule is rejected
//! whole; the scheduler logs it and skips it for the cycle.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::types::{Check, CheckState, HttpMethod, Protocol};

/// Required length of a check (and token) id
pub const ID_LENGTH: usize = 20;

/// Required length of a phone number
pub const PHONE_LENGTH: usize = 10;

/// Allowed range for a check's per-probe timeout, in seconds
pub const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=5;

/// A stored check record with a missing or malformed field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("check record field `{0}` is missing or malformed")]
pub struct InvalidRecord(pub &'static str);

/// Normalize and type-check a raw stored check record.
///
/// Pure and idempotent: validating an already-valid check's serialized form
/// yields the same check. `state` and `lastChecked` are not required; a
/// missing or unreadable `state` defaults to `unknown`.
pub fn validate_check(raw: &Value) -> Result<Check, InvalidRecord> {
    let id = trimmed(raw, "id")
        .filter(|s| s.len() == ID_LENGTH)
        .ok_or(InvalidRecord("id"))?;
    let phone = trimmed(raw, "phone")
        .filter(|s| s.len() == PHONE_LENGTH)
        .ok_or(InvalidRecord("phone"))?;
    let protocol = match raw.get("protocol").and_then(Value::as_str) {
        Some("http") => Protocol::Http,
        Some("https") => Protocol::Https,
        _ => return Err(InvalidRecord("protocol")),
    };
    let url = trimmed(raw, "url").ok_or(InvalidRecord("url"))?;
    let method = match raw.get("method").and_then(Value::as_str) {
        Some("get") => HttpMethod::Get,
        Some("post") => HttpMethod::Post,
        Some("put") => HttpMethod::Put,
        Some("delete") => HttpMethod::Delete,
        _ => return Err(InvalidRecord("method")),
    };
    let success_codes = raw
        .get("successCodes")
        .and_then(Value::as_array)
        .and_then(|codes| parse_success_codes(codes))
        .ok_or(InvalidRecord("successCodes"))?;
    let timeout_seconds = raw
        .get("timeoutSeconds")
        .and_then(Value::as_u64)
        .filter(|secs| valid_timeout(*secs))
        .ok_or(InvalidRecord("timeoutSeconds"))?;

    // Optional fields: absent (or unreadable) until the first probe runs.
    let state = raw
        .get("state")
        .and_then(|v| serde_json::from_value::<CheckState>(v.clone()).ok())
        .unwrap_or_default();
    let last_checked = raw
        .get("lastChecked")
        .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok());

    Ok(Check {
        id,
        phone,
        protocol,
        url,
        method,
        success_codes,
        timeout_seconds,
        state,
        last_checked,
    })
}

/// True when `secs` is an acceptable per-probe timeout
pub fn valid_timeout(secs: u64) -> bool {
    TIMEOUT_RANGE.contains(&secs)
}

/// True when `codes` is a usable success-code set
pub fn valid_success_codes(codes: &BTreeSet<u16>) -> bool {
    !codes.is_empty()
}

/// A field's string value, whitespace-trimmed, `None` if missing, not a
/// string, or empty after trimming
fn trimmed(raw: &Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// All elements must be integer status codes; the set must be non-empty
fn parse_success_codes(codes: &[Value]) -> Option<BTreeSet<u16>> {
    if codes.is_empty() {
        return None;
    }
    codes
        .iter()
        .map(|code| code.as_u64().and_then(|c| u16::try_from(c).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "id": "abcdefghij0123456789",
            "phone": "5551234567",
            "protocol": "https",
            "url": "example.com/status",
            "method": "get",
            "successCodes": [200, 201],
            "timeoutSeconds": 3,
        })
    }

    #[test]
    fn accepts_valid_record_with_defaults() {
        let check = validate_check(&valid_record()).unwrap();
        assert_eq!(check.id, "abcdefghij0123456789");
        assert_eq!(check.protocol, Protocol::Https);
        assert_eq!(check.method, HttpMethod::Get);
        assert_eq!(check.success_codes, BTreeSet::from([200, 201]));
        assert_eq!(check.state, CheckState::Unknown);
        assert!(check.last_checked.is_none());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut raw = valid_record();
        raw["phone"] = json!("  5551234567  ");
        raw["url"] = json!(" example.com ");
        let check = validate_check(&raw).unwrap();
        assert_eq!(check.phone, "5551234567");
        assert_eq!(check.url, "example.com");
    }

    #[test]
    fn rejects_bad_id_length() {
        let mut raw = valid_record();
        raw["id"] = json!("short");
        assert_eq!(validate_check(&raw), Err(InvalidRecord("id")));
    }

    #[test]
    fn rejects_bad_phone_length() {
        let mut raw = valid_record();
        raw["phone"] = json!("555123456");
        assert_eq!(validate_check(&raw), Err(InvalidRecord("phone")));
    }

    #[test]
    fn rejects_unknown_protocol_and_method() {
        let mut raw = valid_record();
        raw["protocol"] = json!("ftp");
        assert_eq!(validate_check(&raw), Err(InvalidRecord("protocol")));

        let mut raw = valid_record();
        raw["method"] = json!("patch");
        assert_eq!(validate_check(&raw), Err(InvalidRecord("method")));
    }

    #[test]
    fn rejects_empty_or_non_integer_success_codes() {
        let mut raw = valid_record();
        raw["successCodes"] = json!([]);
        assert_eq!(validate_check(&raw), Err(InvalidRecord("successCodes")));

        let mut raw = valid_record();
        raw["successCodes"] = json!(["200"]);
        assert_eq!(validate_check(&raw), Err(InvalidRecord("successCodes")));
    }

    #[test]
    fn rejects_timeout_out_of_range() {
        for bad in [0, 6, 60] {
            let mut raw = valid_record();
            raw["timeoutSeconds"] = json!(bad);
            assert_eq!(validate_check(&raw), Err(InvalidRecord("timeoutSeconds")));
        }
        let mut raw = valid_record();
        raw["timeoutSeconds"] = json!(2.5);
        assert_eq!(validate_check(&raw), Err(InvalidRecord("timeoutSeconds")));
    }

    #[test]
    fn rejects_missing_fields() {
        for field in ["id", "phone", "protocol", "url", "method", "successCodes", "timeoutSeconds"]
        {
            let mut raw = valid_record();
            raw.as_object_mut().unwrap().remove(field);
            assert_eq!(validate_check(&raw), Err(InvalidRecord(field)), "field {field}");
        }
    }

    #[test]
    fn unreadable_state_defaults_to_unknown() {
        let mut raw = valid_record();
        raw["state"] = json!("degraded");
        assert_eq!(validate_check(&raw).unwrap().state, CheckState::Unknown);
    }

    #[test]
    fn preserves_recorded_state_and_last_checked() {
        let mut raw = valid_record();
        raw["state"] = json!("down");
        raw["lastChecked"] = json!("2026-08-01T12:00:00Z");
        let check = validate_check(&raw).unwrap();
        assert_eq!(check.state, CheckState::Down);
        assert!(check.last_checked.is_some());
    }

    #[test]
    fn idempotent_over_serialized_form() {
        let check = validate_check(&valid_record()).unwrap();
        let reserialized = serde_json::to_value(&check).unwrap();
        assert_eq!(validate_check(&reserialized).unwrap(), check);
    }
}
