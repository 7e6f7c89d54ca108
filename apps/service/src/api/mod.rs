//! JSON HTTP API: account, session-token and check management.
//!
//! Field rules mirror the engine's validator where the payloads overlap, so
//! a record accepted here is always schedulable.

pub mod checks;
pub mod tokens;
pub mod users;

mod auth;

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::monitoring::validation::PHONE_LENGTH;
use crate::store::Store;

/// Shared handler state, built once in `main`
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub hashing_secret: String,
    pub max_checks: usize,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(ping)
        .service(users::create)
        .service(users::read)
        .service(users::update)
        .service(users::remove)
        .service(tokens::create)
        .service(tokens::read)
        .service(tokens::update)
        .service(tokens::remove)
        .service(checks::create)
        .service(checks::read)
        .service(checks::update)
        .service(checks::remove);
}

/// Liveness route; the response status is enough.
#[get("/ping")]
async fn ping() -> impl Responder {
    HttpResponse::Ok()
}

/// A required string field, whitespace-trimmed
pub(crate) fn required_trimmed(field: Option<&str>, name: &str) -> Result<String, ApiError> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::BadRequest(format!("missing or invalid field: {name}")))
}

/// A phone number: exactly 10 digits after trimming
pub(crate) fn required_phone(field: Option<&str>) -> Result<String, ApiError> {
    field
        .map(str::trim)
        .filter(|s| s.len() == PHONE_LENGTH && s.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_owned)
        .ok_or_else(|| ApiError::BadRequest("phone must be exactly 10 digits".to_string()))
}

pub(crate) fn to_record<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Internal(format!("could not serialize record: {e}")))
}

pub(crate) fn from_record<T: serde::de::DeserializeOwned>(
    raw: Value,
    what: &str,
) -> Result<T, ApiError> {
    serde_json::from_value(raw)
        .map_err(|_| ApiError::Internal(format!("stored {what} record is malformed")))
}
