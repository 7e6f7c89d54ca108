use std::collections::BTreeSet;

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use url::Url;

use super::{AppState, auth, from_record, required_trimmed, to_record};
use crate::error::ApiError;
use crate::helpers;
use crate::models::User;
use crate::monitoring::types::{Check, CheckState, HttpMethod, Protocol};
use crate::monitoring::validation::{ID_LENGTH, valid_success_codes, valid_timeout};
use crate::store::{CHECKS, USERS};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheck {
    protocol: Option<Protocol>,
    url: Option<String>,
    method: Option<HttpMethod>,
    success_codes: Option<BTreeSet<u16>>,
    timeout_seconds: Option<u64>,
}

#[post("/checks")]
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateCheck>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let token = auth::token_from_request(state.store.as_ref(), &req).await?;

    let protocol = body
        .protocol
        .ok_or_else(|| ApiError::BadRequest("missing or invalid field: protocol".to_string()))?;
    let url = valid_target(protocol, required_trimmed(body.url.as_deref(), "url")?)?;
    let method = body
        .method
        .ok_or_else(|| ApiError::BadRequest("missing or invalid field: method".to_string()))?;
    let success_codes = body
        .success_codes
        .clone()
        .filter(valid_success_codes)
        .ok_or_else(|| ApiError::BadRequest("missing or invalid field: successCodes".to_string()))?;
    let timeout_seconds = body
        .timeout_seconds
        .filter(|secs| valid_timeout(*secs))
        .ok_or_else(|| {
            ApiError::BadRequest("missing or invalid field: timeoutSeconds".to_string())
        })?;

    // The token resolves to the owning user; its check list enforces the
    // per-user cap.
    let raw = state
        .store
        .read(USERS, &token.phone)
        .await
        .map_err(|_| ApiError::Unauthorized)?;
    let mut user: User = from_record(raw, "user")?;

    if user.checks.len() >= state.max_checks {
        return Err(ApiError::Forbidden(format!(
            "the user already has the maximum number of checks ({})",
            state.max_checks
        )));
    }

    let check = Check {
        id: helpers::random_id(ID_LENGTH),
        phone: user.phone.clone(),
        protocol,
        url,
        method,
        success_codes,
        timeout_seconds,
        state: CheckState::Unknown,
        last_checked: None,
    };

    state.store.create(CHECKS, &check.id, &to_record(&check)?).await?;

    user.checks.push(check.id.clone());
    state.store.update(USERS, &user.phone, &to_record(&user)?).await?;

    Ok(HttpResponse::Ok().json(check))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: String,
}

#[get("/checks")]
pub async fn read(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let check = load_check(&state, &query.id).await?;
    auth::require_token(state.store.as_ref(), &req, &check.phone).await?;
    Ok(HttpResponse::Ok().json(check))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheck {
    id: Option<String>,
    protocol: Option<Protocol>,
    url: Option<String>,
    method: Option<HttpMethod>,
    success_codes: Option<BTreeSet<u16>>,
    timeout_seconds: Option<u64>,
}

#[put("/checks")]
pub async fn update(
    state: web::Data<AppState>,
    body: web::Json<UpdateCheck>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let id = required_trimmed(body.id.as_deref(), "id")?;
    if body.protocol.is_none()
        && body.url.is_none()
        && body.method.is_none()
        && body.success_codes.is_none()
        && body.timeout_seconds.is_none()
    {
        return Err(ApiError::BadRequest("at least one field to update is required".to_string()));
    }

    let mut check = load_check(&state, &id).await?;
    auth::require_token(state.store.as_ref(), &req, &check.phone).await?;

    if let Some(protocol) = body.protocol {
        check.protocol = protocol;
    }
    if body.url.is_some() {
        check.url =
            valid_target(check.protocol, required_trimmed(body.url.as_deref(), "url")?)?;
    }
    if let Some(method) = body.method {
        check.method = method;
    }
    if let Some(codes) = &body.success_codes {
        if !valid_success_codes(codes) {
            return Err(ApiError::BadRequest(
                "missing or invalid field: successCodes".to_string(),
            ));
        }
        check.success_codes = codes.clone();
    }
    if let Some(secs) = body.timeout_seconds {
        if !valid_timeout(secs) {
            return Err(ApiError::BadRequest(
                "missing or invalid field: timeoutSeconds".to_string(),
            ));
        }
        check.timeout_seconds = secs;
    }

    state.store.update(CHECKS, &check.id, &to_record(&check)?).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Deleting a check also removes its id from the owner's check list.
#[delete("/checks")]
pub async fn remove(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let check = load_check(&state, &query.id).await?;
    auth::require_token(state.store.as_ref(), &req, &check.phone).await?;

    state.store.delete(CHECKS, &check.id).await?;

    let raw = state.store.read(USERS, &check.phone).await.map_err(|_| {
        ApiError::Internal("could not remove the check from the owner's check list".to_string())
    })?;
    let mut user: User = from_record(raw, "user")?;
    user.checks.retain(|id| id != &check.id);
    state.store.update(USERS, &user.phone, &to_record(&user)?).await?;

    Ok(HttpResponse::Ok().finish())
}

/// The url field must combine with the check's protocol into a
/// well-formed target
fn valid_target(protocol: Protocol, url: String) -> Result<String, ApiError> {
    Url::parse(&format!("{protocol}://{url}"))
        .map_err(|_| ApiError::BadRequest("missing or invalid field: url".to_string()))?;
    Ok(url)
}

async fn load_check(state: &AppState, id: &str) -> Result<Check, ApiError> {
    let id = id.trim();
    if id.len() != ID_LENGTH {
        return Err(ApiError::BadRequest("missing or invalid field: id".to_string()));
    }
    let raw = state.store.read(CHECKS, id).await?;
    from_record(raw, "check")
}
