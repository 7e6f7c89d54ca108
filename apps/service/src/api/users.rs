use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use tracing::warn;

use super::{AppState, auth, from_record, required_phone, required_trimmed, to_record};
use crate::error::ApiError;
use crate::helpers;
use crate::models::User;
use crate::store::{CHECKS, StoreError, USERS};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    password: Option<String>,
    tos_agreement: Option<bool>,
}

#[post("/users")]
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    let first_name = required_trimmed(body.first_name.as_deref(), "firstName")?;
    let last_name = required_trimmed(body.last_name.as_deref(), "lastName")?;
    let phone = required_phone(body.phone.as_deref())?;
    let password = required_trimmed(body.password.as_deref(), "password")?;
    if body.tos_agreement != Some(true) {
        return Err(ApiError::BadRequest("the terms of service must be accepted".to_string()));
    }

    let user = User {
        first_name,
        last_name,
        phone,
        hashed_password: helpers::hash(&state.hashing_secret, &password),
        tos_agreement: true,
        checks: Vec::new(),
    };

    match state.store.create(USERS, &user.phone, &to_record(&user)?).await {
        Ok(()) => Ok(HttpResponse::Ok().finish()),
        Err(StoreError::AlreadyExists { .. }) => Err(ApiError::Conflict(
            "a user with that phone number already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    phone: String,
}

#[get("/users")]
pub async fn read(
    state: web::Data<AppState>,
    query: web::Query<PhoneQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let phone = required_phone(Some(&query.phone))?;
    auth::require_token(state.store.as_ref(), &req, &phone).await?;

    let raw = state.store.read(USERS, &phone).await?;
    let user: User = from_record(raw, "user")?;
    Ok(HttpResponse::Ok().json(user.public()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    phone: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    password: Option<String>,
}

#[put("/users")]
pub async fn update(
    state: web::Data<AppState>,
    body: web::Json<UpdateUser>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let phone = required_phone(body.phone.as_deref())?;
    if body.first_name.is_none() && body.last_name.is_none() && body.password.is_none() {
        return Err(ApiError::BadRequest("at least one field to update is required".to_string()));
    }
    auth::require_token(state.store.as_ref(), &req, &phone).await?;

    let raw = state.store.read(USERS, &phone).await?;
    let mut user: User = from_record(raw, "user")?;

    if body.first_name.is_some() {
        user.first_name = required_trimmed(body.first_name.as_deref(), "firstName")?;
    }
    if body.last_name.is_some() {
        user.last_name = required_trimmed(body.last_name.as_deref(), "lastName")?;
    }
    if body.password.is_some() {
        let password = required_trimmed(body.password.as_deref(), "password")?;
        user.hashed_password = helpers::hash(&state.hashing_secret, &password);
    }

    state.store.update(USERS, &phone, &to_record(&user)?).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Deleting a user also deletes every check the user owns, keeping the
/// user/check cross-references consistent.
#[delete("/users")]
pub async fn remove(
    state: web::Data<AppState>,
    query: web::Query<PhoneQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let phone = required_phone(Some(&query.phone))?;
    auth::require_token(state.store.as_ref(), &req, &phone).await?;

    let raw = state.store.read(USERS, &phone).await?;
    let user: User = from_record(raw, "user")?;

    state.store.delete(USERS, &phone).await?;

    let mut failed = 0usize;
    for check_id in &user.checks {
        if let Err(e) = state.store.delete(CHECKS, check_id).await {
            warn!(check = %check_id, error = %e, "could not delete user's check");
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(ApiError::Internal(format!(
            "user deleted, but {failed} of their checks could not be removed"
        )));
    }

    Ok(HttpResponse::Ok().finish())
}
