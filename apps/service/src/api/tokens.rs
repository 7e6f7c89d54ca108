use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use super::{AppState, from_record, required_phone, required_trimmed, to_record};
use crate::error::ApiError;
use crate::helpers;
use crate::models::{Token, User};
use crate::monitoring::validation::ID_LENGTH;
use crate::store::{StoreError, TOKENS, USERS};

#[derive(Debug, Deserialize)]
pub struct CreateToken {
    phone: Option<String>,
    password: Option<String>,
}

#[post("/tokens")]
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateToken>,
) -> Result<HttpResponse, ApiError> {
    let phone = required_phone(body.phone.as_deref())?;
    let password = required_trimmed(body.password.as_deref(), "password")?;

    let raw = match state.store.read(USERS, &phone).await {
        Ok(raw) => raw,
        Err(StoreError::NotFound { .. }) => {
            return Err(ApiError::BadRequest("could not find the specified user".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let user: User = from_record(raw, "user")?;

    if helpers::hash(&state.hashing_secret, &password) != user.hashed_password {
        return Err(ApiError::BadRequest("password did not match".to_string()));
    }

    let token = Token::new(phone);
    state.store.create(TOKENS, &token.id, &to_record(&token)?).await?;
    Ok(HttpResponse::Ok().json(token))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: String,
}

#[get("/tokens")]
pub async fn read(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = valid_token_id(&query.id)?;
    let raw = state.store.read(TOKENS, id).await?;
    let token: Token = from_record(raw, "token")?;
    Ok(HttpResponse::Ok().json(token))
}

#[derive(Debug, Deserialize)]
pub struct UpdateToken {
    id: Option<String>,
    extend: Option<bool>,
}

#[put("/tokens")]
pub async fn update(
    state: web::Data<AppState>,
    body: web::Json<UpdateToken>,
) -> Result<HttpResponse, ApiError> {
    let id = required_trimmed(body.id.as_deref(), "id")?;
    let id = valid_token_id(&id)?;
    if body.extend != Some(true) {
        return Err(ApiError::BadRequest("missing or invalid field: extend".to_string()));
    }

    let raw = state.store.read(TOKENS, id).await?;
    let mut token: Token = from_record(raw, "token")?;
    if token.is_expired() {
        return Err(ApiError::BadRequest(
            "the token has already expired and cannot be extended".to_string(),
        ));
    }

    token.extend();
    state.store.update(TOKENS, id, &to_record(&token)?).await?;
    Ok(HttpResponse::Ok().finish())
}

#[delete("/tokens")]
pub async fn remove(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = valid_token_id(&query.id)?;
    state.store.delete(TOKENS, id).await?;
    Ok(HttpResponse::Ok().finish())
}

fn valid_token_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.len() != ID_LENGTH {
        return Err(ApiError::BadRequest("missing or invalid field: id".to_string()));
    }
    Ok(id)
}
