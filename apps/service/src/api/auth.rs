//! Token-header authentication shared by the protected handlers.

use actix_web::HttpRequest;

use super::from_record;
use crate::error::ApiError;
use crate::models::Token;
use crate::store::{Store, TOKENS};

/// The token id from the `token` request header
pub fn token_header(req: &HttpRequest) -> Result<&str, ApiError> {
    req.headers()
        .get("token")
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)
}

/// Load the header's token and require it to be unexpired
pub async fn token_from_request(store: &dyn Store, req: &HttpRequest) -> Result<Token, ApiError> {
    let id = token_header(req)?;
    let raw = store.read(TOKENS, id).await.map_err(|_| ApiError::Unauthorized)?;
    let token: Token = from_record(raw, "token").map_err(|_| ApiError::Unauthorized)?;
    if token.is_expired() {
        return Err(ApiError::Unauthorized);
    }
    Ok(token)
}

/// Require an unexpired token belonging to `phone`
pub async fn require_token(
    store: &dyn Store,
    req: &HttpRequest,
    phone: &str,
) -> Result<(), ApiError> {
    let token = token_from_request(store, req).await?;
    if token.phone != phone {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}
