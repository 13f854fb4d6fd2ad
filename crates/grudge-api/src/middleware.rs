use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};

use grudge_db::time;
use grudge_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// The raw bearer token of the current request; logout needs it to delete
/// the matching session row.
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

/// Extracts and validates the JWT from the Authorization header, then
/// checks that its session row still exists and is unexpired — password
/// reset revokes sessions by deleting those rows, so a decodable token
/// alone is not enough.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    let session = state
        .db
        .get_session(&token)
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::Unauthorized)?;

    if time::decode(&session.expires_at).map_err(ApiError::Internal)? < Utc::now() {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(token_data.claims);
    req.extensions_mut().insert(AuthToken(token));
    Ok(next.run(req).await)
}
