use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use grudge_core::friends::{FriendGraph, user_summary};
use grudge_core::{Error as DomainError, Result as DomainResult};
use grudge_db::{Database, time};
use grudge_types::api::{
    Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    ResetPasswordRequest,
};

use crate::email::Mailer;
use crate::error::ApiError;
use crate::middleware::AuthToken;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Base URL for invite and password-reset links.
    pub app_url: String,
    pub mailer: Mailer,
}

const SESSION_TTL: Duration = Duration::days(7);
const RESET_TTL: Duration = Duration::hours(1);
const MIN_PASSWORD_LEN: usize = 6;

fn valid_username(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    if req.email.trim().is_empty() || req.name.trim().is_empty() {
        return Err(DomainError::Validation("email and name are required".into()).into());
    }
    if !valid_username(&req.username) {
        return Err(DomainError::Validation(
            "username must be 3-20 characters, letters, numbers, and underscores only".into(),
        )
        .into());
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .into());
    }

    let username = req.username.to_lowercase();

    if state
        .db
        .get_user_by_email(&req.email)
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("email already registered"));
    }
    if state
        .db
        .get_user_by_username(&username)
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("username already taken"));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    state
        .db
        .create_user(
            &user_id.to_string(),
            &req.email,
            &username,
            &req.name,
            &password_hash,
            &time::encode(now),
        )
        .map_err(ApiError::Internal)?;

    // Signed up via an invite link: link the inviter as an accepted friend.
    // A missing or expired invite skips the linkage, it never fails the
    // registration.
    if let Some(token) = &req.invite_token {
        match FriendGraph::new(&state.db).redeem_invite(token, user_id, now) {
            Ok(()) => info!("user {} registered via invite", username),
            Err(DomainError::NotFound(_) | DomainError::Expired(_)) => {
                warn!("invite token unusable at registration, skipping friendship");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished after insert")))?;

    let token = issue_session(&state.db, &state.jwt_secret, user_id, &username)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user_summary(&user)?,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The identifier may be an email address or a username; the response
    // never says which part was wrong.
    let user = match state
        .db
        .get_user_by_email(&req.identifier)
        .map_err(ApiError::Internal)?
    {
        Some(user) => Some(user),
        None => state
            .db
            .get_user_by_username(&req.identifier.to_lowercase())
            .map_err(ApiError::Internal)?,
    }
    .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unparsable: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("bad user id: {e}")))?;

    let token = issue_session(&state.db, &state.jwt_secret, user_id, &user.username)?;

    Ok(Json(LoginResponse {
        user: user_summary(&user)?,
        token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<AuthToken>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_session(&token.0).map_err(ApiError::Internal)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() {
        return Err(DomainError::Validation("email required".into()).into());
    }

    // Always report success so the endpoint cannot be used to probe which
    // emails are registered.
    let Some(user) = state
        .db
        .get_user_by_email(&req.email)
        .map_err(ApiError::Internal)?
    else {
        return Ok(Json(serde_json::json!({ "success": true })));
    };

    let token = hex::encode(rand::rng().random::<[u8; 32]>());
    let now = Utc::now();

    state
        .db
        .delete_password_resets_for_user(&user.id)
        .map_err(ApiError::Internal)?;
    state
        .db
        .insert_password_reset(
            &Uuid::new_v4().to_string(),
            &user.id,
            &token,
            &time::encode(now + RESET_TTL),
        )
        .map_err(ApiError::Internal)?;

    let reset_url = format!("{}/reset-password?token={}", state.app_url, token);
    state
        .mailer
        .send_password_reset(&user.email, &reset_url)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .into());
    }

    let reset = state
        .db
        .get_password_reset(&req.token)
        .map_err(ApiError::Internal)?
        .ok_or(DomainError::NotFound("reset token"))?;

    let expired = time::decode(&reset.expires_at).map_err(ApiError::Internal)? < Utc::now();
    if reset.used || expired {
        return Err(DomainError::Expired("reset token").into());
    }

    let password_hash = hash_password(&req.password)?;
    state
        .db
        .update_user_password(&reset.user_id, &password_hash)
        .map_err(ApiError::Internal)?;
    state
        .db
        .mark_password_reset_used(&reset.id)
        .map_err(ApiError::Internal)?;

    // Every live session of the user is revoked.
    state
        .db
        .delete_sessions_for_user(&reset.user_id)
        .map_err(ApiError::Internal)?;

    Ok(Json(serde_json::json!({ "success": true })))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to hash password: {e}")))
}

/// Mints a JWT and persists the matching session row.
fn issue_session(
    db: &Database,
    secret: &str,
    user_id: Uuid,
    username: &str,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let expires_at = now + SESSION_TTL;

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to sign token: {e}")))?;

    db.insert_session(&token, &user_id.to_string(), &time::encode(expires_at))
        .map_err(ApiError::Internal)?;

    Ok(token)
}

/// Runs domain work off the async runtime. Shared by the event, friend,
/// and search handlers.
pub(crate) async fn run_domain<T, F>(state: AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> DomainResult<T> + Send + 'static,
{
    let res = tokio::task::spawn_blocking(move || f(&state.db)).await;
    crate::error::join_blocking(res)
}
