use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;

use grudge_core::friends::FriendGraph;
use grudge_types::api::{Claims, CreateInviteResponse, InviteInfoResponse, Inviter};

use crate::auth::{AppState, run_domain};
use crate::error::ApiError;

pub async fn create_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<CreateInviteResponse>, ApiError> {
    let user_id = claims.sub;
    let app_url = state.app_url.clone();

    let invite = run_domain(state, move |db| {
        FriendGraph::new(db).create_invite(user_id, Utc::now())
    })
    .await?;

    Ok(Json(CreateInviteResponse {
        invite_url: format!("{}/invite/{}", app_url, invite.token),
    }))
}

/// Public: the registration page calls this to show who the invite is from
/// before an account exists.
pub async fn invite_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InviteInfoResponse>, ApiError> {
    let inviter = run_domain(state, move |db| {
        FriendGraph::new(db).invite_info(&token, Utc::now())
    })
    .await?;

    Ok(Json(InviteInfoResponse {
        valid: true,
        inviter: Inviter {
            id: inviter.id,
            username: inviter.username,
            name: inviter.name,
        },
    }))
}
