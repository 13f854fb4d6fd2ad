use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use grudge_core::Error as DomainError;
use grudge_core::events::EventLog;
use grudge_core::friends::FriendGraph;
use grudge_types::api::{
    Claims, FriendsResponse, PendingRequest, RespondFriendRequest, SendFriendRequest,
    SendFriendResponse, SharedEventListResponse,
};
use grudge_types::models::EventKind;

use crate::auth::{AppState, run_domain};
use crate::error::ApiError;
use crate::events::{WeeksQuery, to_response};

/// Accepted friends plus incoming pending requests, in one payload.
pub async fn get_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<FriendsResponse>, ApiError> {
    let user_id = claims.sub;

    let (friends, pending) = run_domain(state, move |db| {
        let graph = FriendGraph::new(db);
        Ok((graph.list_friends(user_id)?, graph.list_pending(user_id)?))
    })
    .await?;

    Ok(Json(FriendsResponse {
        friends,
        pending_requests: pending
            .into_iter()
            .map(|p| PendingRequest {
                id: p.id,
                from: p.from,
            })
            .collect(),
    }))
}

pub async fn send_friend_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendFriendRequest>,
) -> Result<Json<SendFriendResponse>, ApiError> {
    let user_id = claims.sub;

    let target = run_domain(state, move |db| {
        FriendGraph::new(db).send_request(user_id, req.friend_id)
    })
    .await?;

    Ok(Json(SendFriendResponse {
        friend_name: target.name,
    }))
}

pub async fn respond_friend_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RespondFriendRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = claims.sub;

    run_domain(state, move |db| {
        FriendGraph::new(db).respond(req.friendship_id, user_id, req.action)
    })
    .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn list_friend_disrespects(
    State(state): State<AppState>,
    Path(friend_id): Path<Uuid>,
    Query(query): Query<WeeksQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SharedEventListResponse>, ApiError> {
    shared_events(state, claims.sub, friend_id, EventKind::Disrespect, query.weeks).await
}

pub async fn list_friend_wins(
    State(state): State<AppState>,
    Path(friend_id): Path<Uuid>,
    Query(query): Query<WeeksQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SharedEventListResponse>, ApiError> {
    shared_events(state, claims.sub, friend_id, EventKind::Win, query.weeks).await
}

/// A friend's shared events of one kind. The visibility gate inside
/// `list_shared_events` turns non-friends away with 403.
async fn shared_events(
    state: AppState,
    viewer: Uuid,
    friend_id: Uuid,
    kind: EventKind,
    weeks: u32,
) -> Result<Json<SharedEventListResponse>, ApiError> {
    let (events, friend_name) = run_domain(state, move |db| {
        let events = EventLog::new(db).list_shared_events(viewer, friend_id, kind, weeks)?;
        let friend = db
            .get_user_by_id(&friend_id.to_string())?
            .ok_or(DomainError::NotFound("user"))?;
        Ok((events, friend.name))
    })
    .await?;

    Ok(Json(SharedEventListResponse {
        events: events.into_iter().map(to_response).collect(),
        friend_name,
    }))
}
