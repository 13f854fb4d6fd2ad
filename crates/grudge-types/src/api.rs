use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Category, Event, EventKind, FriendshipStatus, UserSummary};

// -- JWT Claims --

/// JWT claims shared by the auth handlers (token issuing) and the request
/// middleware (token validation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub username: String,
    /// Optional invite token; a missing or expired invite is skipped, it
    /// never fails the registration.
    pub invite_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Email address or username.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEventRequest {
    pub category: Category,
    pub note: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EventKind,
    pub category: Category,
    pub note: Option<String>,
    pub is_shared: bool,
    pub week_start: DateTime<Utc>,
    pub week_label: String,
    pub created_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn new(event: Event, week_label: String) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            kind: event.kind,
            category: event.category,
            note: event.note,
            is_shared: event.is_shared,
            week_start: event.week_start,
            week_label,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
}

#[derive(Debug, Serialize)]
pub struct SharedEventListResponse {
    pub events: Vec<EventResponse>,
    pub friend_name: String,
}

// -- Friends --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendFriendRequest {
    pub friend_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SendFriendResponse {
    pub friend_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendAction {
    Accept,
    Reject,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespondFriendRequest {
    pub friendship_id: Uuid,
    pub action: FriendAction,
}

#[derive(Debug, Serialize)]
pub struct PendingRequest {
    pub id: Uuid,
    pub from: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct FriendsResponse {
    pub friends: Vec<UserSummary>,
    pub pending_requests: Vec<PendingRequest>,
}

// -- Invites --

#[derive(Debug, Serialize)]
pub struct CreateInviteResponse {
    pub invite_url: String,
}

#[derive(Debug, Serialize)]
pub struct Inviter {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct InviteInfoResponse {
    pub valid: bool,
    pub inviter: Inviter,
}

// -- User search --

#[derive(Debug, Serialize)]
pub struct SearchUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub friendship_status: Option<FriendshipStatus>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub users: Vec<SearchUser>,
}
