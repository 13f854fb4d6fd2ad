use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use grudge_core::events::{DEFAULT_WEEKS_BACK, EventLog};
use grudge_core::week;
use grudge_types::api::{Claims, EventListResponse, EventResponse, RecordEventRequest};
use grudge_types::models::{Event, EventKind};

use crate::auth::{AppState, run_domain};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct WeeksQuery {
    /// Lookback window in weeks; 0 means the current week only.
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

fn default_weeks() -> u32 {
    DEFAULT_WEEKS_BACK
}

pub(crate) fn to_response(event: Event) -> EventResponse {
    let label = week::week_label(event.week_start);
    EventResponse::new(event, label)
}

pub async fn list_disrespects(
    State(state): State<AppState>,
    Query(query): Query<WeeksQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<EventListResponse>, ApiError> {
    list_events(state, claims.sub, EventKind::Disrespect, query.weeks).await
}

pub async fn list_wins(
    State(state): State<AppState>,
    Query(query): Query<WeeksQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<EventListResponse>, ApiError> {
    list_events(state, claims.sub, EventKind::Win, query.weeks).await
}

pub async fn record_disrespect(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RecordEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    record_event(state, claims.sub, EventKind::Disrespect, req).await
}

pub async fn record_win(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RecordEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    record_event(state, claims.sub, EventKind::Win, req).await
}

async fn list_events(
    state: AppState,
    user_id: Uuid,
    kind: EventKind,
    weeks: u32,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = run_domain(state, move |db| {
        EventLog::new(db).list_own_events(user_id, kind, weeks)
    })
    .await?;

    Ok(Json(EventListResponse {
        events: events.into_iter().map(to_response).collect(),
    }))
}

async fn record_event(
    state: AppState,
    user_id: Uuid,
    kind: EventKind,
    req: RecordEventRequest,
) -> Result<impl IntoResponse, ApiError> {
    let event = run_domain(state, move |db| {
        EventLog::new(db).record_event(user_id, kind, req.category, req.note, req.is_shared)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(event))))
}
