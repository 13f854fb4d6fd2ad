use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use grudge_core::friends::FriendGraph;
use grudge_types::api::{Claims, SearchResponse, SearchUser};

use crate::auth::{AppState, run_domain};
use crate::error::ApiError;

const MAX_RESULTS: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Substring search over username and display name, each hit annotated
/// with any existing friendship status toward the caller.
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query.q.unwrap_or_default().trim().to_lowercase();
    if q.len() < 2 {
        return Ok(Json(SearchResponse { users: vec![] }));
    }

    let viewer = claims.sub;

    let users = run_domain(state, move |db| {
        let rows = db.search_users(&viewer.to_string(), &q, MAX_RESULTS)?;

        let ids = rows
            .iter()
            .map(|r| {
                r.id.parse::<Uuid>()
                    .map_err(|e| anyhow!("bad user id {:?}: {e}", r.id).into())
            })
            .collect::<grudge_core::Result<Vec<Uuid>>>()?;

        let status = FriendGraph::new(db).search_status(viewer, &ids)?;

        Ok(rows
            .into_iter()
            .zip(ids)
            .map(|(row, id)| SearchUser {
                id,
                username: row.username,
                name: row.name,
                friendship_status: status.get(&id).copied(),
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(SearchResponse { users }))
}
