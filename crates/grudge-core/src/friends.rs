//! The friend graph: pending/accepted relationships between users, friend
//! requests, and invite links that mint an accepted friendship directly.

use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::warn;
use uuid::Uuid;

use grudge_db::models::UserRow;
use grudge_db::{Database, time};
use grudge_types::api::FriendAction;
use grudge_types::models::{FriendshipStatus, UserSummary};

use crate::{Error, Result};

/// Invite links stay redeemable for a week.
pub const INVITE_TTL: Duration = Duration::days(7);

pub struct FriendGraph<'a> {
    db: &'a Database,
}

/// An incoming friend request awaiting a response from its target.
pub struct PendingFriendRequest {
    pub id: Uuid,
    pub from: UserSummary,
}

/// A freshly issued invite link token.
pub struct Invite {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl<'a> FriendGraph<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Creates a pending request from `from` to `to`. At most one friendship
    /// row may exist per unordered pair, whatever its direction or status;
    /// a previously rejected request is indistinguishable from no request,
    /// since rejection deletes the row.
    ///
    /// Returns the target's summary (the caller shows "request sent to X").
    pub fn send_request(&self, from: Uuid, to: Uuid) -> Result<UserSummary> {
        if from == to {
            return Err(Error::Validation("cannot add yourself".into()));
        }

        let target = self
            .db
            .get_user_by_id(&to.to_string())?
            .ok_or(Error::NotFound("user"))?;

        if self
            .db
            .get_friendship_by_pair(&from.to_string(), &to.to_string())?
            .is_some()
        {
            return Err(Error::AlreadyExists);
        }

        let inserted = self.db.insert_friendship(
            &Uuid::new_v4().to_string(),
            &from.to_string(),
            &to.to_string(),
            FriendshipStatus::Pending.as_str(),
            &time::encode(Utc::now()),
        )?;

        // Lost a race with the reverse-direction request; the unique
        // pair key caught it.
        if !inserted {
            return Err(Error::AlreadyExists);
        }

        user_summary(&target)
    }

    /// Accepts or rejects a request. Only the request's target may respond;
    /// for anyone else the friendship simply does not exist. Rejection
    /// hard-deletes the row, so a later re-request is possible.
    pub fn respond(&self, friendship_id: Uuid, responder: Uuid, action: FriendAction) -> Result<()> {
        let row = self
            .db
            .get_friendship_by_id(&friendship_id.to_string())?
            .ok_or(Error::NotFound("friendship"))?;

        if row.friend_id != responder.to_string() {
            return Err(Error::NotFound("friendship"));
        }

        match action {
            FriendAction::Accept => self
                .db
                .set_friendship_status(&row.id, FriendshipStatus::Accepted.as_str())?,
            FriendAction::Reject => self.db.delete_friendship(&row.id)?,
        }

        Ok(())
    }

    /// True iff an accepted friendship exists between the unordered pair.
    pub fn are_friends(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let row = self
            .db
            .get_friendship_by_pair(&a.to_string(), &b.to_string())?;

        Ok(row.is_some_and(|r| r.status == FriendshipStatus::Accepted.as_str()))
    }

    /// Everyone on the other end of an accepted friendship with `user`.
    pub fn list_friends(&self, user: Uuid) -> Result<Vec<UserSummary>> {
        let user_id = user.to_string();
        let rows = self.db.get_accepted_friendships(&user_id)?;

        let other_ids: Vec<String> = rows
            .iter()
            .map(|r| {
                if r.user_id == user_id {
                    r.friend_id.clone()
                } else {
                    r.user_id.clone()
                }
            })
            .collect();

        let users = self.db.get_users_by_ids(&other_ids)?;
        users.iter().map(user_summary).collect()
    }

    /// Incoming pending requests targeting `user`, with their requesters.
    pub fn list_pending(&self, user: Uuid) -> Result<Vec<PendingFriendRequest>> {
        let rows = self.db.get_pending_requests(&user.to_string())?;

        let requester_ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
        let requesters: HashMap<String, UserRow> = self
            .db
            .get_users_by_ids(&requester_ids)?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut pending = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(from) = requesters.get(&row.user_id) else {
                warn!("pending request {} has no requester row", row.id);
                continue;
            };
            pending.push(PendingFriendRequest {
                id: row
                    .id
                    .parse()
                    .map_err(|e| anyhow!("bad friendship id: {e}"))?,
                from: user_summary(from)?,
            });
        }

        Ok(pending)
    }

    /// Issues an invite link token for `user`.
    pub fn create_invite(&self, user: Uuid, now: DateTime<Utc>) -> Result<Invite> {
        let token = hex::encode(rand::rng().random::<[u8; 16]>());
        let expires_at = now + INVITE_TTL;

        self.db.insert_invite(
            &Uuid::new_v4().to_string(),
            &user.to_string(),
            &token,
            &time::encode(expires_at),
            &time::encode(now),
        )?;

        Ok(Invite { token, expires_at })
    }

    /// Resolves an invite token to its issuer, failing on unknown or
    /// expired tokens.
    pub fn invite_info(&self, token: &str, now: DateTime<Utc>) -> Result<UserSummary> {
        let invite = self
            .db
            .get_invite_by_token(token)?
            .ok_or(Error::NotFound("invite"))?;

        if now > time::decode(&invite.expires_at)? {
            return Err(Error::Expired("invite"));
        }

        let inviter = self
            .db
            .get_user_by_id(&invite.user_id)?
            .ok_or(Error::NotFound("user"))?;

        user_summary(&inviter)
    }

    /// Redeemed during registration: links the inviter and the new user as
    /// already-accepted friends, bypassing the pending state. This is the
    /// only path that creates an accepted relationship without a respond
    /// step. If the pair is somehow already linked, the existing row wins.
    pub fn redeem_invite(&self, token: &str, new_user: Uuid, now: DateTime<Utc>) -> Result<()> {
        let invite = self
            .db
            .get_invite_by_token(token)?
            .ok_or(Error::NotFound("invite"))?;

        if now > time::decode(&invite.expires_at)? {
            return Err(Error::Expired("invite"));
        }

        self.db.insert_friendship(
            &Uuid::new_v4().to_string(),
            &invite.user_id,
            &new_user.to_string(),
            FriendshipStatus::Accepted.as_str(),
            &time::encode(now),
        )?;

        Ok(())
    }

    /// Friendship status between `user` and each of `others`, for search
    /// result annotation. Users with no row are absent from the map.
    pub fn search_status(
        &self,
        user: Uuid,
        others: &[Uuid],
    ) -> Result<HashMap<Uuid, FriendshipStatus>> {
        let user_id = user.to_string();
        let other_ids: Vec<String> = others.iter().map(Uuid::to_string).collect();
        let rows = self.db.get_friendships_with_any(&user_id, &other_ids)?;

        let mut map = HashMap::new();
        for row in rows {
            let other = if row.user_id == user_id {
                &row.friend_id
            } else {
                &row.user_id
            };
            let Some(status) = FriendshipStatus::parse(&row.status) else {
                warn!("friendship {} has unknown status {:?}", row.id, row.status);
                continue;
            };
            map.insert(
                other
                    .parse()
                    .map_err(|e| anyhow!("bad user id on friendship {}: {e}", row.id))?,
                status,
            );
        }

        Ok(map)
    }
}

/// Public view of a stored user row.
pub fn user_summary(row: &UserRow) -> Result<UserSummary> {
    Ok(UserSummary {
        id: row
            .id
            .parse()
            .map_err(|e| anyhow!("bad user id {:?}: {e}", row.id))?,
        email: row.email.clone(),
        username: row.username.clone(),
        name: row.name.clone(),
    })
}
