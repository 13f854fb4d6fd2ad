use crate::Database;
use crate::models::{EventRow, FriendshipRow, InviteRow, PasswordResetRow, SessionRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Sorts a pair of user ids into the canonical (lo, hi) order used by the
/// `UNIQUE(pair_lo, pair_hi)` key on friendships.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        username: &str,
        name: &str,
        password_hash: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, username, name, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, email, username, name, password_hash, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &[&id]))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", &[&email]))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &[&username]))
    }

    pub fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, email, username, name, password, searchable, created_at
                 FROM users WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let bound: Vec<&dyn rusqlite::types::ToSql> =
                ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();

            let rows = stmt
                .query_map(bound.as_slice(), user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_user_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                params![password_hash, user_id],
            )?;
            Ok(())
        })
    }

    /// Substring search over username and display name, excluding the
    /// viewer and any user who opted out of search. `%` and `_` in the
    /// query match themselves, not as LIKE wildcards.
    pub fn search_users(&self, viewer_id: &str, query: &str, limit: u32) -> Result<Vec<UserRow>> {
        let escaped = query
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, username, name, password, searchable, created_at
                 FROM users
                 WHERE id != ?1
                   AND searchable = 1
                   AND (username LIKE ?2 ESCAPE '\\' OR lower(name) LIKE ?2 ESCAPE '\\')
                 ORDER BY username
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(params![viewer_id, pattern, limit], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Events --

    pub fn insert_event(&self, row: &EventRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, user_id, kind, category, note, is_shared, week_start, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id,
                    row.user_id,
                    row.kind,
                    row.category,
                    row.note,
                    row.is_shared,
                    row.week_start,
                    row.created_at
                ],
            )?;
            Ok(())
        })
    }

    /// Events of one kind owned by `user_id` whose week bucket is at or
    /// after `week_cutoff`, most recent first. `shared_only` additionally
    /// filters to events flagged for friend visibility.
    pub fn get_events(
        &self,
        user_id: &str,
        kind: &str,
        week_cutoff: &str,
        shared_only: bool,
    ) -> Result<Vec<EventRow>> {
        let sql = if shared_only {
            "SELECT id, user_id, kind, category, note, is_shared, week_start, created_at
             FROM events
             WHERE user_id = ?1 AND kind = ?2 AND week_start >= ?3 AND is_shared = 1
             ORDER BY created_at DESC"
        } else {
            "SELECT id, user_id, kind, category, note, is_shared, week_start, created_at
             FROM events
             WHERE user_id = ?1 AND kind = ?2 AND week_start >= ?3
             ORDER BY created_at DESC"
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params![user_id, kind, week_cutoff], event_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Friendships --

    /// Inserts a friendship row. Returns false when a row for the unordered
    /// pair already exists (the canonical-pair unique key fired), which is
    /// how a concurrent duplicate request surfaces.
    pub fn insert_friendship(
        &self,
        id: &str,
        user_id: &str,
        friend_id: &str,
        status: &str,
        created_at: &str,
    ) -> Result<bool> {
        let (lo, hi) = canonical_pair(user_id, friend_id);

        self.with_conn(|conn| {
            let res = conn.execute(
                "INSERT INTO friendships (id, user_id, friend_id, status, pair_lo, pair_hi, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, user_id, friend_id, status, lo, hi, created_at],
            );

            match res {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_friendship_by_id(&self, id: &str) -> Result<Option<FriendshipRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, friend_id, status, created_at
                 FROM friendships WHERE id = ?1",
                [id],
                friendship_from_row,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// The single row for an unordered pair of users, whatever its
    /// direction or status.
    pub fn get_friendship_by_pair(&self, a: &str, b: &str) -> Result<Option<FriendshipRow>> {
        let (lo, hi) = canonical_pair(a, b);

        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, friend_id, status, created_at
                 FROM friendships WHERE pair_lo = ?1 AND pair_hi = ?2",
                params![lo, hi],
                friendship_from_row,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn set_friendship_status(&self, id: &str, status: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE friendships SET status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
    }

    pub fn delete_friendship(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM friendships WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Accepted rows touching `user_id` in either direction.
    pub fn get_accepted_friendships(&self, user_id: &str) -> Result<Vec<FriendshipRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, friend_id, status, created_at
                 FROM friendships
                 WHERE (user_id = ?1 OR friend_id = ?1) AND status = 'accepted'",
            )?;

            let rows = stmt
                .query_map([user_id], friendship_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Pending rows where `user_id` is the target (incoming requests only).
    pub fn get_pending_requests(&self, user_id: &str) -> Result<Vec<FriendshipRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, friend_id, status, created_at
                 FROM friendships
                 WHERE friend_id = ?1 AND status = 'pending'
                 ORDER BY created_at",
            )?;

            let rows = stmt
                .query_map([user_id], friendship_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Batch-fetch the friendship rows between `user_id` and any of
    /// `other_ids`, for annotating search results.
    pub fn get_friendships_with_any(
        &self,
        user_id: &str,
        other_ids: &[String],
    ) -> Result<Vec<FriendshipRow>> {
        if other_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (2..=other_ids.len() + 1).map(|i| format!("?{}", i)).collect();
            let list = placeholders.join(", ");
            let sql = format!(
                "SELECT id, user_id, friend_id, status, created_at
                 FROM friendships
                 WHERE (user_id = ?1 AND friend_id IN ({list}))
                    OR (friend_id = ?1 AND user_id IN ({list}))"
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut bound: Vec<&dyn rusqlite::types::ToSql> = vec![&user_id];
            bound.extend(
                other_ids
                    .iter()
                    .map(|id| id as &dyn rusqlite::types::ToSql),
            );

            let rows = stmt
                .query_map(bound.as_slice(), friendship_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Invites --

    pub fn insert_invite(
        &self,
        id: &str,
        user_id: &str,
        token: &str,
        expires_at: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO invites (id, user_id, token, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, token, expires_at, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_invite_by_token(&self, token: &str) -> Result<Option<InviteRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, token, expires_at, created_at
                 FROM invites WHERE token = ?1",
                [token],
                |row| {
                    Ok(InviteRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        token: row.get(2)?,
                        expires_at: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
    }

    // -- Sessions --

    pub fn insert_session(&self, token: &str, user_id: &str, expires_at: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
                params![token, user_id, expires_at],
            )?;
            Ok(())
        })
    }

    pub fn get_session(&self, token: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
                [token],
                |row| {
                    Ok(SessionRow {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        })
    }

    /// Password reset revokes every live session of the user.
    pub fn delete_sessions_for_user(&self, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE user_id = ?1", [user_id])?;
            Ok(())
        })
    }

    // -- Password resets --

    pub fn insert_password_reset(
        &self,
        id: &str,
        user_id: &str,
        token: &str,
        expires_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO password_resets (id, user_id, token, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, token, expires_at],
            )?;
            Ok(())
        })
    }

    pub fn get_password_reset(&self, token: &str) -> Result<Option<PasswordResetRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, token, expires_at, used
                 FROM password_resets WHERE token = ?1",
                [token],
                |row| {
                    Ok(PasswordResetRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        token: row.get(2)?,
                        expires_at: row.get(3)?,
                        used: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn mark_password_reset_used(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE password_resets SET used = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn delete_password_resets_for_user(&self, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM password_resets WHERE user_id = ?1", [user_id])?;
            Ok(())
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        name: row.get(3)?,
        password: row.get(4)?,
        searchable: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        category: row.get(3)?,
        note: row.get(4)?,
        is_shared: row.get(5)?,
        week_start: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn friendship_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FriendshipRow> {
    Ok(FriendshipRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        friend_id: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    bound: &[&dyn rusqlite::types::ToSql],
) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, email, username, name, password, searchable, created_at
         FROM users WHERE {predicate}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row(bound, user_from_row).optional()?;

    Ok(row)
}
