//! Row types mapping directly onto the SQLite tables. Timestamps stay as
//! the stored TEXT; callers decode them with [`crate::time`].

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: String,
    pub searchable: bool,
    pub created_at: String,
}

pub struct EventRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub category: String,
    pub note: Option<String>,
    pub is_shared: bool,
    pub week_start: String,
    pub created_at: String,
}

pub struct FriendshipRow {
    pub id: String,
    pub user_id: String,
    pub friend_id: String,
    pub status: String,
    pub created_at: String,
}

pub struct InviteRow {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

pub struct SessionRow {
    pub token: String,
    pub user_id: String,
    pub expires_at: String,
}

pub struct PasswordResetRow {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub used: bool,
}
